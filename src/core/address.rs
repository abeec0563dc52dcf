//! Address store - delivery addresses owned by users.

use crate::{
    core::user::ensure_user_exists,
    entities::{Address, address},
    errors::{Error, Result},
    models::AddressPatch,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Fields needed to register a delivery address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    /// Short label, e.g. "Home"
    pub title: String,
    /// Who receives the parcel
    pub recipient_name: String,
    /// Recipient phone number
    pub phone_number: String,
    /// Full postal address
    pub full_address: String,
}

/// Registers an address for an existing user. Every field is required.
pub async fn create_address<C>(db: &C, user_id: i64, new: NewAddress) -> Result<address::Model>
where
    C: ConnectionTrait,
{
    for (field, value) in [
        ("title", &new.title),
        ("recipient_name", &new.recipient_name),
        ("phone_number", &new.phone_number),
        ("full_address", &new.full_address),
    ] {
        if value.trim().is_empty() {
            return Err(Error::invalid(format!("{field} cannot be empty")));
        }
    }
    ensure_user_exists(db, user_id).await?;

    address::ActiveModel {
        user_id: Set(user_id),
        title: Set(new.title),
        recipient_name: Set(new.recipient_name),
        phone_number: Set(new.phone_number),
        full_address: Set(new.full_address),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds an address by id regardless of owner.
pub async fn get_address_by_id<C>(db: &C, address_id: i64) -> Result<Option<address::Model>>
where
    C: ConnectionTrait,
{
    Address::find_by_id(address_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All addresses of a user, in creation order.
pub async fn get_addresses_for_user<C>(db: &C, user_id: i64) -> Result<Vec<address::Model>>
where
    C: ConnectionTrait,
{
    Address::find()
        .filter(address::Column::UserId.eq(user_id))
        .order_by_asc(address::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Whether `address_id` exists and belongs to `user_id`.
pub async fn is_owned_by<C>(db: &C, address_id: i64, user_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = Address::find()
        .filter(address::Column::Id.eq(address_id))
        .filter(address::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Loads an address the caller is about to ship to.
///
/// # Errors
/// - [`Error::AddressNotFound`] if no such address exists
/// - [`Error::Forbidden`] if it belongs to another user
pub async fn verify_owner<C>(db: &C, address_id: i64, user_id: i64) -> Result<address::Model>
where
    C: ConnectionTrait,
{
    let address = get_address_by_id(db, address_id)
        .await?
        .ok_or(Error::AddressNotFound { id: address_id })?;

    if address.user_id != user_id {
        return Err(Error::Forbidden {
            resource: "address",
            id: address_id,
        });
    }
    Ok(address)
}

/// Applies the fields named in `patch` to one of the user's addresses.
///
/// Another user's address is reported as missing.
pub async fn update_address<C>(
    db: &C,
    address_id: i64,
    user_id: i64,
    patch: AddressPatch,
) -> Result<address::Model>
where
    C: ConnectionTrait,
{
    let current = Address::find()
        .filter(address::Column::Id.eq(address_id))
        .filter(address::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::AddressNotFound { id: address_id })?;
    let mut address: address::ActiveModel = current.clone().into();
    let mut changed = false;

    let fields = [
        ("title", patch.title, &mut address.title),
        (
            "recipient_name",
            patch.recipient_name,
            &mut address.recipient_name,
        ),
        ("phone_number", patch.phone_number, &mut address.phone_number),
        ("full_address", patch.full_address, &mut address.full_address),
    ];
    for (field, value, column) in fields {
        if let Some(value) = value {
            if value.trim().is_empty() {
                return Err(Error::invalid(format!("{field} cannot be empty")));
            }
            *column = Set(value);
            changed = true;
        }
    }

    if !changed {
        return Ok(current);
    }
    address.update(db).await.map_err(Into::into)
}
