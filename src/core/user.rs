//! User records. Only what ordering and seeding need; profile editing lives elsewhere.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Creates a user after checking that name and email are present.
pub async fn create_user<C>(
    db: &C,
    name: String,
    email: String,
    phone_number: String,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    if name.trim().is_empty() {
        return Err(Error::invalid("user name cannot be empty"));
    }
    if email.trim().is_empty() {
        return Err(Error::invalid("user email cannot be empty"));
    }

    let user = user::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email.trim().to_lowercase()),
        phone_number: Set(phone_number),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    user.insert(db).await.map_err(Into::into)
}

/// Finds a user by id.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by email (case-insensitive, emails are stored lowercased).
pub async fn get_user_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fails with [`Error::UserNotFound`] unless the user exists.
pub(crate) async fn ensure_user_exists<C>(db: &C, user_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    if get_user_by_id(db, user_id).await?.is_none() {
        return Err(Error::UserNotFound { id: user_id });
    }
    Ok(())
}
