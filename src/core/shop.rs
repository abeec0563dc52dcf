use crate::{
    core::user::ensure_user_exists,
    entities::{Shop, shop},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Opens a shop for an existing user.
pub async fn create_shop<C>(
    db: &C,
    user_id: i64,
    name: String,
    photo_url: Option<String>,
) -> Result<shop::Model>
where
    C: ConnectionTrait,
{
    if name.trim().is_empty() {
        return Err(Error::invalid("shop name cannot be empty"));
    }
    ensure_user_exists(db, user_id).await?;

    let shop = shop::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.trim().to_string()),
        photo_url: Set(photo_url),
        ..Default::default()
    };
    shop.insert(db).await.map_err(Into::into)
}

/// Finds a shop by id.
pub async fn get_shop_by_id<C>(db: &C, shop_id: i64) -> Result<Option<shop::Model>>
where
    C: ConnectionTrait,
{
    Shop::find_by_id(shop_id).one(db).await.map_err(Into::into)
}
