//! Shared test utilities for the marketplace backend.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        address::{self, NewAddress},
        product::{self, NewProduct},
        shop, user,
    },
    entities,
    errors::Result,
};
use sea_orm::{ConnectOptions, DatabaseConnection};

/// The people and places most tests need.
#[derive(Debug, Clone)]
pub struct Fixture {
    /// User who places orders
    pub buyer: entities::user::Model,
    /// User who owns `shop`
    pub seller: entities::user::Model,
    /// Shop products are listed in
    pub shop: entities::shop::Model,
    /// The buyer's delivery address
    pub address: entities::address::Model,
}

/// Creates an in-memory `SQLite` database with all tables initialized.
///
/// The pool is capped at one connection: every connection to `sqlite::memory:`
/// opens its own private database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a user named `name` with email `<name>@example.com`.
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::user::Model> {
    user::create_user(
        db,
        name.to_string(),
        format!("{name}@example.com"),
        "081234567890".to_string(),
    )
    .await
}

/// Creates a shop without a photo.
pub async fn create_test_shop(
    db: &DatabaseConnection,
    owner_id: i64,
    name: &str,
) -> Result<entities::shop::Model> {
    shop::create_shop(db, owner_id, name.to_string(), None).await
}

/// Creates a product with the given consumer price and stock.
///
/// # Defaults
/// * `reseller_price`: "1000"
/// * `description`: "Test product"
/// * no category, slug derived from the name
pub async fn create_test_product(
    db: &DatabaseConnection,
    shop_id: i64,
    name: &str,
    consumer_price: &str,
    stock: i32,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        shop_id,
        NewProduct {
            name: name.to_string(),
            slug: None,
            reseller_price: "1000".to_string(),
            consumer_price: consumer_price.to_string(),
            stock,
            description: "Test product".to_string(),
            category_id: None,
        },
    )
    .await
}

/// Creates an address titled `title` for `user_id`.
pub async fn create_test_address(
    db: &DatabaseConnection,
    user_id: i64,
    title: &str,
) -> Result<entities::address::Model> {
    address::create_address(
        db,
        user_id,
        NewAddress {
            title: title.to_string(),
            recipient_name: "Test Recipient".to_string(),
            phone_number: "081234567890".to_string(),
            full_address: "Jl. Merdeka No. 1, Jakarta".to_string(),
        },
    )
    .await
}

/// Sets up a database with a buyer (and their address) and a seller with one shop.
/// Returns (db, fixture) for common test scenarios.
pub async fn setup_marketplace() -> Result<(DatabaseConnection, Fixture)> {
    let db = setup_test_db().await?;
    let buyer = create_test_user(&db, "buyer").await?;
    let seller = create_test_user(&db, "seller").await?;
    let shop = create_test_shop(&db, seller.id, "Toko Seller").await?;
    let address = create_test_address(&db, buyer.id, "Home").await?;
    Ok((
        db,
        Fixture {
            buyer,
            seller,
            shop,
            address,
        },
    ))
}
