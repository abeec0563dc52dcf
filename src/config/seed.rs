//! Catalog seed data loaded from a TOML file.
//!
//! Used to populate an empty database for local development. Records refer to each
//! other by natural keys (user email, shop name, category name) that are resolved to
//! ids while inserting.

use crate::{
    core::{
        address::{self, NewAddress},
        category,
        product::{self, NewProduct},
        shop, user,
    },
    entities::User,
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, TransactionTrait};
use serde::Deserialize;
use std::{collections::HashMap, path::Path};
use tracing::{info, instrument};

/// Structure of the seed file
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    /// Accounts to create
    #[serde(default)]
    pub users: Vec<UserSeed>,
    /// Shops, each owned by a seeded user
    #[serde(default)]
    pub shops: Vec<ShopSeed>,
    /// Categories
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    /// Products, each listed in a seeded shop
    #[serde(default)]
    pub products: Vec<ProductSeed>,
    /// Delivery addresses, each owned by a seeded user
    #[serde(default)]
    pub addresses: Vec<AddressSeed>,
}

/// A seeded user
#[derive(Debug, Clone, Deserialize)]
pub struct UserSeed {
    /// Display name
    pub name: String,
    /// Unique email, also the key other records use
    pub email: String,
    /// Phone number
    #[serde(default)]
    pub phone_number: String,
}

/// A seeded shop
#[derive(Debug, Clone, Deserialize)]
pub struct ShopSeed {
    /// Email of the owning user
    pub owner: String,
    /// Shop name, also the key products use
    pub name: String,
    /// Optional photo
    pub photo_url: Option<String>,
}

/// A seeded category
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySeed {
    /// Category name
    pub name: String,
}

/// A seeded product
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeed {
    /// Name of the listing shop
    pub shop: String,
    /// Optional category name
    pub category: Option<String>,
    /// Display name
    pub name: String,
    /// Optional slug
    pub slug: Option<String>,
    /// Reseller price as a decimal string
    pub reseller_price: String,
    /// Consumer price as a decimal string
    pub consumer_price: String,
    /// Initial stock
    pub stock: i32,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Image locations
    #[serde(default)]
    pub images: Vec<String>,
}

/// A seeded address
#[derive(Debug, Clone, Deserialize)]
pub struct AddressSeed {
    /// Email of the owning user
    pub owner: String,
    /// Short label
    pub title: String,
    /// Recipient name
    pub recipient_name: String,
    /// Recipient phone
    pub phone_number: String,
    /// Full postal address
    pub full_address: String,
}

/// Parses seed data from TOML text.
pub fn parse_seed(contents: &str) -> Result<SeedData> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}

/// Reads and parses a seed file.
pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<SeedData> {
    let path = path.as_ref();
    tracing::debug!("Attempting to load seed data from: {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {path:?}: {e}"),
    })?;
    parse_seed(&contents)
}

/// Inserts `seed` into an empty database in a single transaction.
///
/// Returns `false` without writing anything if any user already exists.
#[instrument(skip(db, seed))]
pub async fn seed_database(db: &DatabaseConnection, seed: &SeedData) -> Result<bool> {
    if User::find().count(db).await? > 0 {
        info!("Database already populated, skipping seed");
        return Ok(false);
    }

    let txn = db.begin().await?;

    let mut users = HashMap::new();
    for entry in &seed.users {
        let created = user::create_user(
            &txn,
            entry.name.clone(),
            entry.email.clone(),
            entry.phone_number.clone(),
        )
        .await?;
        users.insert(created.email.clone(), created.id);
    }
    let user_id = |email: &str| {
        users
            .get(&email.trim().to_lowercase())
            .copied()
            .ok_or_else(|| Error::Config {
                message: format!("Seed refers to unknown user {email:?}"),
            })
    };

    let mut shops = HashMap::new();
    for entry in &seed.shops {
        let created = shop::create_shop(
            &txn,
            user_id(&entry.owner)?,
            entry.name.clone(),
            entry.photo_url.clone(),
        )
        .await?;
        shops.insert(created.name.clone(), created.id);
    }

    let mut categories = HashMap::new();
    for entry in &seed.categories {
        let created = category::create_category(&txn, entry.name.clone()).await?;
        categories.insert(created.name.clone(), created.id);
    }

    for entry in &seed.products {
        let shop_id = *shops.get(entry.shop.trim()).ok_or_else(|| Error::Config {
            message: format!("Seed product {:?} refers to unknown shop {:?}", entry.name, entry.shop),
        })?;
        let category_id = entry
            .category
            .as_deref()
            .map(|name| {
                categories.get(name.trim()).copied().ok_or_else(|| Error::Config {
                    message: format!("Seed product {:?} refers to unknown category {name:?}", entry.name),
                })
            })
            .transpose()?;

        let created = product::create_product(
            &txn,
            shop_id,
            NewProduct {
                name: entry.name.clone(),
                slug: entry.slug.clone(),
                reseller_price: entry.reseller_price.clone(),
                consumer_price: entry.consumer_price.clone(),
                stock: entry.stock,
                description: entry.description.clone(),
                category_id,
            },
        )
        .await?;
        for url in &entry.images {
            product::add_product_image(&txn, created.id, url.clone()).await?;
        }
    }

    for entry in &seed.addresses {
        address::create_address(
            &txn,
            user_id(&entry.owner)?,
            NewAddress {
                title: entry.title.clone(),
                recipient_name: entry.recipient_name.clone(),
                phone_number: entry.phone_number.clone(),
                full_address: entry.full_address.clone(),
            },
        )
        .await?;
    }

    txn.commit().await?;
    info!(
        users = seed.users.len(),
        shops = seed.shops.len(),
        products = seed.products.len(),
        "Seed data inserted"
    );
    Ok(true)
}
