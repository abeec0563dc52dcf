//! Catalog store - products, their stock and their images.
//!
//! Prices are kept as the decimal strings the catalog was given. They are only turned
//! into integer amounts when an order is priced, see [`parse_consumer_price`].
//! Stock is lowered exclusively through [`decrement_stock`], a single conditional
//! `UPDATE` that can never take stock below zero, even when several checkouts race
//! for the same product.

use crate::{
    core::shop::get_shop_by_id,
    entities::{Product, ProductImage, product, product_image},
    errors::{Error, Result},
    models::ProductPatch,
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::debug;

/// Fields needed to list a new product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// URL-friendly name; derived from `name` when `None`
    pub slug: Option<String>,
    /// Reseller price as a decimal string
    pub reseller_price: String,
    /// Consumer price as a decimal string
    pub consumer_price: String,
    /// Initial stock, must not be negative
    pub stock: i32,
    /// Free-form description
    pub description: String,
    /// Optional category
    pub category_id: Option<i64>,
}

/// Lists a product in an existing shop.
///
/// # Errors
/// Returns an error if:
/// - The name or either price is empty
/// - The stock is negative
/// - The shop does not exist
/// - The database insert fails
pub async fn create_product<C>(db: &C, shop_id: i64, new: NewProduct) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    if new.name.trim().is_empty() {
        return Err(Error::invalid("product name cannot be empty"));
    }
    if new.reseller_price.trim().is_empty() || new.consumer_price.trim().is_empty() {
        return Err(Error::invalid("product prices cannot be empty"));
    }
    if new.stock < 0 {
        return Err(Error::invalid("product stock cannot be negative"));
    }
    if get_shop_by_id(db, shop_id).await?.is_none() {
        return Err(Error::invalid(format!("shop {shop_id} does not exist")));
    }

    let slug = new
        .slug
        .filter(|slug| !slug.trim().is_empty())
        .unwrap_or_else(|| slugify(&new.name));
    let now = chrono::Utc::now();

    let product = product::ActiveModel {
        shop_id: Set(shop_id),
        category_id: Set(new.category_id),
        name: Set(new.name.trim().to_string()),
        slug: Set(slug),
        reseller_price: Set(new.reseller_price),
        consumer_price: Set(new.consumer_price),
        stock: Set(new.stock),
        description: Set(new.description),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Whether `product_id` exists and is listed by `shop_id`.
pub async fn is_owned_by_shop<C>(db: &C, product_id: i64, shop_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = Product::find()
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::ShopId.eq(shop_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Applies the fields named in `patch` and refreshes `updated_at`.
///
/// # Errors
/// Returns an error if the product does not exist, a patched string is empty, or the
/// patched stock is negative.
pub async fn update_product<C>(
    db: &C,
    product_id: i64,
    patch: ProductPatch,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let mut product: product::ActiveModel = get_product_by_id(db, product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?
        .into();

    if let Some(name) = patch.name {
        product.name = Set(non_empty("name", name)?);
    }
    if let Some(slug) = patch.slug {
        product.slug = Set(non_empty("slug", slug)?);
    }
    if let Some(price) = patch.reseller_price {
        product.reseller_price = Set(non_empty("reseller_price", price)?);
    }
    if let Some(price) = patch.consumer_price {
        product.consumer_price = Set(non_empty("consumer_price", price)?);
    }
    if let Some(description) = patch.description {
        product.description = Set(description);
    }
    if let Some(stock) = patch.stock {
        if stock < 0 {
            return Err(Error::invalid("product stock cannot be negative"));
        }
        product.stock = Set(stock);
    }
    if let Some(category_id) = patch.category_id {
        product.category_id = Set(category_id);
    }
    product.updated_at = Set(chrono::Utc::now());

    product.update(db).await.map_err(Into::into)
}

/// Lowers a product's stock by `quantity` if, and only if, enough stock remains.
///
/// This is one statement:
/// `UPDATE products SET stock = stock - ? WHERE id = ? AND stock >= ?`.
/// Competing callers serialize on the row, so the guard is evaluated against the
/// latest committed stock rather than a value read earlier.
///
/// # Errors
/// - [`Error::InvalidInput`] if `quantity` is not positive
/// - [`Error::InsufficientStock`] if the guard rejected the update
/// - [`Error::ProductNotFound`] if the product does not exist
pub async fn decrement_stock<C>(db: &C, product_id: i64, quantity: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    if quantity <= 0 {
        return Err(Error::invalid("quantity must be greater than zero"));
    }

    let result = Product::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(quantity),
        )
        .col_expr(
            product::Column::UpdatedAt,
            Expr::value(chrono::Utc::now()),
        )
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::Stock.gte(quantity))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let product = get_product_by_id(db, product_id)
            .await?
            .ok_or(Error::ProductNotFound { id: product_id })?;
        debug!(
            product_id,
            available = product.stock,
            requested = quantity,
            "Stock decrement rejected"
        );
        return Err(Error::InsufficientStock {
            product_id,
            available: product.stock,
            requested: quantity,
        });
    }

    Ok(())
}

/// Images of a product, oldest first. Empty when the product has none.
pub async fn get_images_for_product<C>(
    db: &C,
    product_id: i64,
) -> Result<Vec<product_image::Model>>
where
    C: ConnectionTrait,
{
    ProductImage::find()
        .filter(product_image::Column::ProductId.eq(product_id))
        .order_by_asc(product_image::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Attaches an image to an existing product.
pub async fn add_product_image<C>(
    db: &C,
    product_id: i64,
    url: String,
) -> Result<product_image::Model>
where
    C: ConnectionTrait,
{
    if url.trim().is_empty() {
        return Err(Error::invalid("image url cannot be empty"));
    }
    if get_product_by_id(db, product_id).await?.is_none() {
        return Err(Error::ProductNotFound { id: product_id });
    }

    product_image::ActiveModel {
        product_id: Set(product_id),
        url: Set(url),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Parses the consumer price as a non-negative integer amount.
///
/// # Errors
/// Returns [`Error::InvalidPrice`] for anything that is not a plain non-negative integer.
pub fn parse_consumer_price(product: &product::Model) -> Result<i64> {
    product
        .consumer_price
        .parse::<i64>()
        .ok()
        .filter(|price| *price >= 0)
        .ok_or_else(|| Error::InvalidPrice {
            product_id: product.id,
            value: product.consumer_price.clone(),
        })
}

/// Lowercases `name` and joins its alphanumeric runs with `-`.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn non_empty(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::invalid(format!("{field} cannot be empty")));
    }
    Ok(value)
}
