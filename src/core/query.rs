//! Read side of the ledger - rebuilds placed orders for their buyer.
//!
//! Product facts (name, slug, prices, description, shop, category) always come from
//! the line item's price snapshot, never from the live product, so an old order shows
//! what was actually bought. Two things are still looked up live:
//!
//! - product images, by the snapshot's original product id
//! - the delivery address, by id
//!
//! Both can therefore change on historical orders after the fact.

use crate::{
    core::{address, category, ledger, product, shop},
    entities::{
        address as address_entity, price_snapshot, product_image, transaction,
        transaction_line_item,
    },
    errors::{Error, Result},
    models::{
        AddressView, CategoryInfo, LineItemView, Page, ProductImageView, ShopInfo, SnapshotView,
        TransactionFilter, TransactionView,
    },
};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::{debug, instrument};

/// Loads one of the buyer's transactions.
///
/// # Errors
/// Returns [`Error::TransactionNotFound`] when the transaction does not exist *or*
/// belongs to someone else; the two cases are indistinguishable to the caller.
#[instrument(skip(db))]
pub async fn get_transaction(
    db: &DatabaseConnection,
    buyer_id: i64,
    transaction_id: i64,
) -> Result<TransactionView> {
    let transaction = ledger::find_transaction_for_user(db, buyer_id, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    assemble_transaction(db, transaction).await
}

/// Lists the buyer's transactions, newest first.
///
/// See [`TransactionFilter`] for how search and paging parameters are interpreted.
#[instrument(skip(db))]
pub async fn list_transactions(
    db: &DatabaseConnection,
    buyer_id: i64,
    filter: &TransactionFilter,
) -> Result<Page<TransactionView>> {
    let (limit, offset) = filter.limit_offset();
    let transactions =
        ledger::find_transactions_for_user(db, buyer_id, filter.search_term(), limit, offset)
            .await?;
    debug!(count = transactions.len(), "Loaded transactions page");

    let mut data = Vec::with_capacity(transactions.len());
    for transaction in transactions {
        data.push(assemble_transaction(db, transaction).await?);
    }

    Ok(Page {
        data,
        page: offset / limit + 1,
        limit,
    })
}

async fn assemble_transaction<C>(db: &C, transaction: transaction::Model) -> Result<TransactionView>
where
    C: ConnectionTrait,
{
    let address = address::get_address_by_id(db, transaction.address_id)
        .await?
        .map(AddressView::from);

    let lines = ledger::get_line_items_with_snapshots(db, transaction.id).await?;
    let mut line_items = Vec::with_capacity(lines.len());
    for (line_item, snapshot) in lines {
        line_items.push(assemble_line_item(db, line_item, snapshot).await?);
    }

    Ok(TransactionView {
        id: transaction.id,
        total_price: transaction.total_price,
        invoice_code: transaction.invoice_code,
        payment_method: transaction.payment_method,
        address,
        line_items,
    })
}

async fn assemble_line_item<C>(
    db: &C,
    line_item: transaction_line_item::Model,
    snapshot: price_snapshot::Model,
) -> Result<LineItemView>
where
    C: ConnectionTrait,
{
    let snapshot_shop = shop_info(db, snapshot.shop_id).await?;
    let line_shop = if line_item.shop_id == snapshot.shop_id {
        snapshot_shop.clone()
    } else {
        shop_info(db, line_item.shop_id).await?
    };

    let category = match snapshot.category_id {
        Some(category_id) => category::get_category_by_id(db, category_id)
            .await?
            .map(|category| CategoryInfo {
                id: category.id,
                name: category.name,
            }),
        None => None,
    };

    let images = product::get_images_for_product(db, snapshot.product_id)
        .await?
        .into_iter()
        .map(ProductImageView::from)
        .collect();

    Ok(LineItemView {
        product: SnapshotView {
            product_id: snapshot.product_id,
            name: snapshot.product_name,
            slug: snapshot.slug,
            reseller_price: snapshot.reseller_price,
            consumer_price: snapshot.consumer_price,
            description: snapshot.description,
            shop: snapshot_shop,
            category,
            images,
        },
        shop: line_shop,
        quantity: line_item.quantity,
        total_price: line_item.total_price,
    })
}

async fn shop_info<C>(db: &C, shop_id: i64) -> Result<Option<ShopInfo>>
where
    C: ConnectionTrait,
{
    Ok(shop::get_shop_by_id(db, shop_id).await?.map(|shop| ShopInfo {
        name: shop.name,
        photo_url: shop.photo_url,
    }))
}

impl From<address_entity::Model> for AddressView {
    fn from(address: address_entity::Model) -> Self {
        Self {
            id: address.id,
            title: address.title,
            recipient_name: address.recipient_name,
            phone_number: address.phone_number,
            full_address: address.full_address,
        }
    }
}

impl From<product_image::Model> for ProductImageView {
    fn from(image: product_image::Model) -> Self {
        Self {
            id: image.id,
            product_id: image.product_id,
            url: image.url,
        }
    }
}
