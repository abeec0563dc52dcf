//! Transaction ledger - placed orders, their line items and price snapshots.
//!
//! The ledger is append-only. Rows are written by checkout inside a single database
//! transaction and never updated afterwards; readers therefore see either a complete
//! order or nothing. Each line item points at its own [`price_snapshot`] so that
//! later catalog edits cannot change what an old order shows or costs.

use crate::{
    entities::{
        PriceSnapshot, Transaction, TransactionLineItem, price_snapshot, product, transaction,
        transaction_line_item,
    },
    errors::{Error, Result},
};
use sea_orm::{
    JoinType, QueryOrder, QuerySelect, Set,
    prelude::*,
    sea_query::{Expr, Func, LikeExpr},
};

/// Header fields of a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Buyer placing the order
    pub user_id: i64,
    /// Delivery address
    pub address_id: i64,
    /// Grand total in integer currency units
    pub total_price: i64,
    /// Human-facing order label
    pub invoice_code: String,
    /// Payment method label
    pub payment_method: String,
}

/// One line of an order, priced from `product` as it was read at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    /// Product being bought; frozen into the line's price snapshot
    pub product: product::Model,
    /// Units bought
    pub quantity: i32,
    /// Line total in integer currency units
    pub total_price: i64,
}

/// Produces an invoice code from the current time in nanoseconds, e.g.
/// `INV-1760860800123456789`.
///
/// Codes are unique with overwhelming probability but are not the identity of a
/// transaction; the primary key is.
#[must_use]
pub fn generate_invoice_code() -> String {
    let now = chrono::Utc::now();
    let stamp = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros());
    format!("INV-{stamp}")
}

/// Inserts the header row of an order.
pub async fn create_transaction<C>(db: &C, new: NewTransaction) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    if new.total_price < 0 {
        return Err(Error::invalid("transaction total cannot be negative"));
    }

    transaction::ActiveModel {
        user_id: Set(new.user_id),
        address_id: Set(new.address_id),
        total_price: Set(new.total_price),
        invoice_code: Set(new.invoice_code),
        payment_method: Set(new.payment_method),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Freezes `product` into a price snapshot and records a line item against it.
pub async fn record_line_item<C>(
    db: &C,
    transaction_id: i64,
    product: &product::Model,
    quantity: i32,
    total_price: i64,
) -> Result<(price_snapshot::Model, transaction_line_item::Model)>
where
    C: ConnectionTrait,
{
    let snapshot = price_snapshot::ActiveModel {
        product_id: Set(product.id),
        product_name: Set(product.name.clone()),
        slug: Set(product.slug.clone()),
        reseller_price: Set(product.reseller_price.clone()),
        consumer_price: Set(product.consumer_price.clone()),
        description: Set(product.description.clone()),
        shop_id: Set(product.shop_id),
        category_id: Set(product.category_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let line_item = transaction_line_item::ActiveModel {
        transaction_id: Set(transaction_id),
        price_snapshot_id: Set(snapshot.id),
        shop_id: Set(product.shop_id),
        quantity: Set(quantity),
        total_price: Set(total_price),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok((snapshot, line_item))
}

/// Writes a whole order: the header, then one snapshot and line item per line.
///
/// Meant to run inside a database transaction so that a failure part way leaves
/// nothing behind.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if `lines` is empty or the header total does not
/// equal the sum of the line totals, otherwise any storage error.
pub async fn record_order<C>(
    db: &C,
    header: NewTransaction,
    lines: &[NewLineItem],
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    if lines.is_empty() {
        return Err(Error::invalid("an order needs at least one line item"));
    }
    let sum = lines
        .iter()
        .try_fold(0_i64, |sum, line| sum.checked_add(line.total_price))
        .ok_or_else(|| Error::invalid("order total is too large"))?;
    if sum != header.total_price {
        return Err(Error::invalid(format!(
            "order total {} does not match line totals {sum}",
            header.total_price
        )));
    }

    let transaction = create_transaction(db, header).await?;
    for line in lines {
        record_line_item(
            db,
            transaction.id,
            &line.product,
            line.quantity,
            line.total_price,
        )
        .await?;
    }
    Ok(transaction)
}

/// Finds a transaction only if it belongs to `user_id`.
pub async fn find_transaction_for_user<C>(
    db: &C,
    user_id: i64,
    transaction_id: i64,
) -> Result<Option<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find_by_id(transaction_id)
        .filter(transaction::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Whether `transaction_id` exists and belongs to `user_id`.
pub async fn is_owned_by<C>(db: &C, transaction_id: i64, user_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(find_transaction_for_user(db, user_id, transaction_id)
        .await?
        .is_some())
}

/// A user's transactions, newest first.
///
/// With a `search` term only transactions with at least one line item whose
/// snapshotted product name contains the term are returned. `%`, `_` and `\` in the
/// term match literally. Case is ignored for ASCII letters only, the same folding
/// `SQLite`'s `lower()` applies to the column.
pub async fn find_transactions_for_user<C>(
    db: &C,
    user_id: i64,
    search: Option<&str>,
    limit: u64,
    offset: u64,
) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Transaction::find().filter(transaction::Column::UserId.eq(user_id));

    if let Some(term) = search {
        let pattern = format!("%{}%", escape_like(&term.to_ascii_lowercase()));
        query = query
            .join(JoinType::InnerJoin, transaction::Relation::LineItems.def())
            .join(
                JoinType::InnerJoin,
                transaction_line_item::Relation::PriceSnapshot.def(),
            )
            .filter(
                Expr::expr(Func::lower(Expr::col((
                    PriceSnapshot,
                    price_snapshot::Column::ProductName,
                ))))
                .like(LikeExpr::new(pattern).escape('\\')),
            )
            .distinct();
    }

    query
        .order_by_desc(transaction::Column::Id)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Line items of a transaction paired with their snapshots, in insertion order.
pub async fn get_line_items_with_snapshots<C>(
    db: &C,
    transaction_id: i64,
) -> Result<Vec<(transaction_line_item::Model, price_snapshot::Model)>>
where
    C: ConnectionTrait,
{
    TransactionLineItem::find()
        .filter(transaction_line_item::Column::TransactionId.eq(transaction_id))
        .find_also_related(PriceSnapshot)
        .order_by_asc(transaction_line_item::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|(line_item, snapshot)| -> Result<_> {
            let snapshot = snapshot.ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "price snapshot {} of line item {}",
                    line_item.price_snapshot_id, line_item.id
                ))
            })?;
            Ok((line_item, snapshot))
        })
        .collect()
}

/// Escapes the LIKE metacharacters of `term` for use with `ESCAPE '\'`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::product::{get_product_by_id, update_product};
    use crate::entities::Product;
    use crate::models::ProductPatch;
    use crate::test_utils::*;
    use sea_orm::{DatabaseConnection, TransactionTrait};

    async fn place_test_order(
        db: &DatabaseConnection,
        user_id: i64,
        address_id: i64,
        lines: &[(&product::Model, i32)],
    ) -> Result<transaction::Model> {
        let lines: Vec<NewLineItem> = lines
            .iter()
            .map(|&(product, quantity)| NewLineItem {
                product: product.clone(),
                quantity,
                total_price: product.consumer_price.parse::<i64>().unwrap()
                    * i64::from(quantity),
            })
            .collect();
        let header = NewTransaction {
            user_id,
            address_id,
            total_price: lines.iter().map(|line| line.total_price).sum(),
            invoice_code: generate_invoice_code(),
            payment_method: "COD".to_string(),
        };
        record_order(db, header, &lines).await
    }

    async fn search_ids(db: &DatabaseConnection, user_id: i64, term: &str) -> Result<Vec<i64>> {
        let found = find_transactions_for_user(db, user_id, Some(term), 10, 0).await?;
        Ok(found.iter().map(|t| t.id).collect())
    }

    #[test]
    fn test_invoice_code_format() {
        let code = generate_invoice_code();
        let digits = code.strip_prefix("INV-").unwrap();
        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_record_line_item_snapshots_product() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let product = create_test_product(&db, fixture.shop.id, "Kopi", "15000", 5).await?;

        let order = place_test_order(
            &db,
            fixture.buyer.id,
            fixture.address.id,
            &[(&product, 2)],
        )
        .await?;
        let lines = get_line_items_with_snapshots(&db, order.id).await?;

        assert_eq!(lines.len(), 1);
        let (line, snapshot) = &lines[0];
        assert_eq!(line.transaction_id, order.id);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.total_price, 30000);
        assert_eq!(line.shop_id, fixture.shop.id);
        assert_eq!(snapshot.product_id, product.id);
        assert_eq!(snapshot.product_name, "Kopi");
        assert_eq!(snapshot.consumer_price, "15000");
        assert_eq!(snapshot.reseller_price, product.reseller_price);
        assert_eq!(order.total_price, 30000);
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_ignores_later_catalog_edits() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let product = create_test_product(&db, fixture.shop.id, "Kopi", "10000", 5).await?;
        let order = place_test_order(
            &db,
            fixture.buyer.id,
            fixture.address.id,
            &[(&product, 1)],
        )
        .await?;

        update_product(
            &db,
            product.id,
            ProductPatch {
                name: Some("Kopi Premium".to_string()),
                consumer_price: Some("20000".to_string()),
                ..Default::default()
            },
        )
        .await?;

        let (_, snapshot) = get_line_items_with_snapshots(&db, order.id)
            .await?
            .pop()
            .unwrap();
        assert_eq!(snapshot.product_name, "Kopi");
        assert_eq!(snapshot.consumer_price, "10000");
        Ok(())
    }

    #[tokio::test]
    async fn test_find_transaction_for_user_is_owner_scoped() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let product = create_test_product(&db, fixture.shop.id, "Kopi", "15000", 5).await?;
        let order = place_test_order(
            &db,
            fixture.buyer.id,
            fixture.address.id,
            &[(&product, 1)],
        )
        .await?;

        assert_eq!(
            find_transaction_for_user(&db, fixture.buyer.id, order.id).await?,
            Some(order.clone())
        );
        assert_eq!(
            find_transaction_for_user(&db, fixture.seller.id, order.id).await?,
            None
        );
        assert!(is_owned_by(&db, order.id, fixture.buyer.id).await?);
        assert!(!is_owned_by(&db, order.id, fixture.seller.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_transactions_for_user_search_and_paging() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let kopi = create_test_product(&db, fixture.shop.id, "Kopi Susu", "15000", 50).await?;
        let teh = create_test_product(&db, fixture.shop.id, "Teh Manis", "8000", 50).await?;

        let first = place_test_order(
            &db,
            fixture.buyer.id,
            fixture.address.id,
            &[(&kopi, 1)],
        )
        .await?;
        let second = place_test_order(
            &db,
            fixture.buyer.id,
            fixture.address.id,
            &[(&kopi, 1), (&teh, 2)],
        )
        .await?;
        let third = place_test_order(
            &db,
            fixture.buyer.id,
            fixture.address.id,
            &[(&teh, 1)],
        )
        .await?;

        let all = find_transactions_for_user(&db, fixture.buyer.id, None, 10, 0).await?;
        assert_eq!(
            all.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![third.id, second.id, first.id]
        );

        let kopi_orders =
            find_transactions_for_user(&db, fixture.buyer.id, Some("KOPI"), 10, 0).await?;
        assert_eq!(
            kopi_orders.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );

        let page_two = find_transactions_for_user(&db, fixture.buyer.id, None, 2, 2).await?;
        assert_eq!(page_two.iter().map(|t| t.id).collect::<Vec<_>>(), vec![first.id]);

        let other = find_transactions_for_user(&db, fixture.seller.id, None, 10, 0).await?;
        assert!(other.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_transaction_cascades_to_line_items() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let product = create_test_product(&db, fixture.shop.id, "Kopi", "15000", 5).await?;
        let order = place_test_order(
            &db,
            fixture.buyer.id,
            fixture.address.id,
            &[(&product, 1)],
        )
        .await?;

        Transaction::delete_by_id(order.id).exec(&db).await?;

        assert_eq!(TransactionLineItem::find().count(&db).await?, 0);
        // Snapshots are not owned by the transaction row
        assert_eq!(PriceSnapshot::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_outlives_product() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let product = create_test_product(&db, fixture.shop.id, "Kopi", "15000", 5).await?;
        let order = place_test_order(
            &db,
            fixture.buyer.id,
            fixture.address.id,
            &[(&product, 1)],
        )
        .await?;

        Product::delete_by_id(product.id).exec(&db).await?;
        assert!(get_product_by_id(&db, product.id).await?.is_none());

        let lines = get_line_items_with_snapshots(&db, order.id).await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].1.product_id, product.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_discarded() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let product = create_test_product(&db, fixture.shop.id, "Kopi", "15000", 5).await?;

        let txn = db.begin().await?;
        let header = create_transaction(
            &txn,
            NewTransaction {
                user_id: fixture.buyer.id,
                address_id: fixture.address.id,
                total_price: 15000,
                invoice_code: generate_invoice_code(),
                payment_method: "COD".to_string(),
            },
        )
        .await?;
        record_line_item(&txn, header.id, &product, 1, 15000).await?;
        txn.rollback().await?;

        assert_eq!(Transaction::find().count(&db).await?, 0);
        assert_eq!(TransactionLineItem::find().count(&db).await?, 0);
        assert_eq!(PriceSnapshot::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_order_rejects_inconsistent_totals() -> Result<()> {
        // Rejected before any statement reaches the database
        let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Sqlite).into_connection();
        let (real_db, fixture) = setup_marketplace().await?;
        let product = create_test_product(&real_db, fixture.shop.id, "Kopi", "15000", 5).await?;
        let header = |total_price| NewTransaction {
            user_id: fixture.buyer.id,
            address_id: fixture.address.id,
            total_price,
            invoice_code: generate_invoice_code(),
            payment_method: "COD".to_string(),
        };
        let line = NewLineItem {
            product,
            quantity: 2,
            total_price: 30000,
        };

        assert!(matches!(
            record_order(&db, header(0), &[]).await,
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            record_order(&db, header(29999), &[line.clone()]).await,
            Err(Error::InvalidInput { .. })
        ));

        let order = record_order(&real_db, header(30000), &[line]).await?;
        assert_eq!(get_line_items_with_snapshots(&real_db, order.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_treats_like_metacharacters_literally() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let kopi = create_test_product(&db, fixture.shop.id, "Kopi", "15000", 5).await?;
        let promo = create_test_product(&db, fixture.shop.id, "Diskon_50%", "5000", 5).await?;
        let kopi_order =
            place_test_order(&db, fixture.buyer.id, fixture.address.id, &[(&kopi, 1)]).await?;
        let promo_order =
            place_test_order(&db, fixture.buyer.id, fixture.address.id, &[(&promo, 1)]).await?;

        assert!(search_ids(&db, fixture.buyer.id, "k_pi").await?.is_empty());
        assert!(search_ids(&db, fixture.buyer.id, "k%i").await?.is_empty());
        assert_eq!(search_ids(&db, fixture.buyer.id, "_").await?, vec![promo_order.id]);
        assert_eq!(search_ids(&db, fixture.buyer.id, "%").await?, vec![promo_order.id]);
        assert_eq!(search_ids(&db, fixture.buyer.id, "n_50%").await?, vec![promo_order.id]);
        assert_eq!(search_ids(&db, fixture.buyer.id, "KOPI").await?, vec![kopi_order.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_folds_ascii_case_only() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let product = create_test_product(&db, fixture.shop.id, "KÖPI", "15000", 5).await?;
        let order =
            place_test_order(&db, fixture.buyer.id, fixture.address.id, &[(&product, 1)]).await?;

        assert_eq!(search_ids(&db, fixture.buyer.id, "KÖPI").await?, vec![order.id]);
        assert_eq!(search_ids(&db, fixture.buyer.id, "kÖpi").await?, vec![order.id]);
        Ok(())
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("kopi"), "kopi");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
