//! Checkout - turns a list of requested products into a placed order.
//!
//! Placing an order runs in two phases:
//!
//! 1. **Validation** (no writes): request shape, address ownership, and for every line
//!    the product's existence, available stock and price. Totals are computed here.
//! 2. **Commit** (one database transaction): the transaction header, one price snapshot
//!    and line item per line, and a conditional stock decrement per line. Either every
//!    write lands or the transaction is rolled back and none does.
//!
//! Stock read during validation may be stale by the time the commit runs. The
//! conditional decrement in [`product::decrement_stock`] re-checks it atomically, so
//! concurrent buyers of the last unit cannot both succeed.

use crate::{
    core::{
        address,
        ledger::{self, NewLineItem, NewTransaction},
        product,
    },
    errors::{Error, Result},
    models::{LineItemRequest, PlaceOrderRequest},
};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, error, info, instrument, warn};

/// Places an order for `buyer_id` and returns the new transaction id.
///
/// `buyer_id` must come from an already verified session.
///
/// # Errors
/// Validation failures are returned as they are and leave the database untouched:
/// - [`Error::InvalidInput`] for a malformed request
/// - [`Error::AddressNotFound`] / [`Error::Forbidden`] for a bad delivery address
/// - [`Error::ProductNotFound`] for an unknown product
/// - [`Error::InsufficientStock`] when a line asks for more than is available
/// - [`Error::InvalidPrice`] when a product's stored price is unusable
///
/// A commit that loses a stock race is rolled back and reported as
/// [`Error::InsufficientStock`]. Any other commit failure is rolled back, logged, and
/// reported as [`Error::OrderFailed`].
#[instrument(
    skip(db, request),
    fields(address_id = request.address_id, lines = request.line_items.len())
)]
pub async fn place_order(
    db: &DatabaseConnection,
    buyer_id: i64,
    request: &PlaceOrderRequest,
) -> Result<i64> {
    validate_request(request)
        .inspect_err(|e| debug!(error = %e, "Rejected malformed order request"))?;
    debug!(buyer_id, "Order request accepted");

    address::verify_owner(db, request.address_id, buyer_id)
        .await
        .inspect_err(|e| warn!(error = %e, "Rejected delivery address"))?;

    let mut lines = Vec::with_capacity(request.line_items.len());
    let mut grand_total: i64 = 0;
    for item in &request.line_items {
        let line = price_line(db, item)
            .await
            .inspect_err(|e| warn!(product_id = item.product_id, error = %e, "Rejected order line"))?;
        grand_total = grand_total
            .checked_add(line.total_price)
            .ok_or_else(|| Error::invalid("order total is too large"))?;
        lines.push(line);
    }

    let header = NewTransaction {
        user_id: buyer_id,
        address_id: request.address_id,
        total_price: grand_total,
        invoice_code: ledger::generate_invoice_code(),
        payment_method: request.payment_method.trim().to_string(),
    };
    let invoice_code = header.invoice_code.clone();

    let txn = db.begin().await.map_err(|e| commit_failure(&Error::from(e)))?;
    match commit_order(&txn, header, &lines).await {
        Ok(transaction_id) => {
            txn.commit().await.map_err(|e| commit_failure(&Error::from(e)))?;
            info!(
                transaction_id,
                %invoice_code,
                total_price = grand_total,
                "Order placed"
            );
            Ok(transaction_id)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                error!(error = %rollback_err, "Rollback after failed order commit failed");
            }
            if matches!(err, Error::InsufficientStock { .. }) {
                warn!(error = %err, "Order lost a stock race and was rolled back");
                Err(err)
            } else {
                Err(commit_failure(&err))
            }
        }
    }
}

/// Checks the request shape before anything is read from the database.
fn validate_request(request: &PlaceOrderRequest) -> Result<()> {
    if request.payment_method.trim().is_empty() {
        return Err(Error::invalid("payment_method is required"));
    }
    if request.address_id <= 0 {
        return Err(Error::invalid("address_id is required"));
    }
    if request.line_items.is_empty() {
        return Err(Error::invalid("at least one line item is required"));
    }
    for (index, item) in request.line_items.iter().enumerate() {
        if item.product_id <= 0 {
            return Err(Error::invalid(format!(
                "line_items[{index}].product_id is required"
            )));
        }
        if item.quantity <= 0 {
            return Err(Error::invalid(format!(
                "line_items[{index}].quantity must be greater than zero"
            )));
        }
    }
    Ok(())
}

/// Loads the product for one line, checks stock and computes the line total.
async fn price_line(db: &DatabaseConnection, item: &LineItemRequest) -> Result<NewLineItem> {
    let product = product::get_product_by_id(db, item.product_id)
        .await?
        .ok_or(Error::ProductNotFound {
            id: item.product_id,
        })?;

    if item.quantity > product.stock {
        return Err(Error::InsufficientStock {
            product_id: product.id,
            available: product.stock,
            requested: item.quantity,
        });
    }

    let unit_price = product::parse_consumer_price(&product)?;
    let total_price = unit_price
        .checked_mul(i64::from(item.quantity))
        .ok_or_else(|| Error::invalid(format!("line total for product {} is too large", product.id)))?;

    Ok(NewLineItem {
        product,
        quantity: item.quantity,
        total_price,
    })
}

/// Every write of an order. Runs inside `txn`; the caller commits or rolls back.
async fn commit_order(
    txn: &DatabaseTransaction,
    header: NewTransaction,
    lines: &[NewLineItem],
) -> Result<i64> {
    let transaction = ledger::record_order(txn, header, lines).await?;

    for line in lines {
        product::decrement_stock(txn, line.product.id, line.quantity).await?;
    }

    Ok(transaction.id)
}

/// Logs the real cause and returns the opaque error shown to callers.
fn commit_failure(cause: &Error) -> Error {
    error!(error = %cause, "Order commit failed");
    Error::OrderFailed
}
