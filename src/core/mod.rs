//! Core business logic, independent of any transport.
//!
//! Store functions are generic over [`sea_orm::ConnectionTrait`] so the same code
//! runs on a pooled connection or inside an open database transaction. The checkout
//! workflow relies on that to group every write of an order into one commit.

/// Address store: delivery addresses owned by users
pub mod address;
/// Category lookup and creation
pub mod category;
/// Order placement
pub mod checkout;
/// Transaction ledger: orders, line items and price snapshots
pub mod ledger;
/// Catalog store: products, stock and images
pub mod product;
/// Read-side assembly of placed orders
pub mod query;
/// Shop lookup and creation
pub mod shop;
/// User lookup and creation
pub mod user;
