//! Transaction line item entity - One priced product line of an order.
//!
//! A line item points at the [`price_snapshot`](super::price_snapshot) taken at
//! checkout, never at the live product. `total_price` is the snapshot's consumer
//! price times `quantity`, fixed at creation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Line item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_line_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent transaction
    pub transaction_id: i64,
    /// Frozen product facts this line was priced from
    pub price_snapshot_id: i64,
    /// Selling shop, denormalized for grouping
    pub shop_id: i64,
    /// Units bought, always positive
    pub quantity: i32,
    /// Line total in integer currency units
    pub total_price: i64,
}

/// Defines relationships between line items and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Deleting a transaction deletes its lines
    #[sea_orm(
        belongs_to = "super::transaction::Entity",
        from = "Column::TransactionId",
        to = "super::transaction::Column::Id",
        on_delete = "Cascade"
    )]
    Transaction,
    /// Snapshot the line was priced from
    #[sea_orm(
        belongs_to = "super::price_snapshot::Entity",
        from = "Column::PriceSnapshotId",
        to = "super::price_snapshot::Column::Id"
    )]
    PriceSnapshot,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::price_snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceSnapshot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
