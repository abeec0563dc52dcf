//! Transaction entity - The root of a placed order in the ledger.
//!
//! A transaction is written once by checkout together with its line items and never
//! updated afterwards. `total_price` is the sum of its line items' `total_price`.
//! The delivery address is referenced by id, so later edits to the address show up
//! when the transaction is read again.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Buyer who placed the order
    pub user_id: i64,
    /// Delivery address, looked up live on read
    pub address_id: i64,
    /// Grand total in integer currency units
    pub total_price: i64,
    /// Human-facing order label
    pub invoice_code: String,
    /// Payment method label chosen by the buyer
    pub payment_method: String,
    /// When the order was placed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one buyer
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Line items of this order
    #[sea_orm(has_many = "super::transaction_line_item::Entity")]
    LineItems,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::transaction_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
