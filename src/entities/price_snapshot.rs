//! Price snapshot entity - An immutable copy of a product taken at purchase time.
//!
//! `product_id`, `shop_id` and `category_id` are plain columns rather than foreign
//! keys: a snapshot must survive the deletion of the product, shop or category it
//! was copied from.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Price snapshot database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_snapshots")]
pub struct Model {
    /// Unique identifier for the snapshot
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product the snapshot was copied from
    pub product_id: i64,
    /// Product name at purchase time
    pub product_name: String,
    /// Product slug at purchase time
    pub slug: String,
    /// Reseller price at purchase time
    pub reseller_price: String,
    /// Consumer price at purchase time
    pub consumer_price: String,
    /// Description at purchase time
    pub description: String,
    /// Selling shop at purchase time
    pub shop_id: i64,
    /// Category at purchase time
    pub category_id: Option<i64>,
    /// When the snapshot was taken
    pub created_at: DateTimeUtc,
}

/// Defines relationships between snapshots and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Line items priced from this snapshot
    #[sea_orm(has_many = "super::transaction_line_item::Entity")]
    LineItems,
}

impl Related<super::transaction_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
