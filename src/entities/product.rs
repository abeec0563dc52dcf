//! Product entity - A catalog listing owned by a shop.
//!
//! Prices are stored as decimal strings (reseller and consumer) and parsed only when
//! an order is priced. `stock` never goes below zero; checkout lowers it with a
//! conditional update, see [`crate::core::product::decrement_stock`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Shop that lists this product
    pub shop_id: i64,
    /// Optional category
    pub category_id: Option<i64>,
    /// Display name
    pub name: String,
    /// URL-friendly name
    pub slug: String,
    /// Price offered to resellers, as a decimal string
    pub reseller_price: String,
    /// Price charged to buyers at checkout, as a decimal string
    pub consumer_price: String,
    /// Units available for sale
    pub stock: i32,
    /// Free-form description
    pub description: String,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one shop
    #[sea_orm(
        belongs_to = "super::shop::Entity",
        from = "Column::ShopId",
        to = "super::shop::Column::Id",
        on_delete = "Cascade"
    )]
    Shop,
    /// Products may be filed under a category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    /// Product photos
    #[sea_orm(has_many = "super::product_image::Entity")]
    Images,
}

impl Related<super::shop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
