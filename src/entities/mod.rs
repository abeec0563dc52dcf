//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Rows reference each other by id only; relations are declared on the child side.

pub mod address;
pub mod category;
pub mod price_snapshot;
pub mod product;
pub mod product_image;
pub mod shop;
pub mod transaction;
pub mod transaction_line_item;
pub mod user;

// Re-export specific types to avoid conflicts
pub use address::{Column as AddressColumn, Entity as Address, Model as AddressModel};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use price_snapshot::{
    Column as PriceSnapshotColumn, Entity as PriceSnapshot, Model as PriceSnapshotModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use product_image::{
    Column as ProductImageColumn, Entity as ProductImage, Model as ProductImageModel,
};
pub use shop::{Column as ShopColumn, Entity as Shop, Model as ShopModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use transaction_line_item::{
    Column as TransactionLineItemColumn, Entity as TransactionLineItem,
    Model as TransactionLineItemModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
