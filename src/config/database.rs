//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema (including foreign keys and their
//! `ON DELETE` behaviour) always matches the Rust structs.

use crate::config::AppConfig;
use crate::entities::{
    Address, Category, PriceSnapshot, Product, ProductImage, Shop, Transaction,
    TransactionLineItem, User,
};
use crate::errors::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Opens a pooled connection using the configured URL and pool size.
#[instrument(skip(config), fields(url = %config.database_url))]
pub async fn connect(config: &AppConfig) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(&config.database_url) {
        std::fs::create_dir_all(dir)?;
    }
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);
    if let Some(max) = config.max_connections {
        options.max_connections(max);
    }

    let db = Database::connect(options).await?;
    info!("Database connection established");
    Ok(db)
}

/// Directory that must exist before `SQLite` can create the database file.
fn sqlite_parent_dir(url: &str) -> Option<&Path> {
    let path = url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or(path);
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Creates every table that does not exist yet.
///
/// Parents are created before children so the generated foreign keys resolve on
/// backends that check them eagerly.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, User).await?;
    create_table(db, Shop).await?;
    create_table(db, Category).await?;
    create_table(db, Product).await?;
    create_table(db, ProductImage).await?;
    create_table(db, Address).await?;
    create_table(db, PriceSnapshot).await?;
    create_table(db, Transaction).await?;
    create_table(db, TransactionLineItem).await?;
    info!("Database tables ensured");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    debug!(table = entity.table_name(), "Creating table if missing");
    let mut statement = schema.create_table_from_entity(entity);
    db.execute(builder.build(statement.if_not_exists())).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        price_snapshot::Model as PriceSnapshotModel, product::Model as ProductModel,
        transaction::Model as TransactionModel,
        transaction_line_item::Model as TransactionLineItemModel,
    };
    use sea_orm::QuerySelect;

    fn memory_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            max_connections: Some(1),
            seed_file: None,
            token_secret: None,
        }
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = connect(&memory_config()).await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<TransactionModel> = Transaction::find().limit(1).all(&db).await?;
        let _: Vec<TransactionLineItemModel> =
            TransactionLineItem::find().limit(1).all(&db).await?;
        let _: Vec<PriceSnapshotModel> = PriceSnapshot::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = connect(&memory_config()).await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir("sqlite://data/marketplace.sqlite?mode=rwc"),
            Some(Path::new("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite://local.sqlite"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
    }
}
