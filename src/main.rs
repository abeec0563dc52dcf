#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use marketplace::{
    config::{AppConfig, database, seed},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = AppConfig::from_env()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!(config = ?app_config, "Successfully processed application configuration.");

    // 4. Connect and make sure the schema exists
    let db = database::connect(&app_config)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed the catalog on first start
    if let Some(path) = &app_config.seed_file {
        let data = seed::load_seed(path)
            .inspect_err(|e| error!("Failed to load seed file {:?}: {}", path, e))?;
        seed::seed_database(&db, &data)
            .await
            .inspect(|seeded| info!(seeded, "Seed step finished."))
            .inspect_err(|e| error!("Failed to seed database: {}", e))?;
    }

    info!("Marketplace backend ready.");
    db.close().await?;
    Ok(())
}
