//! Application configuration.
//!
//! [`AppConfig`] is built once at start-up from the environment (after `.env` has
//! been loaded) and handed down by reference. Nothing in the crate reads the
//! environment after that point.

/// Database connection and table creation
pub mod database;

/// Catalog seed data loaded from a TOML file
pub mod seed;

use crate::errors::{Error, Result};
use std::{fmt, path::PathBuf};

/// Used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/marketplace.sqlite?mode=rwc";

/// Seed file picked up when `SEED_FILE` is not set and the file exists.
pub const DEFAULT_SEED_FILE: &str = "config.toml";

/// Process-wide settings.
#[derive(Clone)]
pub struct AppConfig {
    /// SeaORM connection string
    pub database_url: String,
    /// Upper bound on pooled connections; driver default when `None`
    pub max_connections: Option<u32>,
    /// TOML file used to seed an empty database
    pub seed_file: Option<PathBuf>,
    /// Secret shared with the session-token verifier
    pub token_secret: Option<String>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("max_connections", &self.max_connections)
            .field("seed_file", &self.seed_file)
            .field(
                "token_secret",
                &self.token_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if a variable is present but malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Recognised keys: `DATABASE_URL`, `DB_MAX_CONNECTIONS`, `SEED_FILE`, `TOKEN_SECRET`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `DB_MAX_CONNECTIONS` is not a positive integer or
    /// `TOKEN_SECRET` is set but empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_connections = lookup("DB_MAX_CONNECTIONS")
            .map(|raw| {
                raw.trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| Error::Config {
                        message: format!("DB_MAX_CONNECTIONS must be a positive integer, got {raw:?}"),
                    })
            })
            .transpose()?;

        let seed_file = lookup("SEED_FILE").map_or_else(
            || {
                let default = PathBuf::from(DEFAULT_SEED_FILE);
                default.exists().then_some(default)
            },
            |path| Some(PathBuf::from(path)),
        );

        let token_secret = match lookup("TOKEN_SECRET") {
            Some(secret) if secret.is_empty() => {
                return Err(Error::Config {
                    message: "TOKEN_SECRET is set but empty".to_string(),
                });
            }
            other => other,
        };

        Ok(Self {
            database_url,
            max_connections,
            seed_file,
            token_secret,
        })
    }
}
