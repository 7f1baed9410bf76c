//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! phonebook-cli migrate
//! phonebook-cli migrate --database-url postgres://localhost/phonebook
//! ```
//!
//! # Environment Variables
//!
//! Without `--database-url`, the URL is resolved like the server does:
//! `PHONEBOOK_DATABASE_URL`, then `DATABASE_URL`, then the `DATABASE_*`
//! parts.
//!
//! # Migration Files
//!
//! Embedded at compile time from `crates/server/migrations/`.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use phonebook_server::config::{self, ConfigError};

/// Errors from running migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL cannot be resolved, the database is
/// unreachable, or a migration fails.
pub async fn run(database_url: Option<String>) -> Result<(), MigrationError> {
    let database_url = match database_url {
        Some(url) => SecretString::from(url),
        None => config::database_url_from_env()?,
    };

    tracing::info!("Connecting to phonebook database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running phonebook migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Phonebook migrations complete!");
    Ok(())
}
