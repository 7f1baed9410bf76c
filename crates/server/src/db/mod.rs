//! Persistence for the phonebook.
//!
//! # Database: `phonebook`
//!
//! ## Tables
//!
//! - `phonebook.users` - Accounts (unique email, Argon2 password hash)
//! - `phonebook.addresses` - Contact records, each owned by one user
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p phonebook-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Services only see the [`UserStore`] and [`AddressStore`] traits. Absence is
//! always `Ok(None)`; `Err` means the query itself failed.
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx
//! - [`MemoryStore`] - in-process tables for tests (`test-support` feature)

pub mod addresses;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod users;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use phonebook_core::{AddressId, Email, UserId};

use crate::models::{Address, User};

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Account persistence.
pub trait UserStore: Send + Sync {
    /// Insert a user and return the id the store assigned.
    ///
    /// Must fail with [`RepositoryError::Conflict`] when the email is taken.
    fn create_user(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> impl Future<Output = Result<UserId, RepositoryError>> + Send;

    /// Find a user by exact (case-sensitive) email.
    fn find_user_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;
}

/// Contact record persistence.
pub trait AddressStore: Send + Sync {
    /// Insert an address and return the stored record.
    fn create_address(
        &self,
        owner: UserId,
        name: &str,
        phone_number: &str,
    ) -> impl Future<Output = Result<Address, RepositoryError>> + Send;

    /// Every address, regardless of owner.
    fn list_addresses(&self) -> impl Future<Output = Result<Vec<Address>, RepositoryError>> + Send;

    /// Addresses owned by `owner`.
    fn list_addresses_by_owner(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Address>, RepositoryError>> + Send;

    /// One address by id.
    fn find_address(
        &self,
        id: AddressId,
    ) -> impl Future<Output = Result<Option<Address>, RepositoryError>> + Send;

    /// Overwrite name and phone number. Fails with [`RepositoryError::NotFound`]
    /// if the row is gone.
    fn update_address(
        &self,
        id: AddressId,
        name: &str,
        phone_number: &str,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove an address. Fails with [`RepositoryError::NotFound`] if the row
    /// is gone.
    fn delete_address(
        &self,
        id: AddressId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// A complete backing store for the application state.
pub trait Store: UserStore + AddressStore + Clone + 'static {
    /// Cheap connectivity check for readiness probes.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// `PostgreSQL`-backed store.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map insert failures, turning constraint violations into
/// [`RepositoryError::Conflict`].
fn map_insert_error(e: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
    {
        return RepositoryError::Conflict(conflict.to_owned());
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
