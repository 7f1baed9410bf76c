//! Business logic services.
//!
//! # Services
//!
//! - [`UserService`] - registration and login, issuing session tokens
//! - [`AddressService`] - owner-checked contact records
//!
//! # Codecs
//!
//! - [`PasswordHasher`] - Argon2id password hashing
//! - [`TokenCodec`] - HS256 session tokens
//!
//! Services return [`ServiceError`]. Only its `Client` variant may be shown
//! to callers; everything else is an internal failure.

pub mod addresses;
pub mod password;
pub mod token;
pub mod users;

use thiserror::Error;

use phonebook_core::ClientError;

use crate::db::RepositoryError;

pub use addresses::AddressService;
pub use password::{PasswordError, PasswordHasher};
pub use token::{TokenCodec, TokenError};
pub use users::UserService;

/// Errors returned by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Classified failure, safe to report to the caller.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Store failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing failure.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token signing failure.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ServiceError {
    /// The classified error, if this is one.
    #[must_use]
    pub const fn as_client(&self) -> Option<&ClientError> {
        match self {
            Self::Client(err) => Some(err),
            _ => None,
        }
    }
}
