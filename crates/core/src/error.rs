//! Classified failures that are safe to show to callers.
//!
//! The set is closed: any failure that is not a [`ClientError`] is an
//! internal error, and transports must answer it with a generic 500 without
//! echoing its details.

use thiserror::Error;

/// A failure the caller caused and may be told about.
///
/// Each variant carries a caller-safe message plus a stable application code
/// and an HTTP status.
///
/// # Examples
///
/// ```
/// use phonebook_core::ClientError;
///
/// let err = ClientError::authorization("unauthorized update");
/// assert_eq!(err.http_status(), 403);
/// assert_eq!(err.code(), 103);
/// assert_eq!(err.message(), "unauthorized update");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The caller's identity could not be established (missing, invalid or
    /// expired token).
    #[error("{0}")]
    Authentication(String),

    /// The caller is known but may not act on the target resource.
    #[error("{0}")]
    Authorization(String),

    /// A business rule was violated (duplicate email, wrong credentials).
    #[error("{0}")]
    Invariant(String),

    /// The referenced resource does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl ClientError {
    /// Convenience constructor for [`ClientError::Authentication`].
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Convenience constructor for [`ClientError::Authorization`].
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    /// Convenience constructor for [`ClientError::Invariant`].
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    /// Convenience constructor for [`ClientError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Stable application error code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Invariant(_) => 100,
            Self::Authentication(_) => 101,
            Self::Authorization(_) => 103,
            Self::NotFound(_) => 104,
        }
    }

    /// HTTP status code a transport should answer with.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Invariant(_) => 400,
            Self::Authentication(_) => 401,
            Self::Authorization(_) => 403,
            Self::NotFound(_) => 404,
        }
    }

    /// Caller-safe description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Authentication(message)
            | Self::Authorization(message)
            | Self::Invariant(message)
            | Self::NotFound(message) => message,
        }
    }
}
