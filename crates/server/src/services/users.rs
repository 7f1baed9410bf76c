//! Account registration and login.

use phonebook_core::{ClientError, Email};

use super::{PasswordHasher, ServiceError, TokenCodec};
use crate::db::{RepositoryError, UserStore};

const EMAIL_TAKEN: &str = "email already registered";
const BAD_CREDENTIALS: &str = "incorrect email or password";

/// Registration and login over a [`UserStore`].
#[derive(Debug)]
pub struct UserService<S> {
    store: S,
    hasher: PasswordHasher,
    tokens: TokenCodec,
}

impl<S: UserStore> UserService<S> {
    /// Create a new user service.
    #[must_use]
    pub const fn new(store: S, hasher: PasswordHasher, tokens: TokenCodec) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Register a new account and return a session token for it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Invariant` if the email is already registered,
    /// including when a concurrent registration wins the unique constraint.
    /// Store, hashing and signing failures are returned unclassified.
    pub async fn register(&self, email: &Email, password: &str) -> Result<String, ServiceError> {
        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(ClientError::invariant(EMAIL_TAKEN).into());
        }

        let password_hash = self.hasher.hash(password)?;

        let user_id = self
            .store
            .create_user(email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ClientError::invariant(EMAIL_TAKEN).into(),
                other => ServiceError::Repository(other),
            })?;

        let token = self.tokens.issue(user_id)?;
        tracing::info!(user_id = %user_id, "User registered");

        Ok(token)
    }

    /// Check credentials and return a session token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Invariant` with the same message whether the
    /// email is unknown or the password is wrong.
    pub async fn login(&self, email: &Email, password: &str) -> Result<String, ServiceError> {
        let Some(user) = self.store.find_user_by_email(email).await? else {
            return Err(ClientError::invariant(BAD_CREDENTIALS).into());
        };

        if !self.hasher.verify(&user.password_hash, password)? {
            return Err(ClientError::invariant(BAD_CREDENTIALS).into());
        }

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(token)
    }
}
