//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PhonebookConfig;
use crate::db::Store;
use crate::services::{AddressService, PasswordError, PasswordHasher, TokenCodec, UserService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Everything inside is built
/// once at startup and read-only afterwards.
pub struct AppState<S> {
    inner: Arc<AppStateInner<S>>,
}

struct AppStateInner<S> {
    config: PhonebookConfig,
    store: S,
    tokens: TokenCodec,
    users: UserService<S>,
    addresses: AddressService<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Store> AppState<S> {
    /// Create the application state, hashing passwords with the configured
    /// argon2 costs.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if argon2 rejects the costs.
    pub fn new(config: PhonebookConfig, store: S) -> Result<Self, PasswordError> {
        let hasher = PasswordHasher::from_config(&config.auth)?;
        Ok(Self::with_hasher(config, store, hasher))
    }

    /// Create the application state with an explicit password hasher.
    #[must_use]
    pub fn with_hasher(config: PhonebookConfig, store: S, hasher: PasswordHasher) -> Self {
        let tokens = TokenCodec::from_config(&config.auth);
        let users = UserService::new(store.clone(), hasher, tokens.clone());
        let addresses = AddressService::new(store.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                tokens,
                users,
                addresses,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &PhonebookConfig {
        &self.inner.config
    }

    /// Get a reference to the backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Get a reference to the session token codec.
    #[must_use]
    pub fn tokens(&self) -> &TokenCodec {
        &self.inner.tokens
    }

    /// Get a reference to the user service.
    #[must_use]
    pub fn users(&self) -> &UserService<S> {
        &self.inner.users
    }

    /// Get a reference to the address service.
    #[must_use]
    pub fn addresses(&self) -> &AddressService<S> {
        &self.inner.addresses
    }
}
