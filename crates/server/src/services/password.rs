//! One-way password hashing with Argon2id.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

use crate::config::AuthConfig;

/// Errors from hashing or verifying a password.
///
/// Never raised because of the plaintext itself.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The cost parameters were rejected by argon2.
    #[error("invalid argon2 parameters: {0}")]
    InvalidParams(String),

    /// Hashing failed, or the stored hash is not a valid PHC string.
    #[error("password encoding failed: {0}")]
    Encoding(String),
}

/// Argon2id hasher producing PHC strings with a random per-call salt.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    params: Params,
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Create a hasher with the given memory (KiB) and iteration costs.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if argon2 rejects the costs.
    pub fn new(m_cost: u32, t_cost: u32) -> Result<Self, PasswordError> {
        let params = Params::new(m_cost, t_cost, Params::DEFAULT_P_COST, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone()),
            params,
        })
    }

    /// Create a hasher from the auth configuration.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if argon2 rejects the costs.
    pub fn from_config(config: &AuthConfig) -> Result<Self, PasswordError> {
        Self::new(config.argon2_m_cost, config.argon2_t_cost)
    }

    /// Hash a plaintext password.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::Encoding` if argon2 fails internally.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Encoding(e.to_string()))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Parameters are read from the hash, so hashes made under other costs
    /// still verify. A mismatch is `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::Encoding` if `hash` is malformed.
    pub fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::Encoding(e.to_string()))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Encoding(e.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(8, 1).unwrap()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted() {
        let hasher = test_hasher();
        let first = hasher.hash("pw123").unwrap();
        let second = hasher.hash("pw123").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(hasher.verify(&first, "pw123").unwrap());
        assert!(hasher.verify(&second, "pw123").unwrap());
    }

    #[test]
    fn test_mismatch_is_false() {
        let hasher = test_hasher();
        let hash = hasher.hash("pw123").unwrap();
        assert!(!hasher.verify(&hash, "pw124").unwrap());
        assert!(!hasher.verify(&hash, "").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let hasher = test_hasher();
        assert!(matches!(
            hasher.verify("not-a-phc-string", "pw123"),
            Err(PasswordError::Encoding(_))
        ));
    }

    #[test]
    fn test_verifies_hash_from_other_costs() {
        let hash = PasswordHasher::new(16, 2).unwrap().hash("pw123").unwrap();
        assert!(test_hasher().verify(&hash, "pw123").unwrap());
    }

    #[test]
    fn test_rejects_invalid_params() {
        assert!(matches!(
            PasswordHasher::new(1, 0),
            Err(PasswordError::InvalidParams(_))
        ));
    }
}
