//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying `sub` (the user id as a decimal string),
//! `iss`, `iat` and `exp`. They are stateless: nothing is stored server-side
//! and a token stays valid until it expires.

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use phonebook_core::{ClientError, UserId};

use crate::config::AuthConfig;

/// How long an issued token stays valid, in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Clock skew tolerated on `exp` and `iat`, in seconds.
const LEEWAY_SECS: i64 = 60;

/// Failure to sign a token. Unclassified: callers surface it as a 500.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Issues and resolves session tokens with a symmetric secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    validation: Validation,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec signing with `secret` and asserting `issuer`.
    #[must_use]
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = LEEWAY_SECS.unsigned_abs();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer,
            validation,
        }
    }

    /// Create a codec from the auth configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.jwt_secret.expose_secret().as_bytes(),
            config.jwt_issuer.clone(),
        )
    }

    /// Issue a token for `user`, valid for one hour from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn issue(&self, user: UserId) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token for `user` as if it were issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn issue_at(&self, user: UserId, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = issued_at.timestamp();
        let claims = Claims {
            sub: user.to_string(),
            iss: self.issuer.clone(),
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify a token and return the user it was issued for.
    ///
    /// # Errors
    ///
    /// Every verification failure is `ClientError::Authentication`: bad
    /// signature or algorithm, wrong issuer, missing or invalid timing
    /// claims, expiry, and a non-integer subject.
    pub fn resolve(&self, token: &str) -> Result<UserId, ClientError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                rejected()
            })?
            .claims;

        if claims.iat > Utc::now().timestamp() + LEEWAY_SECS {
            tracing::debug!(iat = claims.iat, "Token rejected: issued in the future");
            return Err(rejected());
        }

        claims.sub.parse::<UserId>().map_err(|e| {
            tracing::debug!(error = %e, "Token rejected: subject is not a user id");
            rejected()
        })
    }
}

fn rejected() -> ClientError {
    ClientError::authentication("invalid or expired token")
}
