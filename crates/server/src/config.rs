//! Phonebook configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PHONEBOOK_JWT_SECRET` - Token signing secret (min 32 chars, high entropy).
//!   Falls back to `JWT_SECRET`.
//! - `PHONEBOOK_JWT_ISSUER` - Issuer claim stamped on and required of every
//!   token. Falls back to `JWT_ISSUER`.
//! - `PHONEBOOK_DATABASE_URL` - `PostgreSQL` connection string. Falls back to
//!   `DATABASE_URL`, then to a URL assembled from `DATABASE_USER`,
//!   `DATABASE_PASS`, `DATABASE_HOST`, `DATABASE_PORT` and `DATABASE`.
//!
//! ## Optional
//! - `PHONEBOOK_HOST` - Bind address (default: 127.0.0.1)
//! - `PHONEBOOK_PORT` - Listen port (default: 8080). Falls back to `PORT`.
//! - `PHONEBOOK_REQUEST_TIMEOUT_SECS` - Per-request deadline (default: 30)
//! - `PHONEBOOK_ARGON2_M_COST` - Argon2 memory cost in KiB (default: 19456)
//! - `PHONEBOOK_ARGON2_T_COST` - Argon2 iterations (default: 2)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Phonebook application configuration.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PhonebookConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deadline applied to every request
    pub request_timeout: Duration,
    /// Token signing and password hashing settings
    pub auth: AuthConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry performance traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Credential and session token settings.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens
    pub jwt_secret: SecretString,
    /// Issuer claim written to and required of every token
    pub jwt_issuer: String,
    /// Argon2 memory cost in KiB
    pub argon2_m_cost: u32,
    /// Argon2 iteration count
    pub argon2_t_cost: u32,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("argon2_m_cost", &self.argon2_m_cost)
            .field("argon2_t_cost", &self.argon2_t_cost)
            .finish()
    }
}

impl PhonebookConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `from_env` passes the process environment; tests pass a map.
    ///
    /// # Errors
    ///
    /// See [`PhonebookConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let database_url = env.database_url()?;
        let host = env
            .or_default("PHONEBOOK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PHONEBOOK_HOST".to_string(), e.to_string()))?;
        let port = env
            .first_of(&["PHONEBOOK_PORT", "PORT"])
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PHONEBOOK_PORT".to_string(), e.to_string()))?;
        let request_timeout = Duration::from_secs(env.parsed_or(
            "PHONEBOOK_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);

        let auth = AuthConfig::from_env(&env)?;

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            request_timeout,
            auth,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Resolve only the database URL from the environment.
///
/// For tooling such as migrations, which must not require the signing secret.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if no database URL can be assembled.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();

    Env(|key: &str| std::env::var(key).ok()).database_url()
}

impl AuthConfig {
    fn from_env<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = env
            .first_of(&["PHONEBOOK_JWT_SECRET", "JWT_SECRET"])
            .ok_or_else(|| ConfigError::MissingEnvVar("PHONEBOOK_JWT_SECRET".to_string()))?;
        validate_secret_strength(&secret, "PHONEBOOK_JWT_SECRET")?;
        let jwt_secret = SecretString::from(secret);
        validate_secret_length(&jwt_secret, "PHONEBOOK_JWT_SECRET")?;

        let jwt_issuer = env
            .first_of(&["PHONEBOOK_JWT_ISSUER", "JWT_ISSUER"])
            .filter(|issuer| !issuer.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("PHONEBOOK_JWT_ISSUER".to_string()))?;

        Ok(Self {
            jwt_secret,
            jwt_issuer,
            argon2_m_cost: env.parsed_or("PHONEBOOK_ARGON2_M_COST", argon2::Params::DEFAULT_M_COST)?,
            argon2_t_cost: env.parsed_or("PHONEBOOK_ARGON2_T_COST", argon2::Params::DEFAULT_T_COST)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Environment lookup with the workspace's fallback conventions.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    /// Get the first variable that is set, in order of preference.
    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.optional(key))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Get the database URL.
    ///
    /// Prefers `PHONEBOOK_DATABASE_URL`, then the generic `DATABASE_URL`, then
    /// the individual `DATABASE_*` parts used by older deployments.
    fn database_url(&self) -> Result<SecretString, ConfigError> {
        if let Some(url) = self.first_of(&["PHONEBOOK_DATABASE_URL", "DATABASE_URL"]) {
            return Ok(SecretString::from(url));
        }

        let part = |key: &str| {
            self.optional(key)
                .ok_or_else(|| ConfigError::MissingEnvVar("PHONEBOOK_DATABASE_URL".to_string()))
        };
        let url = format!(
            "postgres://{}:{}@{}:{}/{}",
            part("DATABASE_USER")?,
            part("DATABASE_PASS")?,
            part("DATABASE_HOST")?,
            part("DATABASE_PORT")?,
            part("DATABASE")?,
        );
        Ok(SecretString::from(url))
    }
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
