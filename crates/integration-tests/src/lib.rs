//! Integration test harness for the phonebook service.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no database needed)
//! cargo test -p phonebook-integration-tests
//!
//! # Live tests against a running server backed by PostgreSQL
//! PHONEBOOK_BASE_URL=http://localhost:8080 \
//!     cargo test -p phonebook-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] runs the real router and middleware stack against the
//! in-memory store, driving it with `tower::ServiceExt::oneshot`.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use phonebook_server::config::PhonebookConfig;
use phonebook_server::db::MemoryStore;
use phonebook_server::services::{PasswordHasher, TokenCodec};
use phonebook_server::state::AppState;

/// Signing secret used by [`TestApp`].
pub const TEST_JWT_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

/// Issuer used by [`TestApp`].
pub const TEST_JWT_ISSUER: &str = "phonebook-integration";

/// Base URL for live tests (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("PHONEBOOK_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Configuration for in-process tests. The database URL is never used.
#[must_use]
pub fn test_config() -> PhonebookConfig {
    let vars = HashMap::from([
        ("PHONEBOOK_DATABASE_URL", "postgres://unused@localhost/unused"),
        ("PHONEBOOK_JWT_SECRET", TEST_JWT_SECRET),
        ("PHONEBOOK_JWT_ISSUER", TEST_JWT_ISSUER),
    ]);

    PhonebookConfig::from_lookup(|key| vars.get(key).map(ToString::to_string))
        .expect("test configuration should be valid")
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// JSON body; a non-JSON body is a JSON string, an empty body is `null`.
    pub body: Value,
}

impl TestResponse {
    /// The `message` field of the body.
    #[must_use]
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

/// The application wired to an in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub tokens: TokenCodec,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build the app with cheap hashing parameters.
    #[must_use]
    pub fn new() -> Self {
        let config = test_config();
        let tokens = TokenCodec::from_config(&config.auth);
        let store = MemoryStore::new();
        let hasher = PasswordHasher::new(8, 1).expect("argon2 accepts minimal costs");
        let state = AppState::with_hasher(config, store.clone(), hasher);

        Self {
            router: phonebook_server::app(state),
            store,
            tokens,
        }
    }

    /// Send a request with an optional bearer token and JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> TestResponse {
        let body = body.map(Value::to_string);
        self.send_raw(method, uri, token, body).await
    }

    /// Send a request with a raw JSON-typed body.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        self.call(request).await
    }

    /// Send a prepared request.
    pub async fn call(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Register an account and return its access token.
    pub async fn register(&self, email: &str, password: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/register",
                None,
                Some(&serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        response.body["data"]["access_token"]
            .as_str()
            .expect("register returns a token")
            .to_owned()
    }

    /// Create an address as the token's user and return its JSON.
    pub async fn create_address(&self, token: &str, name: &str, phone_number: &str) -> Value {
        let response = self
            .send(
                Method::POST,
                "/addresses",
                Some(token),
                Some(&serde_json::json!({ "name": name, "phone_number": phone_number })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        response.body["data"].clone()
    }
}
