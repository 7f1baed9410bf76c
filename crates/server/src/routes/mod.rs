//! HTTP route handlers for the phonebook API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (store ping)
//!
//! # Auth
//! POST   /register             - Create an account, returns a token
//! POST   /login                - Exchange credentials for a token
//!
//! # Addresses (requires bearer token)
//! POST   /addresses            - Create an address owned by the caller
//! GET    /addresses            - List every address
//! GET    /addresses/user       - List the caller's addresses
//! GET    /addresses/{id}       - Show one address
//! PUT    /addresses/{id}       - Update (owner only)
//! DELETE /addresses/{id}       - Delete (owner only)
//! ```
//!
//! Anything else answers 404 with the standard error body.

pub mod addresses;
pub mod auth;
pub mod json;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use phonebook_core::ClientError;

use crate::db::Store;
use crate::error::AppError;
use crate::state::AppState;

/// Create the address routes router.
pub fn address_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/",
            post(addresses::create::<S>).get(addresses::list_all::<S>),
        )
        .route("/user", get(addresses::list_mine::<S>))
        .route(
            "/{id}",
            get(addresses::show::<S>)
                .put(addresses::update::<S>)
                .delete(addresses::delete::<S>),
        )
}

/// Create all API routes, including the 404 fallbacks.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness::<S>))
        .route("/register", post(auth::register::<S>))
        .route("/login", post(auth::login::<S>))
        .nest("/addresses", address_routes())
        .fallback(fallback)
        .method_not_allowed_fallback(fallback)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store does not answer a ping.
pub async fn readiness<S: Store>(State(state): State<AppState<S>>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn fallback() -> AppError {
    ClientError::not_found("nothing to do here").into()
}
