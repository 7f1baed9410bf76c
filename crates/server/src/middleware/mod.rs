//! HTTP middleware stack for the phonebook API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request span with method, uri, status and latency)
//! 3. Request ID (reuse or generate `x-request-id`)
//! 4. Timeout (per-request deadline; the handler future is dropped on expiry)
//!
//! Authentication is not a layer: protected handlers take the
//! [`RequireAuth`] extractor.

pub mod auth;
pub mod request_id;

pub use auth::RequireAuth;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
