//! Unified error handling with Sentry integration.
//!
//! Handlers return [`AppError`], which turns every failure into a JSON body
//! of the form `{"message": ..., "errors"?: {...}}`. Classified failures carry
//! their reason; anything unclassified is captured to Sentry and answered
//! with a generic 500.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use phonebook_core::ClientError;

use crate::services::ServiceError;

const INTERNAL_MESSAGE: &str = "internal server error. Please contact admin";

/// Application-level error type for the phonebook API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Service operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Classified failure raised at the boundary.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// No bearer token on a protected route.
    #[error("login to access this resource")]
    MissingToken,

    /// The bearer token did not resolve to a user.
    #[error("re-login to access this resource")]
    InvalidToken,

    /// The body was not parseable JSON.
    #[error("invalid JSON format")]
    MalformedJson(String),

    /// Required fields were missing or blank, keyed by field name.
    #[error("invalid body format")]
    Validation(BTreeMap<String, String>),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a BTreeMap<String, String>>,
}

impl AppError {
    fn client(&self) -> Option<&ClientError> {
        match self {
            Self::Client(err) => Some(err),
            Self::Service(err) => err.as_client(),
            _ => None,
        }
    }

    fn status(&self) -> StatusCode {
        if let Some(client) = self.client() {
            return StatusCode::from_u16(client.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        }

        match self {
            Self::MissingToken | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::MalformedJson(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if let Self::MalformedJson(detail) = &self {
            tracing::debug!(error = %self, %detail, "Request body rejected");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        // Don't expose internal error details to clients
        let message = if let Some(client) = self.client() {
            format!("failed to process request: {}", client.message())
        } else if status.is_server_error() {
            INTERNAL_MESSAGE.to_owned()
        } else {
            self.to_string()
        };

        let errors = match &self {
            Self::Validation(fields) => Some(fields),
            _ => None,
        };

        (status, Json(ErrorBody { message, errors })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Called once a bearer token resolves so errors are associated with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}
