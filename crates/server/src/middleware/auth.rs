//! Bearer token authentication.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use tracing::Span;

use phonebook_core::UserId;

use crate::db::Store;
use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Extractor that requires a valid `Authorization: Bearer <token>` header.
///
/// Rejects with [`AppError::MissingToken`] when there is no usable bearer
/// token and [`AppError::InvalidToken`] when the token does not resolve.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_addresses(
///     State(state): State<AppState<S>>,
///     RequireAuth(user_id): RequireAuth,
/// ) -> Result<Json<Vec<AddressJson>>> {
///     // user_id comes from the token, never from the body
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub UserId);

impl<S: Store> FromRequestParts<AppState<S>> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::MissingToken)?;

        let user_id = state
            .tokens()
            .resolve(token)
            .map_err(|_| AppError::InvalidToken)?;

        Span::current().record("user_id", tracing::field::display(user_id));
        set_sentry_user(&user_id);

        Ok(Self(user_id))
    }
}

/// The token from an `Authorization: Bearer <token>` header, if present.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
