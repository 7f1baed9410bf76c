//! Registration and login handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use phonebook_core::Email;

use super::json::{ApiJson, Envelope, FieldErrors};
use crate::db::Store;
use crate::error::Result;
use crate::state::AppState;

/// `{email, password}` request body.
#[derive(Debug, Deserialize)]
pub struct CredentialsInput {
    email: Option<String>,
    password: Option<String>,
}

impl CredentialsInput {
    fn validate(self) -> Result<(Email, String)> {
        let mut errors = FieldErrors::default();
        let email = errors.required("email", self.email);
        let password = errors.required("password", self.password);

        match Email::parse(&email) {
            Ok(email) => {
                errors.finish()?;
                Ok((email, password))
            }
            Err(e) => {
                errors.reject("email", e.to_string());
                Err(errors.into())
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct TokenJson {
    access_token: String,
}

fn token_response(status: StatusCode, token: String) -> Response {
    (
        status,
        [(AUTHORIZATION, format!("Bearer {token}"))],
        Json(Envelope::data(TokenJson {
            access_token: token,
        })),
    )
        .into_response()
}

/// `POST /register`
pub async fn register<S: Store>(
    State(state): State<AppState<S>>,
    ApiJson(input): ApiJson<CredentialsInput>,
) -> Result<Response> {
    let (email, password) = input.validate()?;
    let token = state.users().register(&email, &password).await?;

    Ok(token_response(StatusCode::CREATED, token))
}

/// `POST /login`
pub async fn login<S: Store>(
    State(state): State<AppState<S>>,
    ApiJson(input): ApiJson<CredentialsInput>,
) -> Result<Response> {
    let (email, password) = input.validate()?;
    let token = state.users().login(&email, &password).await?;

    Ok(token_response(StatusCode::OK, token))
}
