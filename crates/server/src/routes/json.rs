//! JSON request and response shapes shared by the handlers.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;

/// Reason reported for a missing or blank required field.
pub const REQUIRED: &str = "cannot satisfy required tag";

/// JSON body extractor that rejects with [`AppError::MalformedJson`].
///
/// Unlike `axum::Json`, every rejection (bad syntax, wrong types, missing
/// `Content-Type`) becomes the API's own error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::MalformedJson(rejection.body_text()))?;

        Ok(Self(value))
    }
}

/// Success envelope: `{"message": "success", "data"?: ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// A success envelope carrying `data`.
    pub const fn data(data: T) -> Self {
        Self {
            message: "success",
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// A success envelope with no data.
    pub const fn empty() -> Self {
        Self {
            message: "success",
            data: None,
        }
    }
}

/// Collects per-field validation failures.
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Take a required string field, recording an error if it is missing or
    /// blank.
    pub fn required(&mut self, field: &str, value: Option<String>) -> String {
        match value {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                self.reject(field, REQUIRED);
                String::new()
            }
        }
    }

    /// Record a failure for `field`. The first failure per field wins.
    pub fn reject(&mut self, field: &str, reason: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_insert_with(|| reason.into());
    }

    /// `Ok(())` if nothing was rejected.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` with every recorded field.
    pub fn finish(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors.0)
    }
}
