//! Contact record handlers. Every route here requires a bearer token.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use phonebook_core::{AddressId, ClientError, UserId};

use super::json::{ApiJson, Envelope, FieldErrors};
use crate::db::Store;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Address;
use crate::state::AppState;

/// Address as exposed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressJson {
    pub id: AddressId,
    pub user_id: UserId,
    pub name: String,
    pub phone_number: String,
}

impl From<Address> for AddressJson {
    fn from(address: Address) -> Self {
        Self {
            id: address.id,
            user_id: address.user_id,
            name: address.name,
            phone_number: address.phone_number,
        }
    }
}

/// `{name, phone_number}` request body. Client-supplied `id` and `user_id`
/// are ignored.
#[derive(Debug, Deserialize)]
pub struct AddressInput {
    name: Option<String>,
    phone_number: Option<String>,
}

impl AddressInput {
    fn validate(self) -> Result<(String, String)> {
        let mut errors = FieldErrors::default();
        let name = errors.required("name", self.name);
        let phone_number = errors.required("phone_number", self.phone_number);
        errors.finish()?;

        Ok((name, phone_number))
    }
}

fn parse_id(raw: &str) -> Result<AddressId> {
    raw.parse()
        .map_err(|_| ClientError::invariant("invalid address id").into())
}

fn to_json(addresses: Vec<Address>) -> Vec<AddressJson> {
    addresses.into_iter().map(AddressJson::from).collect()
}

/// `POST /addresses`
pub async fn create<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user_id): RequireAuth,
    ApiJson(input): ApiJson<AddressInput>,
) -> Result<(StatusCode, Json<Envelope<AddressJson>>)> {
    let (name, phone_number) = input.validate()?;
    let address = state
        .addresses()
        .create(user_id, &name, &phone_number)
        .await?;

    Ok((StatusCode::CREATED, Json(Envelope::data(address.into()))))
}

/// `GET /addresses`
pub async fn list_all<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(_): RequireAuth,
) -> Result<Json<Envelope<Vec<AddressJson>>>> {
    let addresses = state.addresses().list_all().await?;
    Ok(Json(Envelope::data(to_json(addresses))))
}

/// `GET /addresses/user`
pub async fn list_mine<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<Envelope<Vec<AddressJson>>>> {
    let addresses = state.addresses().list_by_owner(user_id).await?;
    Ok(Json(Envelope::data(to_json(addresses))))
}

/// `GET /addresses/{id}`
pub async fn show<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(_): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Envelope<AddressJson>>> {
    let address = state.addresses().get(parse_id(&id)?).await?;
    Ok(Json(Envelope::data(address.into())))
}

/// `PUT /addresses/{id}`
pub async fn update<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user_id): RequireAuth,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<AddressInput>,
) -> Result<Json<Envelope<()>>> {
    let id = parse_id(&id)?;
    let (name, phone_number) = input.validate()?;
    state
        .addresses()
        .update(user_id, id, &name, &phone_number)
        .await?;

    Ok(Json(Envelope::empty()))
}

/// `DELETE /addresses/{id}`
pub async fn delete<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user_id): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>> {
    state.addresses().delete(user_id, parse_id(&id)?).await?;
    Ok(Json(Envelope::empty()))
}
