//! Client handlers
//!
//! Admin and client_mgmt operate enterprise-wide; other permitted roles are
//! limited to their own records.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use tally_core::models::{Client, NewClient};
use tally_core::{Action, Resource};

use super::read_json;
use crate::authz::{authorize, check_owner, client_scope};
use crate::{AppError, AppState, Caller};

/// Caller-supplied client fields
#[derive(Debug, Default, Deserialize)]
pub struct ClientInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gstin: Option<String>,
}

/// GET /api/clients - List scoped clients
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<Client>>, AppError> {
    authorize(&state, &caller, Resource::Clients, Action::View)?;

    Ok(Json(state.db.list_clients(client_scope(&caller))?))
}

/// GET /api/clients/:id - Client detail
pub async fn get_client(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> Result<Json<Client>, AppError> {
    authorize(&state, &caller, Resource::Clients, Action::Detail)?;

    let client = state
        .db
        .get_client(id)?
        .ok_or_else(|| AppError::not_found("Client not found"))?;
    check_owner(
        &state,
        &caller,
        Resource::Clients,
        Action::Detail,
        client.user_id,
        true,
    )?;

    Ok(Json(client))
}

/// POST /api/clients - Create a client
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    request: Request,
) -> Result<(StatusCode, Json<Client>), AppError> {
    authorize(&state, &caller, Resource::Clients, Action::Create)?;

    let input: ClientInput = read_json(request).await?;

    let Some(name) = input.name.filter(|n| !n.is_empty()) else {
        return Err(AppError::bad_request("name required"));
    };

    let client = NewClient {
        user_id: caller.user_id,
        name,
        email: input.email.unwrap_or_default(),
        phone: input.phone.unwrap_or_default(),
        address: input.address.unwrap_or_default(),
        gstin: input.gstin.unwrap_or_default(),
    };

    let id = state.db.insert_client(&client)?;
    let stored = state
        .db
        .get_client(id)?
        .ok_or_else(|| AppError::internal("Client not found after creation"))?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// PUT /api/clients/:id - Update a client (owner, client_mgmt, or admin)
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Client>, AppError> {
    authorize(&state, &caller, Resource::Clients, Action::Update)?;

    let existing = state
        .db
        .get_client(id)?
        .ok_or_else(|| AppError::not_found("Client not found"))?;
    check_owner(
        &state,
        &caller,
        Resource::Clients,
        Action::Update,
        existing.user_id,
        true,
    )?;

    let input: ClientInput = read_json(request).await?;

    let updated = NewClient {
        user_id: existing.user_id,
        name: input.name.unwrap_or(existing.name),
        email: input.email.unwrap_or(existing.email),
        phone: input.phone.unwrap_or(existing.phone),
        address: input.address.unwrap_or(existing.address),
        gstin: input.gstin.unwrap_or(existing.gstin),
    };

    state.db.update_client(id, &updated)?;
    let stored = state
        .db
        .get_client(id)?
        .ok_or_else(|| AppError::internal("Client not found after update"))?;

    Ok(Json(stored))
}

/// DELETE /api/clients/:id - Delete a client (admin per matrix)
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> Result<Json<Client>, AppError> {
    authorize(&state, &caller, Resource::Clients, Action::Delete)?;

    let existing = state
        .db
        .get_client(id)?
        .ok_or_else(|| AppError::not_found("Client not found"))?;
    check_owner(
        &state,
        &caller,
        Resource::Clients,
        Action::Delete,
        existing.user_id,
        true,
    )?;

    state.db.delete_client(id)?;

    Ok(Json(existing))
}
