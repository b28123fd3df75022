//! Registration, login, and identity handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use tally_core::models::{PublicUser, Role};

use super::read_json;
use crate::{token, AppError, AppState, Caller};

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// POST /api/auth/register - Create a user account
///
/// The admin role cannot be self-assigned here; admin accounts are
/// provisioned with the CLI (`tally user add --role admin`).
pub async fn register(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let input: RegisterRequest = read_json(request).await?;

    let (Some(email), Some(password), Some(role_str)) = (
        input.email.filter(|s| !s.is_empty()),
        input.password.filter(|s| !s.is_empty()),
        input.role.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::bad_request("email, password, role required"));
    };

    let role: Role = role_str
        .parse()
        .map_err(|_| AppError::bad_request("unknown role"))?;
    if role == Role::Admin {
        return Err(AppError::bad_request("admin role cannot be self-assigned"));
    }

    let hash = tally_core::auth::hash_password(&password)?;
    let id = state.db.create_user(&email, &hash, role)?;

    info!(user = %email, role = %role, "Registered user");

    Ok((StatusCode::CREATED, Json(PublicUser { id, email, role })))
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

/// POST /api/auth/login - Issue a bearer credential
///
/// Unknown email and wrong password yield the same unauthorized response to
/// avoid account enumeration.
pub async fn login(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<LoginResponse>, AppError> {
    let input: LoginRequest = read_json(request).await?;

    let (Some(email), Some(password)) = (input.email, input.password) else {
        return Err(AppError::unauthorized());
    };

    let Some(user) = state.db.get_user_by_email(&email)? else {
        return Err(AppError::unauthorized());
    };

    if !tally_core::auth::verify_password(&password, &user.password_hash) {
        return Err(AppError::unauthorized());
    }

    let token = token::issue(&state.config.jwt_secret, &user)
        .map_err(|e| AppError::internal(&e.to_string()))?;

    info!(user = %user.email, role = %user.role, "Logged in");

    Ok(Json(LoginResponse {
        token,
        role: user.role,
    }))
}

/// Response for the /api/auth/me endpoint
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub role: Role,
    pub email: String,
}

/// GET /api/auth/me - The verified caller identity
pub async fn me(Extension(caller): Extension<Caller>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: caller.user_id,
        role: caller.role,
        email: caller.email,
    })
}
