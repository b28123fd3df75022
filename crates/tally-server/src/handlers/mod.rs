//! HTTP request handlers organized by resource
//!
//! Each submodule contains handlers for a specific API area.

use axum::extract::Request;

use crate::{AppError, MAX_JSON_SIZE};

pub mod audit;
pub mod auth;
pub mod budgets;
pub mod catalog;
pub mod clients;
pub mod dashboard;
pub mod invoices;
pub mod transactions;

// Re-export all handlers for use in the router
pub use audit::*;
pub use auth::*;
pub use budgets::*;
pub use catalog::*;
pub use clients::*;
pub use dashboard::*;
pub use invoices::*;
pub use transactions::*;

/// Read and deserialize a JSON request body
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    request: Request,
) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_JSON_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))
}
