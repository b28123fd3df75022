//! Static catalog handlers (no credential required)

use axum::Json;

use tally_core::catalog::{Category, ACCOUNTS, CATEGORIES};

/// GET /api/categories - The static category catalog
pub async fn list_categories() -> Json<&'static [Category]> {
    Json(CATEGORIES)
}

/// GET /api/accounts - The static account labels
pub async fn list_account_labels() -> Json<&'static [&'static str]> {
    Json(ACCOUNTS)
}
