//! Dashboard snapshot handler

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use tally_core::models::DashboardSnapshot;
use tally_core::{Action, Resource};

use crate::authz::{authorize, record_scope};
use crate::{AppError, AppState, Caller};

/// GET /api/dashboard - Balance, cashflow windows, and budget progress
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<DashboardSnapshot>, AppError> {
    authorize(&state, &caller, Resource::Dashboard, Action::View)?;

    let today = chrono::Utc::now().date_naive();
    let snapshot = state.db.dashboard_snapshot(record_scope(&caller), today)?;

    Ok(Json(snapshot))
}
