//! Audit log handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use tally_core::models::AuditRecord;
use tally_core::{Action, Resource};

use crate::authz::authorize;
use crate::{AppError, AppState, Caller, MAX_AUDIT_LIMIT};

/// Query parameters for the audit log
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: i64,
}

fn default_audit_limit() -> i64 {
    100
}

/// GET /api/audit - List audit records, newest first (admin only)
///
/// Viewing the audit log is itself an audited decision, so the listing
/// includes the row for this very request.
pub async fn list_audit_log(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<AuditQuery>,
) -> Result<Json<Vec<AuditRecord>>, AppError> {
    authorize(&state, &caller, Resource::Audit, Action::View)?;

    let limit = params.limit.clamp(1, MAX_AUDIT_LIMIT);
    let records = state.db.list_audit(limit)?;

    Ok(Json(records))
}
