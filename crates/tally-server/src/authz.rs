//! Authorization checks with mandatory audit logging
//!
//! Every matrix decision writes exactly one audit row before the request
//! proceeds. A failed audit write aborts the request: a decision that cannot
//! be recorded is not acted on.

use tally_core::models::{AuditStatus, Role};
use tally_core::{Action, AuthzDecision, Resource};

use crate::{AppError, AppState, Caller};

/// Denial reason: the caller's role is not in the allowed set
pub const REASON_ROLE_RESTRICTED: &str = "role_restricted";

/// Denial reason: the caller does not own the targeted record
pub const REASON_OWNERSHIP: &str = "ownership";

/// Matrix-level authorization check
pub fn authorize(
    state: &AppState,
    caller: &Caller,
    resource: Resource,
    action: Action,
) -> Result<(), AppError> {
    let allowed = state.permissions.allowed(resource, action, caller.role);

    let (status, reason) = if allowed {
        (AuditStatus::Allowed, "")
    } else {
        (AuditStatus::Denied, REASON_ROLE_RESTRICTED)
    };

    state.db.log_decision(&AuthzDecision {
        user_id: Some(caller.user_id),
        role: Some(caller.role.as_str()),
        ip: &caller.ip,
        path: &caller.path,
        resource: resource.as_str(),
        action: action.as_str(),
        status,
        reason,
    })?;

    if allowed {
        Ok(())
    } else {
        Err(AppError::forbidden(REASON_ROLE_RESTRICTED))
    }
}

/// Record-level ownership check, applied after the matrix allows the action
///
/// Admin bypasses ownership everywhere; client_mgmt bypasses it for the
/// resources it manages enterprise-wide (clients and invoices).
pub fn check_owner(
    state: &AppState,
    caller: &Caller,
    resource: Resource,
    action: Action,
    owner_id: i64,
    client_mgmt_wide: bool,
) -> Result<(), AppError> {
    let permitted = caller.role == Role::Admin
        || (client_mgmt_wide && caller.role == Role::ClientMgmt)
        || owner_id == caller.user_id;

    if permitted {
        return Ok(());
    }

    state.db.log_decision(&AuthzDecision {
        user_id: Some(caller.user_id),
        role: Some(caller.role.as_str()),
        ip: &caller.ip,
        path: &caller.path,
        resource: resource.as_str(),
        action: action.as_str(),
        status: AuditStatus::Denied,
        reason: REASON_OWNERSHIP,
    })?;

    Err(AppError::forbidden(REASON_OWNERSHIP))
}

/// Record scope for transactions and budgets: admin sees everything
pub fn record_scope(caller: &Caller) -> Option<i64> {
    if caller.role == Role::Admin {
        None
    } else {
        Some(caller.user_id)
    }
}

/// Record scope for clients and invoices: admin and client_mgmt see everything
pub fn client_scope(caller: &Caller) -> Option<i64> {
    if caller.role == Role::Admin || caller.role == Role::ClientMgmt {
        None
    } else {
        Some(caller.user_id)
    }
}
