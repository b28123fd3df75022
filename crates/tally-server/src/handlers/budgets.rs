//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use tally_core::models::{Budget, NewBudget};
use tally_core::{Action, Resource};

use super::read_json;
use crate::authz::{authorize, check_owner, record_scope};
use crate::{AppError, AppState, Caller};

/// Caller-supplied budget fields
#[derive(Debug, Default, Deserialize)]
pub struct BudgetInput {
    pub category_id: Option<String>,
    pub target: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// GET /api/budgets - List scoped budgets
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<Budget>>, AppError> {
    authorize(&state, &caller, Resource::Budgets, Action::View)?;

    Ok(Json(state.db.list_budgets(record_scope(&caller))?))
}

/// POST /api/budgets - Create a budget
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    request: Request,
) -> Result<(StatusCode, Json<Budget>), AppError> {
    authorize(&state, &caller, Resource::Budgets, Action::Create)?;

    let input: BudgetInput = read_json(request).await?;

    let (Some(category_id), Some(start_date), Some(end_date)) =
        (input.category_id, input.start_date, input.end_date)
    else {
        return Err(AppError::bad_request(
            "category_id, start_date, end_date required",
        ));
    };

    let budget = NewBudget {
        user_id: caller.user_id,
        category_id,
        target: input.target.unwrap_or(0.0),
        start_date,
        end_date,
        notes: input.notes.unwrap_or_default(),
    };

    let id = state.db.insert_budget(&budget)?;
    let stored = state
        .db
        .get_budget(id)?
        .ok_or_else(|| AppError::internal("Budget not found after creation"))?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// PUT /api/budgets/:id - Update a budget (owner or admin)
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    authorize(&state, &caller, Resource::Budgets, Action::Update)?;

    let existing = state
        .db
        .get_budget(id)?
        .ok_or_else(|| AppError::not_found("Budget not found"))?;
    check_owner(
        &state,
        &caller,
        Resource::Budgets,
        Action::Update,
        existing.user_id,
        false,
    )?;

    let input: BudgetInput = read_json(request).await?;

    let updated = NewBudget {
        user_id: existing.user_id,
        category_id: input.category_id.unwrap_or(existing.category_id),
        target: input.target.unwrap_or(existing.target),
        start_date: input.start_date.unwrap_or(existing.start_date),
        end_date: input.end_date.unwrap_or(existing.end_date),
        notes: input.notes.unwrap_or(existing.notes),
    };

    state.db.update_budget(id, &updated)?;
    let stored = state
        .db
        .get_budget(id)?
        .ok_or_else(|| AppError::internal("Budget not found after update"))?;

    Ok(Json(stored))
}

/// DELETE /api/budgets/:id - Delete a budget (admin per matrix)
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> Result<Json<Budget>, AppError> {
    authorize(&state, &caller, Resource::Budgets, Action::Delete)?;

    let existing = state
        .db
        .get_budget(id)?
        .ok_or_else(|| AppError::not_found("Budget not found"))?;
    check_owner(
        &state,
        &caller,
        Resource::Budgets,
        Action::Delete,
        existing.user_id,
        false,
    )?;

    state.db.delete_budget(id)?;

    Ok(Json(existing))
}
