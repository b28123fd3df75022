//! Invoice handlers
//!
//! Invoices share the client-management permission rows, and totals are
//! always recomputed from the line items on the server: a `total` supplied
//! by the caller never reaches storage.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use tally_core::models::{InvoiceStatus, InvoiceWithClient, NewInvoice};
use tally_core::{compute_invoice_totals, Action, LineItemInput, Resource};

use super::read_json;
use crate::authz::{authorize, check_owner, client_scope};
use crate::{AppError, AppState, Caller};

/// Caller-supplied invoice fields
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceInput {
    pub client_id: Option<i64>,
    pub invoice_number: Option<String>,
    pub status: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub items: Option<Vec<LineItemInput>>,
    pub currency: Option<String>,
    pub notes: Option<String>,
}

fn parse_status(value: Option<&str>) -> Result<Option<InvoiceStatus>, AppError> {
    value
        .map(|s| s.parse::<InvoiceStatus>())
        .transpose()
        .map_err(|_| AppError::bad_request("Unknown invoice status"))
}

/// GET /api/invoices - List scoped invoices with client display fields
pub async fn list_invoices(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<InvoiceWithClient>>, AppError> {
    authorize(&state, &caller, Resource::Clients, Action::View)?;

    Ok(Json(state.db.list_invoices(client_scope(&caller))?))
}

/// GET /api/invoices/:id - Invoice detail
pub async fn get_invoice(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> Result<Json<InvoiceWithClient>, AppError> {
    authorize(&state, &caller, Resource::Clients, Action::Detail)?;

    let invoice = state
        .db
        .get_invoice(id)?
        .ok_or_else(|| AppError::not_found("Invoice not found"))?;
    check_owner(
        &state,
        &caller,
        Resource::Clients,
        Action::Detail,
        invoice.invoice.user_id,
        true,
    )?;

    Ok(Json(invoice))
}

/// POST /api/invoices - Create an invoice with computed totals
pub async fn create_invoice(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    request: Request,
) -> Result<(StatusCode, Json<InvoiceWithClient>), AppError> {
    authorize(&state, &caller, Resource::Clients, Action::Create)?;

    let input: InvoiceInput = read_json(request).await?;

    let (Some(client_id), Some(invoice_number), Some(issue_date), Some(due_date), Some(items)) = (
        input.client_id,
        input.invoice_number.filter(|n| !n.is_empty()),
        input.issue_date,
        input.due_date,
        input.items,
    ) else {
        return Err(AppError::bad_request("Missing required fields"));
    };

    let status = parse_status(input.status.as_deref())?.unwrap_or_default();
    let totals = compute_invoice_totals(&items);

    let invoice = NewInvoice {
        user_id: caller.user_id,
        client_id,
        invoice_number,
        status,
        issue_date,
        due_date,
        items: totals.items,
        subtotal: totals.subtotal,
        tax_amount: totals.tax_amount,
        total: totals.total,
        currency: input.currency.unwrap_or_else(|| "INR".to_string()),
        notes: input.notes.unwrap_or_default(),
    };

    let id = state.db.insert_invoice(&invoice)?;
    let stored = state
        .db
        .get_invoice(id)?
        .ok_or_else(|| AppError::internal("Invoice not found after creation"))?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// PUT /api/invoices/:id - Update an invoice
///
/// When items are present the totals are recomputed from them; otherwise the
/// stored items and totals stand.
pub async fn update_invoice(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<InvoiceWithClient>, AppError> {
    authorize(&state, &caller, Resource::Clients, Action::Update)?;

    let existing = state
        .db
        .get_invoice(id)?
        .ok_or_else(|| AppError::not_found("Invoice not found"))?
        .invoice;
    check_owner(
        &state,
        &caller,
        Resource::Clients,
        Action::Update,
        existing.user_id,
        true,
    )?;

    let input: InvoiceInput = read_json(request).await?;

    let (items, subtotal, tax_amount, total) = match input.items {
        Some(ref new_items) => {
            let totals = compute_invoice_totals(new_items);
            (totals.items, totals.subtotal, totals.tax_amount, totals.total)
        }
        None => (
            existing.items,
            existing.subtotal,
            existing.tax_amount,
            existing.total,
        ),
    };

    let updated = NewInvoice {
        user_id: existing.user_id,
        client_id: existing.client_id,
        invoice_number: existing.invoice_number,
        status: parse_status(input.status.as_deref())?.unwrap_or(existing.status),
        issue_date: input.issue_date.unwrap_or(existing.issue_date),
        due_date: input.due_date.unwrap_or(existing.due_date),
        items,
        subtotal,
        tax_amount,
        total,
        currency: existing.currency,
        notes: input.notes.unwrap_or(existing.notes),
    };

    state.db.update_invoice(id, &updated)?;
    let stored = state
        .db
        .get_invoice(id)?
        .ok_or_else(|| AppError::internal("Invoice not found after update"))?;

    Ok(Json(stored))
}

/// DELETE /api/invoices/:id - Delete an invoice (admin per matrix)
pub async fn delete_invoice(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> Result<Json<InvoiceWithClient>, AppError> {
    authorize(&state, &caller, Resource::Clients, Action::Delete)?;

    let existing = state
        .db
        .get_invoice(id)?
        .ok_or_else(|| AppError::not_found("Invoice not found"))?;
    check_owner(
        &state,
        &caller,
        Resource::Clients,
        Action::Delete,
        existing.invoice.user_id,
        true,
    )?;

    state.db.delete_invoice(id)?;

    Ok(Json(existing))
}
