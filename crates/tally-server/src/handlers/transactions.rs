//! Transaction handlers: CRUD, filtering, receipt upload, CSV export/import

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    response::Response,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use tally_core::export::{parse_transactions_csv, transactions_to_csv};
use tally_core::models::{NewTransaction, Transaction, TransactionType};
use tally_core::{Action, Resource, TransactionFilter};

use super::read_json;
use crate::authz::{authorize, check_owner, record_scope};
use crate::{AppError, AppState, Caller};

/// Recognized query parameters for listing transactions
#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
    pub account: Option<String>,
    pub category_id: Option<String>,
    pub tag: Option<String>,
    /// Explicit "true"/"false"; anything else is no filter
    pub reconciled: Option<String>,
    /// Inclusive lower date bound (YYYY-MM-DD)
    pub from: Option<String>,
    /// Inclusive upper date bound (YYYY-MM-DD)
    pub to: Option<String>,
    /// Free-text search across notes, vendor, client, and tags
    pub q: Option<String>,
}

fn parse_date(value: Option<&str>, param: &str) -> Result<Option<NaiveDate>, AppError> {
    value
        .map(|s| s.parse::<NaiveDate>())
        .transpose()
        .map_err(|_| AppError::bad_request(&format!("Invalid '{}' date format (use YYYY-MM-DD)", param)))
}

fn build_filter(params: &TransactionListQuery) -> Result<TransactionFilter, AppError> {
    let tx_type = params
        .tx_type
        .as_deref()
        .map(|s| s.parse::<TransactionType>())
        .transpose()
        .map_err(|_| AppError::bad_request("Invalid type (use income or expense)"))?;

    let reconciled = match params.reconciled.as_deref() {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    };

    Ok(TransactionFilter::new()
        .tx_type(tx_type)
        .account(params.account.clone())
        .category_id(params.category_id.clone())
        .tag(params.tag.clone())
        .reconciled(reconciled)
        .date_range(
            parse_date(params.from.as_deref(), "from")?,
            parse_date(params.to.as_deref(), "to")?,
        )
        .search(params.q.clone()))
}

/// GET /api/transactions - List scoped transactions with query filters
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<TransactionListQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    authorize(&state, &caller, Resource::Transactions, Action::View)?;

    let filter = build_filter(&params)?;
    let transactions = state.db.list_transactions(record_scope(&caller))?;

    Ok(Json(filter.apply(transactions)))
}

/// Caller-supplied transaction fields (JSON body or multipart form)
///
/// Everything is optional here; create validates the required fields and
/// update falls back to the stored record.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionInput {
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
    pub category_id: Option<String>,
    pub account: Option<String>,
    /// Array of strings, or a comma-separated string
    pub tags: Option<serde_json::Value>,
    pub vendor: Option<String>,
    pub client: Option<String>,
    pub project_id: Option<String>,
    pub invoice_id: Option<String>,
    pub receipt_url: Option<String>,
    /// Boolean, or the string "true"/"false"
    pub reconciled: Option<serde_json::Value>,
    pub notes: Option<String>,
    /// Structured payload, or a JSON-encoded string in multipart forms
    pub splits: Option<serde_json::Value>,
}

fn tags_from_value(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect(),
        serde_json::Value::String(s) => s
            .split(',')
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect(),
        _ => vec![],
    }
}

fn bool_from_value(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => s == "true",
        _ => false,
    }
}

fn splits_from_value(value: serde_json::Value) -> Result<serde_json::Value, AppError> {
    match value {
        serde_json::Value::String(s) => {
            serde_json::from_str(&s).map_err(|_| AppError::bad_request("Invalid splits JSON"))
        }
        other => Ok(other),
    }
}

/// Save an uploaded receipt under the uploads directory, returning its URL
fn save_receipt(state: &AppState, file_name: Option<&str>, bytes: &[u8]) -> Result<String, AppError> {
    let uploads_dir = &state.config.uploads_dir;
    if !uploads_dir.exists() {
        std::fs::create_dir_all(uploads_dir).map_err(|e| {
            AppError::internal(&format!("Failed to create uploads directory: {}", e))
        })?;
    }

    // Keep the original extension, nothing else from the client name
    let ext = file_name
        .and_then(|n| std::path::Path::new(n).extension())
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    let filename = format!(
        "receipt_{}.{}",
        chrono::Utc::now().format("%Y%m%d_%H%M%S_%f"),
        ext
    );

    let path = uploads_dir.join(&filename);
    std::fs::write(&path, bytes)
        .map_err(|e| AppError::internal(&format!("Failed to save receipt: {}", e)))?;

    Ok(format!("/uploads/{}", filename))
}

/// Read a transaction payload from either a JSON body or a multipart form
/// with an optional `receipt` file part
async fn read_transaction_input(
    state: &AppState,
    request: Request,
) -> Result<TransactionInput, AppError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if !is_multipart {
        return read_json(request).await;
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|_| AppError::bad_request("Invalid multipart body"))?;

    let mut input = TransactionInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("Invalid multipart body"))?
    {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };

        if name == "receipt" {
            let file_name = field.file_name().map(|n| n.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|_| AppError::bad_request("Invalid receipt upload"))?;
            if !bytes.is_empty() {
                input.receipt_url = Some(save_receipt(state, file_name.as_deref(), &bytes)?);
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|_| AppError::bad_request("Invalid multipart body"))?;

        match name.as_str() {
            "date" => input.date = text.parse().ok(),
            "amount" => input.amount = text.parse().ok(),
            "currency" => input.currency = Some(text),
            "type" => input.tx_type = Some(text),
            "category_id" => input.category_id = Some(text),
            "account" => input.account = Some(text),
            "tags" => input.tags = Some(serde_json::Value::String(text)),
            "vendor" => input.vendor = Some(text),
            "client" => input.client = Some(text),
            "project_id" => input.project_id = Some(text),
            "invoice_id" => input.invoice_id = Some(text),
            "receipt_url" => {
                // An uploaded file wins over a caller-supplied URL
                if input.receipt_url.is_none() {
                    input.receipt_url = Some(text);
                }
            }
            "reconciled" => input.reconciled = Some(serde_json::Value::String(text)),
            "notes" => input.notes = Some(text),
            "splits" => input.splits = Some(serde_json::Value::String(text)),
            _ => {}
        }
    }

    Ok(input)
}

/// POST /api/transactions - Create a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    request: Request,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    authorize(&state, &caller, Resource::Transactions, Action::Create)?;

    let input = read_transaction_input(&state, request).await?;

    let amount = input.amount.unwrap_or(0.0);
    let type_str = input.tx_type.unwrap_or_default();
    if amount == 0.0 || type_str.is_empty() {
        return Err(AppError::bad_request("amount and type are required"));
    }
    let tx_type: TransactionType = type_str
        .parse()
        .map_err(|_| AppError::bad_request("Invalid type (use income or expense)"))?;

    let category_default = match tx_type {
        TransactionType::Income => "income",
        TransactionType::Expense => "expense",
    };

    let tx = NewTransaction {
        user_id: caller.user_id,
        date: input.date.unwrap_or_else(|| chrono::Utc::now().date_naive()),
        amount,
        currency: input.currency.unwrap_or_else(|| "INR".to_string()),
        tx_type,
        category_id: input
            .category_id
            .unwrap_or_else(|| category_default.to_string()),
        account: input.account.unwrap_or_else(|| "Cash".to_string()),
        tags: input.tags.map(|v| tags_from_value(&v)).unwrap_or_default(),
        vendor: input.vendor.unwrap_or_default(),
        client: input.client.unwrap_or_default(),
        project_id: input.project_id.unwrap_or_default(),
        invoice_id: input.invoice_id.unwrap_or_default(),
        receipt_url: input.receipt_url.unwrap_or_default(),
        reconciled: input.reconciled.map(|v| bool_from_value(&v)).unwrap_or(false),
        notes: input.notes.unwrap_or_default(),
        splits: match input.splits {
            Some(value) => splits_from_value(value)?,
            None => serde_json::json!([]),
        },
    };

    let id = state.db.insert_transaction(&tx)?;
    let stored = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::internal("Transaction not found after creation"))?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// PUT /api/transactions/:id - Update a transaction (owner or admin)
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Transaction>, AppError> {
    authorize(&state, &caller, Resource::Transactions, Action::Update)?;

    let existing = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;
    check_owner(
        &state,
        &caller,
        Resource::Transactions,
        Action::Update,
        existing.user_id,
        false,
    )?;

    let input = read_transaction_input(&state, request).await?;

    let tx_type = match input.tx_type {
        Some(ref s) if !s.is_empty() => s
            .parse()
            .map_err(|_| AppError::bad_request("Invalid type (use income or expense)"))?,
        _ => existing.tx_type,
    };

    let updated = NewTransaction {
        user_id: existing.user_id,
        date: input.date.unwrap_or(existing.date),
        amount: input.amount.unwrap_or(existing.amount),
        currency: input.currency.unwrap_or(existing.currency),
        tx_type,
        category_id: input.category_id.unwrap_or(existing.category_id),
        account: input.account.unwrap_or(existing.account),
        tags: input
            .tags
            .map(|v| tags_from_value(&v))
            .unwrap_or(existing.tags),
        vendor: input.vendor.unwrap_or(existing.vendor),
        client: input.client.unwrap_or(existing.client),
        project_id: input.project_id.unwrap_or(existing.project_id),
        invoice_id: input.invoice_id.unwrap_or(existing.invoice_id),
        receipt_url: input.receipt_url.unwrap_or(existing.receipt_url),
        reconciled: input
            .reconciled
            .map(|v| bool_from_value(&v))
            .unwrap_or(existing.reconciled),
        notes: input.notes.unwrap_or(existing.notes),
        splits: match input.splits {
            Some(value) => splits_from_value(value)?,
            None => existing.splits,
        },
    };

    state.db.update_transaction(id, &updated)?;
    let stored = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::internal("Transaction not found after update"))?;

    Ok(Json(stored))
}

/// DELETE /api/transactions/:id - Delete a transaction (admin per matrix)
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    authorize(&state, &caller, Resource::Transactions, Action::Delete)?;

    let existing = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;
    check_owner(
        &state,
        &caller,
        Resource::Transactions,
        Action::Delete,
        existing.user_id,
        false,
    )?;

    state.db.delete_transaction(id)?;

    Ok(Json(existing))
}

/// GET /api/transactions/export.csv - Export scoped transactions as CSV
pub async fn export_transactions_csv(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Response, AppError> {
    authorize(&state, &caller, Resource::Transactions, Action::Export)?;

    let transactions = state.db.list_transactions(record_scope(&caller))?;
    let csv = transactions_to_csv(&transactions)?;

    info!(count = transactions.len(), "Exported transactions to CSV");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"transactions.csv\"",
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::internal(&e.to_string()))
}

/// Response for a CSV import
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}

/// POST /api/transactions/import.csv - Import transactions from a CSV upload
///
/// Every row is created for the calling user; rows without a usable amount
/// are persisted but not counted.
pub async fn import_transactions_csv(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    authorize(&state, &caller, Resource::Transactions, Action::Import)?;

    let mut data: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("Invalid multipart body"))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|_| AppError::bad_request("Invalid CSV upload"))?;
            data = Some(bytes.to_vec());
        }
    }

    let Some(data) = data else {
        return Err(AppError::bad_request("CSV file required"));
    };

    let today = chrono::Utc::now().date_naive();
    let rows = parse_transactions_csv(&data, caller.user_id, today)?;
    if rows.is_empty() {
        return Err(AppError::bad_request("No rows"));
    }

    let mut imported = 0;
    for row in &rows {
        state.db.insert_transaction(row)?;
        if row.amount != 0.0 {
            imported += 1;
        }
    }

    info!(imported, total = rows.len(), "Imported transactions from CSV");

    Ok(Json(ImportResponse { imported }))
}
