//! Domain models for Tally

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Caller role, fixed at registration and carried in the bearer credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to every resource, including other users' records
    Admin,
    /// Enterprise persona: manages clients and invoices across owners
    ClientMgmt,
    /// Self-employed persona
    SelfEmployed,
    /// Salaried-individual persona
    Salary,
    /// Read access to financial records, no mutation
    Accountant,
    /// Dashboard and budget visibility only
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::ClientMgmt => "client_mgmt",
            Self::SelfEmployed => "self_employed",
            Self::Salary => "salary",
            Self::Accountant => "accountant",
            Self::Viewer => "viewer",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "client_mgmt" => Ok(Self::ClientMgmt),
            "self_employed" => Ok(Self::SelfEmployed),
            "salary" => Ok(Self::Salary),
            "accountant" => Ok(Self::Accountant),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Invoice lifecycle status
///
/// The set is closed but transitions are not ordered: any status may be set
/// at any time by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown invoice status: {}", s)),
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of an authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Allowed,
    Denied,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Denied => "denied",
        }
    }
}

impl std::str::FromStr for AuditStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allowed" => Ok(Self::Allowed),
            "denied" => Ok(Self::Denied),
            _ => Err(format!("Unknown audit status: {}", s)),
        }
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Argon2 hash, never serialized to API responses
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user (registration response, CLI listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// A financial transaction, owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Owner reference
    pub user_id: i64,
    pub date: NaiveDate,
    /// Non-negative; direction comes from `type`
    pub amount: f64,
    pub currency: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// Key into the static category catalog (not enforced)
    pub category_id: String,
    pub account: String,
    pub tags: Vec<String>,
    pub vendor: String,
    pub client: String,
    pub project_id: String,
    /// Loose cross-reference to an invoice, not enforced
    pub invoice_id: String,
    pub receipt_url: String,
    pub reconciled: bool,
    pub notes: String,
    /// Uninterpreted structured payload
    pub splits: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A transaction to be persisted (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub currency: String,
    pub tx_type: TransactionType,
    pub category_id: String,
    pub account: String,
    pub tags: Vec<String>,
    pub vendor: String,
    pub client: String,
    pub project_id: String,
    pub invoice_id: String,
    pub receipt_url: String,
    pub reconciled: bool,
    pub notes: String,
    pub splits: serde_json::Value,
}

/// A category budget, owned by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category_id: String,
    /// Target amount; zero is allowed and yields progress 0
    pub target: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// New budget for creation
#[derive(Debug, Clone)]
pub struct NewBudget {
    pub user_id: i64,
    pub category_id: String,
    pub target: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: String,
}

/// A budget with its derived spend figures
///
/// `progress` is the raw rounded percentage and may exceed 100 to signal
/// overspend; `progress_display` is clamped to 100. `used` and `target` are
/// never clamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetProgress {
    #[serde(flatten)]
    pub budget: Budget,
    pub used: f64,
    pub progress: i64,
    pub progress_display: i64,
}

/// A client record (enterprise persona)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Tax identifier
    pub gstin: String,
    pub created_at: DateTime<Utc>,
}

/// New client for creation
#[derive(Debug, Clone)]
pub struct NewClient {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub gstin: String,
}

/// An invoice line item with its computed amount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    /// quantity * rate, computed server-side
    pub amount: f64,
    /// Percentage applied to this item's amount
    pub tax_rate: f64,
}

/// An invoice, owned by one user and referencing one client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub user_id: i64,
    pub client_id: i64,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub items: Vec<InvoiceItem>,
    /// Σ item amounts, recomputed whenever items change
    pub subtotal: f64,
    /// Σ per-item taxes, recomputed whenever items change
    pub tax_amount: f64,
    /// subtotal + tax_amount, never trusted from the caller
    pub total: f64,
    pub currency: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// New invoice for creation (totals already computed)
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub user_id: i64,
    pub client_id: i64,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub items: Vec<InvoiceItem>,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub currency: String,
    pub notes: String,
}

/// Invoice with the referenced client's display fields joined in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceWithClient {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
}

/// An authorization decision record, append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub user_id: Option<i64>,
    pub role: Option<String>,
    pub ip: String,
    pub path: String,
    pub resource: String,
    pub action: String,
    pub status: AuditStatus,
    pub reason: String,
    pub timestamp: String,
}

/// The computed dashboard aggregate for a scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Σ income − Σ expense over all scoped transactions, all time
    pub balance: f64,
    /// Net cashflow over transactions dated within the last 30 days (inclusive)
    pub cashflow_30d: f64,
    /// Net cashflow over transactions dated within the last 90 days (inclusive)
    pub cashflow_90d: f64,
    /// Scoped expense transactions dated strictly in the future
    pub upcoming_bills: i64,
    pub budgets: Vec<BudgetProgress>,
}
