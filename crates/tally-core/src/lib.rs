//! Tally Core Library
//!
//! Shared functionality for the Tally finance tracker:
//! - Database access and migrations (pooled SQLite, optional encryption)
//! - Domain models and closed-set enums
//! - Role-based permission matrix
//! - Dashboard snapshot aggregation and invoice totals
//! - Transaction filter engine
//! - CSV export/import
//! - Password hashing

pub mod auth;
pub mod catalog;
pub mod db;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod rbac;
pub mod totals;

pub use db::{AuthzDecision, Database};
pub use error::{Error, Result};
pub use filter::TransactionFilter;
pub use rbac::{Action, PermissionMatrix, Resource};
pub use totals::{compute_invoice_totals, InvoiceTotals, LineItemInput};
