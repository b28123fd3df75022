//! Transaction filter engine
//!
//! Applies recognized query parameters over a scoped transaction list,
//! conjunctively (AND semantics). Each filter is only applied when its
//! parameter is present.

use chrono::NaiveDate;

use crate::models::{Transaction, TransactionType};

/// Builder for the conjunctive transaction filter
#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    pub tx_type: Option<TransactionType>,
    pub account: Option<String>,
    pub category_id: Option<String>,
    pub tag: Option<String>,
    pub reconciled: Option<bool>,
    /// Inclusive lower date bound
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub to: Option<NaiveDate>,
    /// Case-insensitive substring over notes, vendor, client, and joined tags
    pub q: Option<String>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tx_type(mut self, value: Option<TransactionType>) -> Self {
        self.tx_type = value;
        self
    }

    pub fn account(mut self, value: Option<String>) -> Self {
        self.account = value;
        self
    }

    pub fn category_id(mut self, value: Option<String>) -> Self {
        self.category_id = value;
        self
    }

    pub fn tag(mut self, value: Option<String>) -> Self {
        self.tag = value;
        self
    }

    pub fn reconciled(mut self, value: Option<bool>) -> Self {
        self.reconciled = value;
        self
    }

    pub fn date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn search(mut self, value: Option<String>) -> Self {
        self.q = value;
        self
    }

    /// Does a single transaction pass every present filter?
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(tx_type) = self.tx_type {
            if tx.tx_type != tx_type {
                return false;
            }
        }
        if let Some(ref account) = self.account {
            if tx.account != *account {
                return false;
            }
        }
        if let Some(ref category_id) = self.category_id {
            if tx.category_id != *category_id {
                return false;
            }
        }
        if let Some(ref tag) = self.tag {
            if !tx.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(reconciled) = self.reconciled {
            if tx.reconciled != reconciled {
                return false;
            }
        }
        if let Some(from) = self.from {
            if tx.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if tx.date > to {
                return false;
            }
        }
        if let Some(ref q) = self.q {
            let needle = q.to_lowercase();
            let tags_joined = tx.tags.join(" ").to_lowercase();
            let hit = tx.notes.to_lowercase().contains(&needle)
                || tx.vendor.to_lowercase().contains(&needle)
                || tx.client.to_lowercase().contains(&needle)
                || tags_joined.contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }

    /// Filter a list, preserving order
    pub fn apply(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        transactions
            .into_iter()
            .filter(|tx| self.matches(tx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(tx_type: TransactionType, account: &str, category: &str) -> Transaction {
        Transaction {
            id: 1,
            user_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            amount: 100.0,
            currency: "INR".to_string(),
            tx_type,
            category_id: category.to_string(),
            account: account.to_string(),
            tags: vec!["groceries".to_string(), "weekly".to_string()],
            vendor: "Big Bazaar".to_string(),
            client: "".to_string(),
            project_id: "".to_string(),
            invoice_id: "".to_string(),
            receipt_url: "".to_string(),
            reconciled: false,
            notes: "weekend shop".to_string(),
            splits: serde_json::json!([]),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = TransactionFilter::new();
        assert!(filter.matches(&tx(TransactionType::Expense, "Cash", "food")));
    }

    #[test]
    fn filters_are_conjunctive() {
        let filter = TransactionFilter::new()
            .tx_type(Some(TransactionType::Expense))
            .account(Some("Cash".to_string()));
        assert!(filter.matches(&tx(TransactionType::Expense, "Cash", "food")));
        assert!(!filter.matches(&tx(TransactionType::Expense, "Bank", "food")));
        assert!(!filter.matches(&tx(TransactionType::Income, "Cash", "food")));
    }

    #[test]
    fn tag_filter_is_membership() {
        let filter = TransactionFilter::new().tag(Some("weekly".to_string()));
        assert!(filter.matches(&tx(TransactionType::Expense, "Cash", "food")));
        let filter = TransactionFilter::new().tag(Some("monthly".to_string()));
        assert!(!filter.matches(&tx(TransactionType::Expense, "Cash", "food")));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let sample = tx(TransactionType::Expense, "Cash", "food");
        let on_date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let filter = TransactionFilter::new().date_range(Some(on_date), Some(on_date));
        assert!(filter.matches(&sample));

        let after = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let filter = TransactionFilter::new().date_range(Some(after), None);
        assert!(!filter.matches(&sample));
    }

    #[test]
    fn search_is_case_insensitive_and_spans_fields() {
        let sample = tx(TransactionType::Expense, "Cash", "food");
        for needle in ["WEEKEND", "bazaar", "GROCER"] {
            let filter = TransactionFilter::new().search(Some(needle.to_string()));
            assert!(filter.matches(&sample), "expected match on {needle}");
        }
        let filter = TransactionFilter::new().search(Some("nowhere".to_string()));
        assert!(!filter.matches(&sample));
    }

    #[test]
    fn reconciled_filter_matches_exactly() {
        let sample = tx(TransactionType::Expense, "Cash", "food");
        assert!(TransactionFilter::new()
            .reconciled(Some(false))
            .matches(&sample));
        assert!(!TransactionFilter::new()
            .reconciled(Some(true))
            .matches(&sample));
    }
}
