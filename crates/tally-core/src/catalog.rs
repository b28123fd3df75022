//! Static category and account catalogs
//!
//! Served unauthenticated; transaction `category_id` values key into this
//! list but the reference is not enforced.

use serde::Serialize;

/// A spending/income category
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const CATEGORIES: &[Category] = &[
    Category { id: "income", name: "Income", icon: "💰" },
    Category { id: "salary", name: "Salary", icon: "💼" },
    Category { id: "freelance", name: "Freelance", icon: "🎯" },
    Category { id: "investment", name: "Investment", icon: "📈" },
    Category { id: "other_income", name: "Other Income", icon: "💵" },
    Category { id: "expense", name: "General", icon: "📦" },
    Category { id: "food", name: "Food", icon: "🍔" },
    Category { id: "transport", name: "Transport", icon: "🚗" },
    Category { id: "utilities", name: "Utilities", icon: "💡" },
    Category { id: "entertainment", name: "Entertainment", icon: "🎬" },
    Category { id: "shopping", name: "Shopping", icon: "🛍️" },
    Category { id: "healthcare", name: "Healthcare", icon: "🏥" },
    Category { id: "education", name: "Education", icon: "📚" },
    Category { id: "rent", name: "Rent", icon: "🏠" },
    Category { id: "insurance", name: "Insurance", icon: "🛡️" },
    Category { id: "tax", name: "Tax", icon: "📄" },
    Category { id: "office", name: "Office", icon: "🏢" },
    Category { id: "marketing", name: "Marketing", icon: "📢" },
    Category { id: "travel", name: "Travel", icon: "✈️" },
    Category { id: "subscription", name: "Subscription", icon: "🔔" },
];

/// Account labels offered by the UI
pub const ACCOUNTS: &[&str] = &["Cash", "Bank", "Credit Card", "PayPal", "UPI", "Net Banking"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ids_are_unique() {
        let mut ids: Vec<&str> = CATEGORIES.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CATEGORIES.len());
    }
}
