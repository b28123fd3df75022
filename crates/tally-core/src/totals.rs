//! Invoice total computation
//!
//! Totals are always derived from the line items on the server: per-item
//! amount = quantity × rate, per-item tax = amount × tax_rate / 100,
//! subtotal/tax_amount/total summed with no mid-computation rounding. The
//! same function runs on create and on update-when-items-change; totals
//! supplied by the caller are ignored.

use serde::Deserialize;

use crate::models::InvoiceItem;

/// A caller-supplied line item, before amounts are computed
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    #[serde(default)]
    pub tax_rate: f64,
}

/// Computed invoice figures
#[derive(Debug, Clone)]
pub struct InvoiceTotals {
    pub items: Vec<InvoiceItem>,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
}

/// Compute per-item amounts and the invoice totals
pub fn compute_invoice_totals(inputs: &[LineItemInput]) -> InvoiceTotals {
    let mut subtotal = 0.0;
    let mut tax_amount = 0.0;

    let items = inputs
        .iter()
        .map(|item| {
            let amount = item.quantity * item.rate;
            let tax = amount * (item.tax_rate / 100.0);
            subtotal += amount;
            tax_amount += tax;
            InvoiceItem {
                description: item.description.clone(),
                quantity: item.quantity,
                rate: item.rate,
                amount,
                tax_rate: item.tax_rate,
            }
        })
        .collect();

    InvoiceTotals {
        items,
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64, rate: f64, tax_rate: f64) -> LineItemInput {
        LineItemInput {
            description: "work".to_string(),
            quantity,
            rate,
            tax_rate,
        }
    }

    #[test]
    fn empty_items_total_zero() {
        let totals = compute_invoice_totals(&[]);
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.total, 0.0);
        assert!(totals.items.is_empty());
    }

    #[test]
    fn single_item_with_tax() {
        let totals = compute_invoice_totals(&[item(10.0, 50.0, 18.0)]);
        assert_eq!(totals.items[0].amount, 500.0);
        assert_eq!(totals.subtotal, 500.0);
        assert!((totals.tax_amount - 90.0).abs() < 1e-9);
        assert!((totals.total - 590.0).abs() < 1e-9);
    }

    #[test]
    fn totals_hold_the_invariant_across_mixed_rates() {
        let inputs = vec![item(2.0, 1200.0, 18.0), item(5.0, 80.0, 0.0), item(1.5, 999.99, 12.5)];
        let totals = compute_invoice_totals(&inputs);

        let expected_subtotal: f64 = inputs.iter().map(|i| i.quantity * i.rate).sum();
        let expected_tax: f64 = inputs
            .iter()
            .map(|i| i.quantity * i.rate * i.tax_rate / 100.0)
            .sum();

        assert!((totals.subtotal - expected_subtotal).abs() < 1e-9);
        assert!((totals.tax_amount - expected_tax).abs() < 1e-9);
        assert!((totals.total - (expected_subtotal + expected_tax)).abs() < 1e-9);
    }

    #[test]
    fn zero_tax_rate_defaults() {
        let json = serde_json::json!([{"description": "a", "quantity": 1.0, "rate": 10.0}]);
        let inputs: Vec<LineItemInput> = serde_json::from_value(json).unwrap();
        let totals = compute_invoice_totals(&inputs);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.total, 10.0);
    }
}
