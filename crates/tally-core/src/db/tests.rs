//! Database tests

use chrono::{Duration, NaiveDate};
use serde_json::json;

use super::*;
use crate::models::*;

fn test_user(db: &Database, email: &str, role: Role) -> i64 {
    let hash = crate::auth::hash_password("pw").unwrap();
    db.create_user(email, &hash, role).unwrap()
}

fn new_tx(user_id: i64, date: NaiveDate, amount: f64, tx_type: TransactionType) -> NewTransaction {
    NewTransaction {
        user_id,
        date,
        amount,
        currency: "INR".to_string(),
        tx_type,
        category_id: match tx_type {
            TransactionType::Income => "income".to_string(),
            TransactionType::Expense => "food".to_string(),
        },
        account: "Cash".to_string(),
        tags: vec![],
        vendor: String::new(),
        client: String::new(),
        project_id: String::new(),
        invoice_id: String::new(),
        receipt_url: String::new(),
        reconciled: false,
        notes: String::new(),
        splits: json!([]),
    }
}

#[test]
fn schema_initializes() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.count_users().unwrap(), 0);
    assert_eq!(db.count_transactions().unwrap(), 0);
    assert_eq!(db.count_audit().unwrap(), 0);
}

#[test]
fn user_create_and_lookup() {
    let db = Database::in_memory().unwrap();
    let id = test_user(&db, "a@example.com", Role::Salary);
    assert!(id > 0);

    let user = db.get_user_by_email("a@example.com").unwrap().unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.role, Role::Salary);

    let by_id = db.get_user(id).unwrap().unwrap();
    assert_eq!(by_id.email, "a@example.com");

    assert!(db.get_user_by_email("missing@example.com").unwrap().is_none());
}

#[test]
fn duplicate_email_conflicts() {
    let db = Database::in_memory().unwrap();
    test_user(&db, "dup@example.com", Role::Salary);

    let hash = crate::auth::hash_password("pw").unwrap();
    let err = db.create_user("dup@example.com", &hash, Role::Viewer).unwrap_err();
    assert!(matches!(err, crate::error::Error::Conflict(_)));
}

#[test]
fn seed_users_is_idempotent() {
    let db = Database::in_memory().unwrap();
    db.seed_users().unwrap();
    assert_eq!(db.count_users().unwrap(), 5);
    db.seed_users().unwrap();
    assert_eq!(db.count_users().unwrap(), 5);

    let salary = db.get_user_by_email("salary@example.com").unwrap().unwrap();
    assert_eq!(salary.role, Role::Salary);
    assert!(crate::auth::verify_password("salary123", &salary.password_hash));
}

#[test]
fn transaction_crud_and_scoping() {
    let db = Database::in_memory().unwrap();
    let alice = test_user(&db, "alice@example.com", Role::Salary);
    let bob = test_user(&db, "bob@example.com", Role::Salary);

    let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    let mut tx = new_tx(alice, date, 120.0, TransactionType::Expense);
    tx.tags = vec!["lunch".to_string()];
    tx.splits = json!([{"label": "half", "amount": 60.0}]);
    let id = db.insert_transaction(&tx).unwrap();
    db.insert_transaction(&new_tx(bob, date, 50.0, TransactionType::Income))
        .unwrap();

    let stored = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(stored.amount, 120.0);
    assert_eq!(stored.tags, vec!["lunch".to_string()]);
    assert_eq!(stored.splits[0]["amount"], json!(60.0));

    // Owner scoping
    assert_eq!(db.list_transactions(Some(alice)).unwrap().len(), 1);
    assert_eq!(db.list_transactions(Some(bob)).unwrap().len(), 1);
    assert_eq!(db.list_transactions(None).unwrap().len(), 2);

    // Update overwrites fields
    let mut updated = new_tx(alice, date, 150.0, TransactionType::Expense);
    updated.notes = "revised".to_string();
    db.update_transaction(id, &updated).unwrap();
    let stored = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(stored.amount, 150.0);
    assert_eq!(stored.notes, "revised");

    db.delete_transaction(id).unwrap();
    assert!(db.get_transaction(id).unwrap().is_none());
}

#[test]
fn budget_crud() {
    let db = Database::in_memory().unwrap();
    let user = test_user(&db, "b@example.com", Role::SelfEmployed);

    let budget = NewBudget {
        user_id: user,
        category_id: "food".to_string(),
        target: 1000.0,
        start_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
        notes: String::new(),
    };
    let id = db.insert_budget(&budget).unwrap();

    let stored = db.get_budget(id).unwrap().unwrap();
    assert_eq!(stored.target, 1000.0);
    assert_eq!(stored.category_id, "food");

    let mut revised = budget.clone();
    revised.target = 2000.0;
    db.update_budget(id, &revised).unwrap();
    assert_eq!(db.get_budget(id).unwrap().unwrap().target, 2000.0);

    db.delete_budget(id).unwrap();
    assert!(db.get_budget(id).unwrap().is_none());
}

#[test]
fn client_crud_and_scoping() {
    let db = Database::in_memory().unwrap();
    let owner = test_user(&db, "c@example.com", Role::SelfEmployed);
    let other = test_user(&db, "d@example.com", Role::SelfEmployed);

    let client = NewClient {
        user_id: owner,
        name: "Acme".to_string(),
        email: "acme@example.com".to_string(),
        phone: String::new(),
        address: String::new(),
        gstin: String::new(),
    };
    let id = db.insert_client(&client).unwrap();

    assert_eq!(db.list_clients(Some(owner)).unwrap().len(), 1);
    assert_eq!(db.list_clients(Some(other)).unwrap().len(), 0);
    assert_eq!(db.list_clients(None).unwrap().len(), 1);

    let mut revised = client.clone();
    revised.name = "Acme Corp".to_string();
    db.update_client(id, &revised).unwrap();
    assert_eq!(db.get_client(id).unwrap().unwrap().name, "Acme Corp");

    db.delete_client(id).unwrap();
    assert!(db.get_client(id).unwrap().is_none());
}

#[test]
fn invoice_number_is_unique() {
    let db = Database::in_memory().unwrap();
    let user = test_user(&db, "inv@example.com", Role::ClientMgmt);
    let client_id = db
        .insert_client(&NewClient {
            user_id: user,
            name: "Acme".to_string(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            gstin: String::new(),
        })
        .unwrap();

    let invoice = NewInvoice {
        user_id: user,
        client_id,
        invoice_number: "INV-001".to_string(),
        status: InvoiceStatus::Draft,
        issue_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        items: vec![InvoiceItem {
            description: "work".to_string(),
            quantity: 2.0,
            rate: 100.0,
            amount: 200.0,
            tax_rate: 18.0,
        }],
        subtotal: 200.0,
        tax_amount: 36.0,
        total: 236.0,
        currency: "INR".to_string(),
        notes: String::new(),
    };
    db.insert_invoice(&invoice).unwrap();

    let err = db.insert_invoice(&invoice).unwrap_err();
    assert!(matches!(err, crate::error::Error::Conflict(_)));
}

#[test]
fn invoice_join_carries_client_fields() {
    let db = Database::in_memory().unwrap();
    let user = test_user(&db, "join@example.com", Role::ClientMgmt);
    let client_id = db
        .insert_client(&NewClient {
            user_id: user,
            name: "Globex".to_string(),
            email: "billing@globex.com".to_string(),
            phone: String::new(),
            address: String::new(),
            gstin: String::new(),
        })
        .unwrap();

    let id = db
        .insert_invoice(&NewInvoice {
            user_id: user,
            client_id,
            invoice_number: "INV-042".to_string(),
            status: InvoiceStatus::Sent,
            issue_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            items: vec![],
            subtotal: 0.0,
            tax_amount: 0.0,
            total: 0.0,
            currency: "INR".to_string(),
            notes: String::new(),
        })
        .unwrap();

    let stored = db.get_invoice(id).unwrap().unwrap();
    assert_eq!(stored.client_name.as_deref(), Some("Globex"));
    assert_eq!(stored.client_email.as_deref(), Some("billing@globex.com"));
    assert_eq!(stored.invoice.status, InvoiceStatus::Sent);
}

#[test]
fn audit_log_append_and_list() {
    let db = Database::in_memory().unwrap();

    db.log_decision(&AuthzDecision {
        user_id: Some(1),
        role: Some("salary"),
        ip: "127.0.0.1",
        path: "/api/transactions",
        resource: "transactions",
        action: "view",
        status: AuditStatus::Allowed,
        reason: "",
    })
    .unwrap();
    db.log_decision(&AuthzDecision {
        user_id: Some(2),
        role: Some("viewer"),
        ip: "127.0.0.1",
        path: "/api/transactions",
        resource: "transactions",
        action: "view",
        status: AuditStatus::Denied,
        reason: "role_restricted",
    })
    .unwrap();

    let records = db.list_audit(10).unwrap();
    assert_eq!(records.len(), 2);
    // Newest first
    assert_eq!(records[0].status, AuditStatus::Denied);
    assert_eq!(records[0].reason, "role_restricted");
    assert_eq!(records[1].status, AuditStatus::Allowed);
    assert_eq!(records[1].reason, "");
}

#[test]
fn snapshot_balance_and_scope() {
    let db = Database::in_memory().unwrap();
    let alice = test_user(&db, "s1@example.com", Role::Salary);
    let bob = test_user(&db, "s2@example.com", Role::Salary);
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    db.insert_transaction(&new_tx(alice, today, 1000.0, TransactionType::Income))
        .unwrap();
    db.insert_transaction(&new_tx(alice, today, 300.0, TransactionType::Expense))
        .unwrap();
    db.insert_transaction(&new_tx(bob, today, 50.0, TransactionType::Expense))
        .unwrap();

    let alice_snap = db.dashboard_snapshot(Some(alice), today).unwrap();
    assert_eq!(alice_snap.balance, 700.0);

    // Admin scope sees everything
    let all = db.dashboard_snapshot(None, today).unwrap();
    assert_eq!(all.balance, 650.0);
}

#[test]
fn cashflow_window_boundary_is_inclusive() {
    let db = Database::in_memory().unwrap();
    let user = test_user(&db, "w@example.com", Role::Salary);
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    // Exactly 30 days ago: included. 31 days ago: excluded.
    db.insert_transaction(&new_tx(
        user,
        today - Duration::days(30),
        100.0,
        TransactionType::Income,
    ))
    .unwrap();
    db.insert_transaction(&new_tx(
        user,
        today - Duration::days(31),
        40.0,
        TransactionType::Income,
    ))
    .unwrap();

    let snap = db.dashboard_snapshot(Some(user), today).unwrap();
    assert_eq!(snap.cashflow_30d, 100.0);
    assert_eq!(snap.cashflow_90d, 140.0);
    assert_eq!(snap.balance, 140.0);
}

#[test]
fn upcoming_bills_counts_strictly_future_expenses() {
    let db = Database::in_memory().unwrap();
    let user = test_user(&db, "u@example.com", Role::Salary);
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    db.insert_transaction(&new_tx(user, today, 10.0, TransactionType::Expense))
        .unwrap();
    db.insert_transaction(&new_tx(
        user,
        today + Duration::days(1),
        10.0,
        TransactionType::Expense,
    ))
    .unwrap();
    // Future income is not a bill
    db.insert_transaction(&new_tx(
        user,
        today + Duration::days(2),
        10.0,
        TransactionType::Income,
    ))
    .unwrap();

    let snap = db.dashboard_snapshot(Some(user), today).unwrap();
    assert_eq!(snap.upcoming_bills, 1);
}

#[test]
fn budget_progress_raw_exceeds_clamped_display() {
    let db = Database::in_memory().unwrap();
    let user = test_user(&db, "bp@example.com", Role::Salary);
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    db.insert_budget(&NewBudget {
        user_id: user,
        category_id: "food".to_string(),
        target: 1000.0,
        start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        notes: String::new(),
    })
    .unwrap();

    db.insert_transaction(&new_tx(user, today, 1500.0, TransactionType::Expense))
        .unwrap();
    // Outside the window, not counted
    db.insert_transaction(&new_tx(
        user,
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        400.0,
        TransactionType::Expense,
    ))
    .unwrap();

    let budgets = db.budget_progress(Some(user)).unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].used, 1500.0);
    assert_eq!(budgets[0].progress, 150);
    assert_eq!(budgets[0].progress_display, 100);
}

#[test]
fn budget_progress_zero_target_is_zero() {
    let db = Database::in_memory().unwrap();
    let user = test_user(&db, "z@example.com", Role::Salary);
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    db.insert_budget(&NewBudget {
        user_id: user,
        category_id: "food".to_string(),
        target: 0.0,
        start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        notes: String::new(),
    })
    .unwrap();
    db.insert_transaction(&new_tx(user, today, 500.0, TransactionType::Expense))
        .unwrap();

    let budgets = db.budget_progress(Some(user)).unwrap();
    assert_eq!(budgets[0].used, 500.0);
    assert_eq!(budgets[0].progress, 0);
    assert_eq!(budgets[0].progress_display, 0);
}

#[test]
fn budget_window_bounds_are_inclusive() {
    let db = Database::in_memory().unwrap();
    let user = test_user(&db, "win@example.com", Role::Salary);

    let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
    db.insert_budget(&NewBudget {
        user_id: user,
        category_id: "food".to_string(),
        target: 100.0,
        start_date: start,
        end_date: end,
        notes: String::new(),
    })
    .unwrap();

    db.insert_transaction(&new_tx(user, start, 10.0, TransactionType::Expense))
        .unwrap();
    db.insert_transaction(&new_tx(user, end, 10.0, TransactionType::Expense))
        .unwrap();
    db.insert_transaction(&new_tx(
        user,
        end + Duration::days(1),
        10.0,
        TransactionType::Expense,
    ))
    .unwrap();

    let budgets = db.budget_progress(Some(user)).unwrap();
    assert_eq!(budgets[0].used, 20.0);
}
