//! Role-based authorization matrix
//!
//! The permission table is fixed at process start: `PermissionMatrix` is
//! constructed once, injected into the server state, and never mutated.
//! `allowed` is a pure decision function; writing the audit record for each
//! decision is the caller's job and is mandatory for every check.

use std::collections::HashMap;

use crate::models::Role;

/// The noun part of a permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Dashboard,
    Transactions,
    Budgets,
    /// Also gates invoices, which share the client-management permission rows
    Clients,
    Audit,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Transactions => "transactions",
            Self::Budgets => "budgets",
            Self::Clients => "clients",
            Self::Audit => "audit",
        }
    }
}

/// The verb part of a permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Detail,
    Create,
    Update,
    Delete,
    Export,
    Import,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Detail => "detail",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Export => "export",
            Self::Import => "import",
        }
    }
}

const ALL_ROLES: &[Role] = &[
    Role::Admin,
    Role::ClientMgmt,
    Role::SelfEmployed,
    Role::Salary,
    Role::Accountant,
    Role::Viewer,
];

const FINANCIAL_ROLES: &[Role] = &[
    Role::Admin,
    Role::ClientMgmt,
    Role::SelfEmployed,
    Role::Salary,
    Role::Accountant,
];

const WRITER_ROLES: &[Role] = &[
    Role::Admin,
    Role::ClientMgmt,
    Role::SelfEmployed,
    Role::Salary,
];

const CLIENT_READ_ROLES: &[Role] = &[
    Role::Admin,
    Role::ClientMgmt,
    Role::SelfEmployed,
    Role::Accountant,
];

const CLIENT_WRITE_ROLES: &[Role] = &[Role::Admin, Role::ClientMgmt, Role::SelfEmployed];

const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Immutable (resource, action) → allowed-roles table
#[derive(Debug, Clone)]
pub struct PermissionMatrix {
    entries: HashMap<(Resource, Action), &'static [Role]>,
}

impl PermissionMatrix {
    /// Build the standard permission table
    pub fn standard() -> Self {
        let mut entries: HashMap<(Resource, Action), &'static [Role]> = HashMap::new();

        entries.insert((Resource::Dashboard, Action::View), ALL_ROLES);

        entries.insert((Resource::Transactions, Action::View), FINANCIAL_ROLES);
        entries.insert((Resource::Transactions, Action::Export), FINANCIAL_ROLES);
        entries.insert((Resource::Transactions, Action::Create), WRITER_ROLES);
        entries.insert((Resource::Transactions, Action::Update), WRITER_ROLES);
        entries.insert((Resource::Transactions, Action::Import), WRITER_ROLES);
        entries.insert((Resource::Transactions, Action::Delete), ADMIN_ONLY);

        entries.insert((Resource::Budgets, Action::View), ALL_ROLES);
        entries.insert((Resource::Budgets, Action::Create), WRITER_ROLES);
        entries.insert((Resource::Budgets, Action::Update), WRITER_ROLES);
        entries.insert((Resource::Budgets, Action::Delete), ADMIN_ONLY);

        entries.insert((Resource::Clients, Action::View), CLIENT_READ_ROLES);
        entries.insert((Resource::Clients, Action::Detail), CLIENT_READ_ROLES);
        entries.insert((Resource::Clients, Action::Create), CLIENT_WRITE_ROLES);
        entries.insert((Resource::Clients, Action::Update), CLIENT_WRITE_ROLES);
        entries.insert((Resource::Clients, Action::Delete), ADMIN_ONLY);

        entries.insert((Resource::Audit, Action::View), ADMIN_ONLY);

        Self { entries }
    }

    /// Pure decision: is `role` allowed to perform `action` on `resource`?
    ///
    /// Pairs absent from the table deny every role.
    pub fn allowed(&self, resource: Resource, action: Action, role: Role) -> bool {
        self.entries
            .get(&(resource, action))
            .map(|roles| roles.contains(&role))
            .unwrap_or(false)
    }
}

impl Default for PermissionMatrix {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_is_visible_to_every_role() {
        let matrix = PermissionMatrix::standard();
        for role in ALL_ROLES {
            assert!(matrix.allowed(Resource::Dashboard, Action::View, *role));
        }
    }

    #[test]
    fn viewer_cannot_see_transactions() {
        let matrix = PermissionMatrix::standard();
        assert!(!matrix.allowed(Resource::Transactions, Action::View, Role::Viewer));
        assert!(matrix.allowed(Resource::Transactions, Action::View, Role::Accountant));
    }

    #[test]
    fn accountant_reads_but_never_writes() {
        let matrix = PermissionMatrix::standard();
        assert!(matrix.allowed(Resource::Transactions, Action::View, Role::Accountant));
        assert!(matrix.allowed(Resource::Transactions, Action::Export, Role::Accountant));
        assert!(matrix.allowed(Resource::Clients, Action::View, Role::Accountant));
        assert!(!matrix.allowed(Resource::Transactions, Action::Create, Role::Accountant));
        assert!(!matrix.allowed(Resource::Transactions, Action::Update, Role::Accountant));
        assert!(!matrix.allowed(Resource::Budgets, Action::Create, Role::Accountant));
        assert!(!matrix.allowed(Resource::Clients, Action::Create, Role::Accountant));
    }

    #[test]
    fn deletes_are_admin_only() {
        let matrix = PermissionMatrix::standard();
        for role in ALL_ROLES {
            let expected = *role == Role::Admin;
            assert_eq!(
                matrix.allowed(Resource::Transactions, Action::Delete, *role),
                expected
            );
            assert_eq!(
                matrix.allowed(Resource::Budgets, Action::Delete, *role),
                expected
            );
            assert_eq!(
                matrix.allowed(Resource::Clients, Action::Delete, *role),
                expected
            );
        }
    }

    #[test]
    fn audit_log_is_admin_only() {
        let matrix = PermissionMatrix::standard();
        assert!(matrix.allowed(Resource::Audit, Action::View, Role::Admin));
        for role in &[
            Role::ClientMgmt,
            Role::SelfEmployed,
            Role::Salary,
            Role::Accountant,
            Role::Viewer,
        ] {
            assert!(!matrix.allowed(Resource::Audit, Action::View, *role));
        }
    }

    #[test]
    fn salary_cannot_touch_clients() {
        let matrix = PermissionMatrix::standard();
        assert!(!matrix.allowed(Resource::Clients, Action::View, Role::Salary));
        assert!(!matrix.allowed(Resource::Clients, Action::Create, Role::Salary));
    }

    #[test]
    fn unknown_pairs_deny() {
        let matrix = PermissionMatrix::standard();
        // No import action is defined for budgets
        assert!(!matrix.allowed(Resource::Budgets, Action::Import, Role::Admin));
    }
}
