//! Caller identity and permission checks.

use std::fmt;

use serde::{Deserialize, Serialize};
use tally_shared::{AppError, AppResult};
use tracing::warn;

/// Roles a caller can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Everything.
    Admin,
    /// Books and reverses every document, manages fiscal periods.
    Accountant,
    /// Treasury vouchers only.
    Cashier,
    /// Inventory adjustments only.
    Storekeeper,
    /// Read-only access.
    Viewer,
}

/// Operations guarded by a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read vouchers and cashbox balances.
    TreasuryRead,
    /// Create, edit and delete draft vouchers.
    TreasuryWrite,
    /// Post and cancel vouchers.
    TreasuryPost,
    /// Read adjustments.
    InventoryRead,
    /// Create, edit and delete draft adjustments.
    InventoryWrite,
    /// Post and cancel adjustments.
    InventoryPost,
    /// Read journal entries.
    LedgerRead,
    /// Create, edit and delete manual draft journal entries.
    LedgerWrite,
    /// Post and reverse manual journal entries.
    LedgerPost,
    /// Set up, activate and close fiscal years and periods.
    FiscalManage,
}

impl UserRole {
    /// Returns true if this role may perform `permission`.
    #[must_use]
    pub const fn grants(&self, permission: Permission) -> bool {
        use Permission as P;
        match self {
            Self::Admin | Self::Accountant => true,
            Self::Cashier => matches!(
                permission,
                P::TreasuryRead | P::TreasuryWrite | P::TreasuryPost | P::LedgerRead
            ),
            Self::Storekeeper => matches!(
                permission,
                P::InventoryRead | P::InventoryWrite | P::InventoryPost
            ),
            Self::Viewer => matches!(
                permission,
                P::TreasuryRead | P::InventoryRead | P::LedgerRead
            ),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Accountant => write!(f, "accountant"),
            Self::Cashier => write!(f, "cashier"),
            Self::Storekeeper => write!(f, "storekeeper"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

/// The authenticated caller of a service operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Login name, recorded on documents and journal entries.
    pub username: String,
    /// Role deciding what the caller may do.
    pub role: UserRole,
}

impl CurrentUser {
    /// Creates a caller.
    #[must_use]
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Fails with `Forbidden` unless the role grants `permission`.
    pub fn require(&self, permission: Permission) -> AppResult<()> {
        if self.role.grants(permission) {
            return Ok(());
        }
        warn!(
            user = %self.username,
            role = %self.role,
            ?permission,
            "Permission denied"
        );
        Err(AppError::Forbidden(format!(
            "{} ({}) lacks {permission:?}",
            self.username, self.role
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(UserRole::Admin, Permission::FiscalManage, true)]
    #[case(UserRole::Accountant, Permission::InventoryPost, true)]
    #[case(UserRole::Cashier, Permission::TreasuryPost, true)]
    #[case(UserRole::Cashier, Permission::InventoryWrite, false)]
    #[case(UserRole::Storekeeper, Permission::InventoryPost, true)]
    #[case(UserRole::Storekeeper, Permission::TreasuryRead, false)]
    #[case(UserRole::Viewer, Permission::LedgerRead, true)]
    #[case(UserRole::Viewer, Permission::TreasuryWrite, false)]
    #[case(UserRole::Accountant, Permission::LedgerPost, true)]
    #[case(UserRole::Cashier, Permission::LedgerWrite, false)]
    #[case(UserRole::Viewer, Permission::LedgerPost, false)]
    fn test_role_grants(#[case] role: UserRole, #[case] permission: Permission, #[case] granted: bool) {
        assert_eq!(role.grants(permission), granted);
    }

    #[test]
    fn test_require_forbidden() {
        let viewer = CurrentUser::new("vera", UserRole::Viewer);
        let err = viewer.require(Permission::TreasuryPost).unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert!(err.message().contains("vera"));
    }
}
