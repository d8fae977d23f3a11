//! User role.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role name granted to dashboard administrators.
pub const ADMIN_ROLE: &str = "admin";

/// Free-form role string. Only `"admin"` carries meaning: it gates the
/// dashboard. The gate is presentation-only; real enforcement belongs to
/// the gateway's row policies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRole(pub String);

impl UserRole {
    /// Wrap a role name.
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    /// Check if this role opens the admin dashboard.
    pub fn is_admin(&self) -> bool {
        self.0.trim().eq_ignore_ascii_case(ADMIN_ROLE)
    }

    /// Return the role as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self("user".to_string())
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_admin_is_admin() {
        assert!(UserRole::new("admin").is_admin());
        assert!(UserRole::new(" Admin ").is_admin());
        assert!(!UserRole::new("editor").is_admin());
        assert!(!UserRole::default().is_admin());
    }
}
