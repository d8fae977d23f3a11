//! User profile entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::role::UserRole;

/// A user profile row joined with its auth identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Auth identity.
    pub id: String,
    /// Resolved display name (never empty).
    pub display_name: String,
    /// Email address, empty when unknown.
    pub email: String,
    /// Role string.
    pub role: UserRole,
    /// When the profile was created.
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Check if this user may open the admin dashboard.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Row written on a full profile update.
    pub fn to_row(&self) -> Value {
        json!({
            "full_name": self.display_name,
            "email": self.email,
            "role": self.role.as_str(),
        })
    }
}
