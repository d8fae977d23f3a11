//! Profile row normalizers and display-name resolution.

use serde_json::Value;

use crate::user::{UserProfile, UserRole};

use super::value::{nested, non_empty, text, timestamp};

/// Keys consulted, in order, before falling back to the email.
const NAME_KEYS: [&str; 4] = ["full_name", "name", "display_name", "preferred_username"];

/// Name shown when nothing better is known.
const FALLBACK_NAME: &str = "Admin";

/// Resolve a display name: `full_name`, `name`, `display_name`,
/// `preferred_username`, then `email`, then `"Admin"`.
pub fn display_name(metadata: &Value, email: Option<&str>) -> String {
    NAME_KEYS
        .iter()
        .find_map(|key| non_empty(metadata, key))
        .or_else(|| {
            email
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// A profile row. Name keys are read from the row itself and then from an
/// embedded `user_metadata` object.
pub fn user(row: &Value) -> UserProfile {
    let email = text(row, "email");
    let metadata = nested(row, "user_metadata").unwrap_or(Value::Null);

    let own = NAME_KEYS.iter().find_map(|key| non_empty(row, key));
    let display = match own {
        Some(name) => name,
        None => display_name(&metadata, Some(&email)),
    };

    let role = match non_empty(row, "role") {
        Some(role) => UserRole::new(role),
        None => UserRole::default(),
    };

    UserProfile {
        id: text(row, "id"),
        display_name: display,
        email,
        role,
        created_at: timestamp(row, "created_at"),
    }
}

/// Every profile row, in order.
pub fn users(rows: &[Value]) -> Vec<UserProfile> {
    rows.iter().map(user).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_chain() {
        assert_eq!(display_name(&json!({ "full_name": "Ana Cruz", "name": "ana" }), None), "Ana Cruz");
        assert_eq!(display_name(&json!({ "full_name": "  ", "name": "ana" }), None), "ana");
        assert_eq!(display_name(&json!({ "preferred_username": "acruz" }), None), "acruz");
        assert_eq!(display_name(&json!({}), Some("ana@example.org")), "ana@example.org");
        assert_eq!(display_name(&Value::Null, None), "Admin");
    }

    #[test]
    fn test_profile_row_with_metadata() {
        let row = json!({
            "id": "u-1",
            "email": "ana@example.org",
            "role": "admin",
            "user_metadata": { "display_name": "Ana" }
        });
        let profile = user(&row);
        assert_eq!(profile.display_name, "Ana");
        assert!(profile.is_admin());
    }

    #[test]
    fn test_profile_row_without_role() {
        let profile = user(&json!({ "id": "u-2" }));
        assert_eq!(profile.display_name, "Admin");
        assert!(!profile.is_admin());
    }
}
