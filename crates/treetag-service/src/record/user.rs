//! Profile reads and updates.

use std::sync::Arc;

use tracing::info;

use treetag_core::error::AppError;
use treetag_core::result::AppResult;
use treetag_core::traits::gateway::Gateway;
use treetag_core::types::filter::FilterField;
use treetag_core::types::query::SelectQuery;
use treetag_entity::normalize;
use treetag_entity::tables;
use treetag_entity::user::{UserProfile, UserRole};

use super::confirm::{Confirm, delete_confirmed};

/// Reads and edits user profiles.
#[derive(Clone)]
pub struct UserService {
    gateway: Arc<dyn Gateway>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

impl UserService {
    /// Creates a new user service.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Profile by auth identity.
    pub async fn fetch(&self, id: &str) -> AppResult<UserProfile> {
        let query = SelectQuery::table(tables::PROFILES)
            .filter(FilterField::eq("id", id))
            .limit(1);
        let page = self.gateway.select(&query).await?;
        page.rows
            .first()
            .map(normalize::user)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Change a user's role.
    pub async fn set_role(&self, id: &str, role: &str) -> AppResult<UserProfile> {
        let mut profile = self.fetch(id).await?;
        profile.role = UserRole::new(role.trim());
        self.save(profile, "update user role").await
    }

    /// Change a user's display name.
    pub async fn rename(&self, id: &str, display_name: &str) -> AppResult<UserProfile> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::validation("Display name cannot be empty"));
        }
        let mut profile = self.fetch(id).await?;
        profile.display_name = display_name.to_string();
        self.save(profile, "update user").await
    }

    /// Delete a profile after confirmation.
    pub async fn delete(&self, id: &str, confirm: &dyn Confirm) -> AppResult<bool> {
        delete_confirmed(self.gateway.as_ref(), confirm, tables::PROFILES, id, "user").await
    }

    async fn save(&self, profile: UserProfile, operation: &str) -> AppResult<UserProfile> {
        let stored = self
            .gateway
            .update(tables::PROFILES, &profile.id, profile.to_row())
            .await
            .map_err(|e| e.during(operation))?;
        info!(id = %profile.id, role = %profile.role.as_str(), "Updated user profile");
        Ok(normalize::user(&stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use treetag_gateway::MemoryGateway;

    #[tokio::test]
    async fn test_promote_to_admin() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.seed(
            tables::PROFILES,
            vec![json!({ "id": "u-1", "email": "ana@example.org", "role": "user" })],
        );
        let users = UserService::new(gateway);

        let updated = users.set_role("u-1", "admin").await.expect("update");
        assert!(updated.is_admin());
        assert_eq!(updated.display_name, "ana@example.org");
    }
}
