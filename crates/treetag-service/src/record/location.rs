//! Location mutations.

use std::sync::Arc;

use tracing::info;

use treetag_core::error::AppError;
use treetag_core::result::AppResult;
use treetag_core::traits::gateway::Gateway;
use treetag_core::types::filter::FilterField;
use treetag_core::types::query::SelectQuery;
use treetag_core::types::sorting::SortField;
use treetag_entity::location::Location;
use treetag_entity::normalize;
use treetag_entity::tables;

use super::confirm::{Confirm, delete_confirmed};

/// Manages the named locations trees are placed at.
#[derive(Clone)]
pub struct LocationService {
    gateway: Arc<dyn Gateway>,
}

impl std::fmt::Debug for LocationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationService").finish_non_exhaustive()
    }
}

impl LocationService {
    /// Creates a new location service.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Insert a location.
    pub async fn create(&self, name: &str) -> AppResult<Location> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Location name cannot be empty"));
        }
        let draft = Location {
            name: name.to_string(),
            ..Default::default()
        };
        let stored = self
            .gateway
            .insert(tables::LOCATIONS, draft.to_row())
            .await
            .map_err(|e| e.during("create location"))?;
        let created = normalize::location(&stored);
        info!(id = created.id, name = %created.name, "Created location");
        Ok(created)
    }

    /// Rename a location.
    pub async fn rename(&self, id: i64, name: &str) -> AppResult<Location> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Location name cannot be empty"));
        }
        let row = Location {
            id,
            name: name.to_string(),
            created_at: None,
        }
        .to_row();
        let stored = self
            .gateway
            .update(tables::LOCATIONS, &id.to_string(), row)
            .await
            .map_err(|e| e.during("update location"))?;
        info!(id, name, "Renamed location");
        Ok(normalize::location(&stored))
    }

    /// Delete a location after confirmation.
    pub async fn delete(&self, id: i64, confirm: &dyn Confirm) -> AppResult<bool> {
        delete_confirmed(
            self.gateway.as_ref(),
            confirm,
            tables::LOCATIONS,
            &id.to_string(),
            "location",
        )
        .await
    }

    /// The location named exactly `name`, if any.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Location>> {
        let query = SelectQuery::table(tables::LOCATIONS)
            .filter(FilterField::eq("name", name.trim()))
            .order(SortField::asc("id"))
            .limit(1);
        let page = self.gateway.select(&query).await?;
        Ok(page.rows.first().map(normalize::location))
    }

    /// The location named `name`, created when missing.
    pub async fn find_or_create(&self, name: &str) -> AppResult<Location> {
        match self.find_by_name(name).await? {
            Some(location) => Ok(location),
            None => self.create(name).await,
        }
    }
}
