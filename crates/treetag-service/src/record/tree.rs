//! Tree mutations and single-record reads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

use treetag_core::error::AppError;
use treetag_core::result::AppResult;
use treetag_core::traits::gateway::Gateway;
use treetag_core::types::filter::FilterField;
use treetag_core::types::query::SelectQuery;
use treetag_core::types::sorting::SortField;
use treetag_entity::normalize;
use treetag_entity::tables;
use treetag_entity::tree::{ClassificationRecord, FieldRecord, RecordKind, TreeRecord};

use super::confirm::{Confirm, delete_confirmed};

/// Creates, updates, deletes, and fetches trees in both contexts.
#[derive(Clone)]
pub struct TreeService {
    gateway: Arc<dyn Gateway>,
}

impl std::fmt::Debug for TreeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeService").finish_non_exhaustive()
    }
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Insert a classification. The server assigns id and `created_at`.
    pub async fn create_classification(
        &self,
        record: &ClassificationRecord,
    ) -> AppResult<ClassificationRecord> {
        let stored = self
            .gateway
            .insert(tables::TREES, record.to_row())
            .await
            .map_err(|e| e.during("create tree"))?;
        let created = normalize::classification(&stored);
        info!(id = %created.id, name = %created.profile.common_name, "Created tree classification");
        Ok(created)
    }

    /// Replace a classification row.
    pub async fn update_classification(
        &self,
        record: &ClassificationRecord,
    ) -> AppResult<ClassificationRecord> {
        let stored = self
            .gateway
            .update(tables::TREES, &record.id, record.to_row())
            .await
            .map_err(|e| e.during("update tree"))?;
        info!(id = %record.id, "Updated tree classification");
        Ok(normalize::classification(&stored))
    }

    /// Insert a field placement linked to its classification.
    pub async fn create_field_record(&self, record: &FieldRecord) -> AppResult<FieldRecord> {
        if record.classification_id.is_empty() {
            return Err(AppError::validation(
                "Choose a tree classification before placing a tree",
            ));
        }

        let stored = self
            .gateway
            .insert(tables::FIELD_DATA, record.to_row())
            .await
            .map_err(|e| e.during("create tree"))?;

        let mut created = record.clone();
        created.id = stored
            .get("id")
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        created.created_at = stored
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        info!(id = %created.id, tree_id = %created.classification_id, "Created field record");
        Ok(created)
    }

    /// Replace a field placement row.
    pub async fn update_field_record(&self, record: &FieldRecord) -> AppResult<FieldRecord> {
        self.gateway
            .update(tables::FIELD_DATA, &record.id, record.to_row())
            .await
            .map_err(|e| e.during("update tree"))?;
        info!(id = %record.id, "Updated field record");
        Ok(record.clone())
    }

    /// Save a record from a form: insert when `created_at` is unset,
    /// otherwise a full update.
    pub async fn save(&self, record: &TreeRecord) -> AppResult<TreeRecord> {
        match record {
            TreeRecord::Classification(r) if r.created_at.is_none() => {
                self.create_classification(r).await.map(TreeRecord::Classification)
            }
            TreeRecord::Classification(r) => {
                self.update_classification(r).await.map(TreeRecord::Classification)
            }
            TreeRecord::Field(r) if r.created_at.is_none() => {
                self.create_field_record(r).await.map(TreeRecord::Field)
            }
            TreeRecord::Field(r) => self.update_field_record(r).await.map(TreeRecord::Field),
        }
    }

    /// Delete a tree of either kind after confirmation.
    pub async fn delete_tree(
        &self,
        kind: RecordKind,
        id: &str,
        confirm: &dyn Confirm,
    ) -> AppResult<bool> {
        let table = match kind {
            RecordKind::Classification => tables::TREES,
            RecordKind::Field => tables::FIELD_DATA,
        };
        delete_confirmed(self.gateway.as_ref(), confirm, table, id, "tree").await
    }

    /// A field record with its classification, for the detail page.
    pub async fn fetch_field_record(&self, id: &str) -> AppResult<FieldRecord> {
        let query = SelectQuery::table(tables::FIELD_DATA)
            .columns(tables::FIELD_DATA_COLUMNS)
            .filter(FilterField::eq("id", id))
            .limit(1);
        let page = self.gateway.select(&query).await?;
        page.rows
            .first()
            .and_then(normalize::field_record)
            .ok_or_else(|| AppError::not_found(format!("Tree {id} not found")))
    }

    /// Every field record, newest first.
    pub async fn field_records(&self) -> AppResult<Vec<FieldRecord>> {
        let query = SelectQuery::table(tables::FIELD_DATA)
            .columns(tables::FIELD_DATA_COLUMNS)
            .order(SortField::desc("created_at"));
        let page = self.gateway.select(&query).await?;
        Ok(normalize::field_records(&page.rows))
    }

    /// The raw classification row whose common name is exactly `name`.
    pub async fn fetch_template(&self, name: &str) -> AppResult<Option<Value>> {
        let query = SelectQuery::table(tables::TREES)
            .filter(FilterField::eq("common_name", name))
            .limit(1);
        let page = self.gateway.select(&query).await?;
        Ok(page.rows.into_iter().next())
    }
}
