//! Remote data gateway trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::result::AppResult;
use crate::types::query::{QueryPage, SelectQuery};

/// Table-scoped CRUD against the hosted backend.
///
/// Rows travel as loose JSON; strict domain shapes are produced by the
/// normalizers in `treetag-entity`. Writes are atomic per row and last
/// write wins.
#[async_trait]
pub trait Gateway: Send + Sync + 'static {
    /// Run a filtered, ordered, optionally ranged and counted select.
    async fn select(&self, query: &SelectQuery) -> AppResult<QueryPage>;

    /// Insert one row and return it as stored (server-assigned id and
    /// `created_at` included).
    async fn insert(&self, table: &str, row: Value) -> AppResult<Value>;

    /// Replace the row whose `id` equals `id` and return it as stored.
    async fn update(&self, table: &str, id: &str, row: Value) -> AppResult<Value>;

    /// Hard-delete the row whose `id` equals `id`.
    async fn delete(&self, table: &str, id: &str) -> AppResult<()>;
}
