//! Table storage, request log, and fault injection.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use treetag_core::error::AppError;
use treetag_core::result::AppResult;
use treetag_core::traits::gateway::Gateway;
use treetag_core::types::query::{QueryPage, SelectQuery};
use treetag_core::types::sorting::SortDirection;
use treetag_entity::tables;

use super::eval::{compare_rows, matches, parse_embeds, scalar_text};

/// A call received by [`MemoryGateway`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayRequest {
    /// A select.
    Select(SelectQuery),
    /// An insert.
    Insert {
        /// Target table.
        table: String,
        /// Row as sent.
        row: Value,
    },
    /// A full-row update.
    Update {
        /// Target table.
        table: String,
        /// Row id.
        id: String,
        /// Row as sent.
        row: Value,
    },
    /// A hard delete.
    Delete {
        /// Target table.
        table: String,
        /// Row id.
        id: String,
    },
}

impl GatewayRequest {
    /// Table the request addressed.
    pub fn table(&self) -> &str {
        match self {
            Self::Select(q) => &q.table,
            Self::Insert { table, .. } | Self::Update { table, .. } | Self::Delete { table, .. } => {
                table
            }
        }
    }

    /// Whether the request writes.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Select(_))
    }
}

/// To-one relation from `table` to `target` through the `via` column.
#[derive(Debug, Clone)]
struct Relation {
    target: String,
    via: String,
}

/// Gateway over in-process tables, for tests and offline runs.
///
/// Every call is logged. A table can be made to fail, and selects can be
/// delayed to reproduce out-of-order responses.
#[derive(Debug)]
pub struct MemoryGateway {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    relations: HashMap<String, Vec<Relation>>,
    uuid_tables: HashSet<String>,
    requests: Mutex<Vec<GatewayRequest>>,
    failures: Mutex<HashMap<String, String>>,
    delays: Mutex<VecDeque<Duration>>,
    next_id: AtomicI64,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    /// Empty gateway with the TreeTag schema's relations registered.
    pub fn new() -> Self {
        let mut relations: HashMap<String, Vec<Relation>> = HashMap::new();
        relations.insert(
            tables::FIELD_DATA.to_string(),
            vec![
                Relation {
                    target: tables::TREES.to_string(),
                    via: "tree_id".to_string(),
                },
                Relation {
                    target: tables::LOCATIONS.to_string(),
                    via: "location_id".to_string(),
                },
            ],
        );

        Self {
            tables: RwLock::new(HashMap::new()),
            relations,
            uuid_tables: [tables::TREES, tables::FIELD_DATA, tables::PROFILES]
                .into_iter()
                .map(str::to_string)
                .collect(),
            requests: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(VecDeque::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Append rows to `table` without logging a request.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let entry = tables.entry(table.to_string()).or_default();
        for row in rows {
            if let Some(id) = row.get("id").and_then(Value::as_i64) {
                self.next_id.fetch_max(id + 1, AtomicOrdering::SeqCst);
            }
            entry.push(row);
        }
    }

    /// Current contents of `table`.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Selects received against `table`.
    pub fn selects(&self, table: &str) -> Vec<SelectQuery> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                GatewayRequest::Select(q) if q.table == table => Some(q),
                _ => None,
            })
            .collect()
    }

    /// Forget logged requests.
    pub fn clear_requests(&self) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Fail every subsequent call on `table` with a gateway error.
    pub fn fail_table(&self, table: &str, message: &str) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(table.to_string(), message.to_string());
    }

    /// Stop failing calls on `table`.
    pub fn recover_table(&self, table: &str) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(table);
    }

    /// Delay the next select by `delay`. Queued delays apply in order.
    pub fn push_delay(&self, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(delay);
    }

    fn log(&self, request: GatewayRequest) -> AppResult<()> {
        let table = request.table().to_string();
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        match self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&table)
        {
            Some(message) => Err(AppError::gateway(message.clone())),
            None => Ok(()),
        }
    }

    fn assign_id(&self, table: &str) -> Value {
        if self.uuid_tables.contains(table) {
            Value::String(Uuid::new_v4().to_string())
        } else {
            Value::from(self.next_id.fetch_add(1, AtomicOrdering::SeqCst))
        }
    }

    fn embed(&self, table: &str, columns: &str, rows: Vec<Value>) -> Vec<Value> {
        let embeds = parse_embeds(columns);
        let Some(relations) = self.relations.get(table) else {
            return rows;
        };
        if embeds.is_empty() {
            return rows;
        }

        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        rows.into_iter()
            .filter_map(|mut row| {
                for embed in &embeds {
                    let Some(relation) = relations.iter().find(|r| r.target == embed.name) else {
                        continue;
                    };
                    let key = row.get(&relation.via).and_then(scalar_text);
                    let related = key.and_then(|key| {
                        tables.get(&relation.target).and_then(|rows| {
                            rows.iter()
                                .find(|r| r.get("id").and_then(scalar_text).as_ref() == Some(&key))
                                .cloned()
                        })
                    });
                    if related.is_none() && embed.inner {
                        return None;
                    }
                    if let Value::Object(map) = &mut row {
                        map.insert(embed.name.clone(), related.unwrap_or(Value::Null));
                    }
                }
                Some(row)
            })
            .collect()
    }
}

fn same_id(row: &Value, id: &str) -> bool {
    row.get("id").and_then(scalar_text).as_deref() == Some(id)
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn select(&self, query: &SelectQuery) -> AppResult<QueryPage> {
        self.log(GatewayRequest::Select(query.clone()))?;

        let delay = self
            .delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let rows = self.rows(&query.table);
        let mut rows: Vec<Value> = self
            .embed(&query.table, &query.columns, rows)
            .into_iter()
            .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_rows(a, b, &order.field);
                match order.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let total = rows.len() as u64;
        let rows: Vec<Value> = match (query.range, query.limit) {
            (Some((from, to)), _) => rows
                .into_iter()
                .skip(from as usize)
                .take((to.saturating_sub(from) as usize).saturating_add(1))
                .collect(),
            (None, Some(limit)) => rows.into_iter().take(limit as usize).collect(),
            (None, None) => rows,
        };

        debug!(table = %query.table, returned = rows.len(), total, "Memory select");
        Ok(QueryPage {
            rows,
            total: query.count_exact.then_some(total),
        })
    }

    async fn insert(&self, table: &str, row: Value) -> AppResult<Value> {
        self.log(GatewayRequest::Insert {
            table: table.to_string(),
            row: row.clone(),
        })?;

        let Value::Object(mut map) = row else {
            return Err(AppError::validation(format!("Insert into {table} needs an object row")));
        };
        if !map.contains_key("id") {
            map.insert("id".to_string(), self.assign_id(table));
        }
        map.entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

        let stored = Value::Object(map);
        self.tables
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, table: &str, id: &str, row: Value) -> AppResult<Value> {
        self.log(GatewayRequest::Update {
            table: table.to_string(),
            id: id.to_string(),
            row: row.clone(),
        })?;

        let Value::Object(changes) = row else {
            return Err(AppError::validation(format!("Update of {table} needs an object row")));
        };

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let existing = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| same_id(r, id)))
            .ok_or_else(|| AppError::not_found(format!("No {table} row with id {id}")))?;

        let map = existing.as_object_mut().map(std::mem::take).unwrap_or_else(Map::new);
        let mut merged = map;
        for (key, value) in changes {
            if key != "id" && key != "created_at" {
                merged.insert(key, value);
            }
        }
        *existing = Value::Object(merged);
        Ok(existing.clone())
    }

    async fn delete(&self, table: &str, id: &str) -> AppResult<()> {
        self.log(GatewayRequest::Delete {
            table: table.to_string(),
            id: id.to_string(),
        })?;

        if let Some(rows) = self
            .tables
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(table)
        {
            rows.retain(|r| !same_id(r, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use treetag_core::error::ErrorKind;
    use treetag_core::types::filter::FilterField;
    use treetag_core::types::sorting::SortField;

    fn seeded() -> MemoryGateway {
        let gateway = MemoryGateway::new();
        gateway.seed(
            tables::TREES,
            vec![
                json!({ "id": "t-1", "common_name": "Narra", "created_at": "2024-01-01T00:00:00Z" }),
                json!({ "id": "t-2", "common_name": "Angsana", "created_at": "2024-02-01T00:00:00Z" }),
            ],
        );
        gateway.seed(tables::LOCATIONS, vec![json!({ "id": 4, "name": "North Gate" })]);
        gateway.seed(
            tables::FIELD_DATA,
            vec![
                json!({ "id": "f-1", "tree_id": "t-1", "location_id": 4, "status": "active" }),
                json!({ "id": "f-2", "tree_id": "gone", "location_id": null, "status": "active" }),
            ],
        );
        gateway
    }

    #[tokio::test]
    async fn test_inner_embed_drops_orphans() {
        let gateway = seeded();
        let query = SelectQuery::table(tables::FIELD_DATA)
            .columns(tables::FIELD_DATA_COLUMNS)
            .with_count();
        let page = gateway.select(&query).await.expect("select");
        assert_eq!(page.total, Some(1));
        assert_eq!(page.rows[0]["trees"]["common_name"], json!("Narra"));
        assert_eq!(page.rows[0]["locations"]["name"], json!("North Gate"));
    }

    #[tokio::test]
    async fn test_filter_order_and_range() {
        let gateway = seeded();
        let query = SelectQuery::table(tables::TREES)
            .filter(FilterField::contains("common_name", "a"))
            .order(SortField::asc("common_name"))
            .range(0, 0)
            .with_count();
        let page = gateway.select(&query).await.expect("select");
        assert_eq!(page.total, Some(2));
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0]["common_name"], json!("Angsana"));
    }

    #[tokio::test]
    async fn test_insert_assigns_server_fields() {
        let gateway = seeded();
        let stored = gateway
            .insert(tables::LOCATIONS, json!({ "name": "Riverside" }))
            .await
            .expect("insert");
        assert_eq!(stored["id"], json!(5));
        assert!(stored["created_at"].is_string());

        let tree = gateway
            .insert(tables::TREES, json!({ "common_name": "Molave" }))
            .await
            .expect("insert");
        assert!(Uuid::parse_str(tree["id"].as_str().unwrap_or_default()).is_ok());
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let gateway = seeded();
        let updated = gateway
            .update(tables::TREES, "t-1", json!({ "common_name": "Narra Tree", "id": "x" }))
            .await
            .expect("update");
        assert_eq!(updated["id"], json!("t-1"));
        assert_eq!(updated["created_at"], json!("2024-01-01T00:00:00Z"));

        let missing = gateway.update(tables::TREES, "nope", json!({})).await;
        assert_matches!(missing, Err(e) if e.kind == ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_failure_injection_still_logs() {
        let gateway = seeded();
        gateway.fail_table(tables::TREES, "permission denied");
        let result = gateway.delete(tables::TREES, "t-1").await;
        assert_matches!(result, Err(e) if e.message == "permission denied");
        assert_eq!(gateway.rows(tables::TREES).len(), 2);
        assert_eq!(gateway.requests().len(), 1);

        gateway.recover_table(tables::TREES);
        gateway.delete(tables::TREES, "t-1").await.expect("delete");
        assert_eq!(gateway.rows(tables::TREES).len(), 1);
    }
}
