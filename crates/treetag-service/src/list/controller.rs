//! Paged, sorted, filtered, and searchable list state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, warn};

use treetag_core::config::query::QueryConfig;
use treetag_core::error::AppError;
use treetag_core::result::AppResult;
use treetag_core::traits::gateway::Gateway;
use treetag_core::types::pagination::{MAX_PAGE_SIZE, PageResponse};

use crate::debounce::Debouncer;
use crate::record::confirm::{Confirm, delete_confirmed};

use super::collection::{Collection, CreatedWithin, ListEntity, ListState, SortKey};

/// What a list view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    /// Inputs the page was fetched with.
    pub state: ListState,
    /// Rows, total count, and page count.
    pub page: PageResponse<ListEntity>,
    /// A fetch is outstanding.
    pub loading: bool,
}

struct ListInner {
    gateway: Arc<dyn Gateway>,
    page_size_options: Vec<u64>,
    state: Mutex<ListState>,
    latest: AtomicU64,
    torn_down: AtomicBool,
    search: Debouncer,
    snapshot: watch::Sender<ListSnapshot>,
}

impl ListInner {
    fn state(&self) -> ListState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn update<F>(&self, f: F) -> ListState
    where
        F: FnOnce(&mut ListState),
    {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state);
        state.clone()
    }

    async fn fetch(&self) -> ListSnapshot {
        if self.torn_down.load(Ordering::SeqCst) {
            return self.snapshot.borrow().clone();
        }

        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let state = self.state();
        let request = state.page_request();
        let query = state.to_query(Utc::now());
        self.snapshot.send_modify(|s| s.loading = true);
        debug!(table = %query.table, page = state.page, token, "Fetching list page");

        let page = match self.gateway.select(&query).await {
            Ok(result) => {
                let items = state.collection.normalize(&result.rows);
                let total = result.total.unwrap_or(items.len() as u64);
                PageResponse::new(items, request.page, request.page_size, total)
            }
            Err(e) => {
                warn!(table = %query.table, error = %e, "List query failed; showing an empty page");
                PageResponse::empty(&request)
            }
        };

        if self.torn_down.load(Ordering::SeqCst) {
            debug!(token, "List torn down; dropping response");
            return self.snapshot.borrow().clone();
        }
        if token != self.latest.load(Ordering::SeqCst) {
            debug!(token, "Discarding stale list response");
            return self.snapshot.borrow().clone();
        }

        let snapshot = ListSnapshot {
            state,
            page,
            loading: false,
        };
        self.snapshot.send_replace(snapshot.clone());
        snapshot
    }
}

/// Controller for one dashboard list view.
///
/// Search text settles for the configured debounce before a fetch; every
/// other input fetches immediately. Each fetch takes a token and only the
/// newest token's response is published, so a slow earlier response never
/// overwrites a later one. Query errors publish an empty page.
#[derive(Clone)]
pub struct ListController {
    inner: Arc<ListInner>,
}

impl std::fmt::Debug for ListController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListController")
            .field("state", &self.inner.state())
            .finish_non_exhaustive()
    }
}

impl ListController {
    /// Controller over `collection`, on page 1 with the default page size.
    /// Nothing is fetched until [`refresh`](Self::refresh) or an input changes.
    pub fn new(gateway: Arc<dyn Gateway>, config: &QueryConfig, collection: Collection) -> Self {
        Self::build(gateway, config, ListState::new(collection, config.default_page_size))
    }

    /// Controller resuming from saved inputs (a bookmarked view, command
    /// line options). The page size must be one of the offered options and
    /// facets the collection lacks are dropped.
    pub fn with_state(
        gateway: Arc<dyn Gateway>,
        config: &QueryConfig,
        mut state: ListState,
    ) -> AppResult<Self> {
        check_page_size(&config.page_size_options, state.page_size)?;
        state.facets.retain_applicable(state.collection);
        state.page = state.page.max(1);
        Ok(Self::build(gateway, config, state))
    }

    fn build(gateway: Arc<dyn Gateway>, config: &QueryConfig, state: ListState) -> Self {
        let empty = PageResponse::empty(&state.page_request());
        let (snapshot, _) = watch::channel(ListSnapshot {
            state: state.clone(),
            page: empty,
            loading: false,
        });

        Self {
            inner: Arc::new(ListInner {
                gateway,
                page_size_options: config.page_size_options.clone(),
                state: Mutex::new(state),
                latest: AtomicU64::new(0),
                torn_down: AtomicBool::new(false),
                search: Debouncer::new(Duration::from_millis(config.debounce_ms)),
                snapshot,
            }),
        }
    }

    /// Current inputs.
    pub fn state(&self) -> ListState {
        self.inner.state()
    }

    /// Last published page.
    pub fn snapshot(&self) -> ListSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Watch published pages.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Fetch the page for the current inputs.
    pub async fn refresh(&self) -> ListSnapshot {
        self.inner.fetch().await
    }

    /// Switch tables. Facets the new table lacks are dropped and the page
    /// resets to 1.
    pub async fn set_collection(&self, collection: Collection) -> ListSnapshot {
        self.inner.search.cancel();
        self.inner.update(|s| {
            s.collection = collection;
            s.facets.retain_applicable(collection);
            s.page = 1;
        });
        self.refresh().await
    }

    /// Update the search text and fetch once it settles. The page resets to 1.
    pub fn set_search(&self, text: &str) {
        let text = text.to_string();
        self.inner.update(|s| {
            s.search = text;
            s.page = 1;
        });
        let inner = self.inner.clone();
        self.inner.search.schedule(async move {
            inner.fetch().await;
        });
    }

    /// Change the ordering.
    pub async fn set_sort(&self, sort: SortKey) -> ListSnapshot {
        self.inner.update(|s| s.sort = sort);
        self.refresh().await
    }

    /// Jump to a page (1-based).
    pub async fn set_page(&self, page: u64) -> ListSnapshot {
        self.inner.update(|s| s.page = page.max(1));
        self.refresh().await
    }

    /// Change the page size to one of the offered options. Resets to page 1.
    pub async fn set_page_size(&self, page_size: u64) -> AppResult<ListSnapshot> {
        check_page_size(&self.inner.page_size_options, page_size)?;
        self.inner.update(|s| {
            s.page_size = page_size;
            s.page = 1;
        });
        Ok(self.refresh().await)
    }

    /// Filter by status (field data only). Resets to page 1.
    pub async fn set_status(&self, status: Option<String>) -> AppResult<ListSnapshot> {
        let status = status.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let collection = self.state().collection;
        if status.is_some() && !collection.has_status() {
            return Err(AppError::validation(format!(
                "The status filter does not apply to {collection:?}"
            )));
        }
        self.inner.update(|s| {
            s.facets.status = status;
            s.page = 1;
        });
        Ok(self.refresh().await)
    }

    /// Filter by creation window. Resets to page 1.
    pub async fn set_created_within(&self, window: Option<CreatedWithin>) -> ListSnapshot {
        self.inner.update(|s| {
            s.facets.created_within = window;
            s.page = 1;
        });
        self.refresh().await
    }

    /// Delete a row of the current collection after confirmation, then
    /// refetch. A declined confirmation sends nothing and keeps the page.
    pub async fn delete(&self, id: &str, confirm: &dyn Confirm) -> AppResult<bool> {
        let collection = self.state().collection;
        let deleted = delete_confirmed(
            self.inner.gateway.as_ref(),
            confirm,
            collection.table(),
            id,
            collection.noun(),
        )
        .await?;
        if deleted {
            self.refresh().await;
        }
        Ok(deleted)
    }

    /// Stop: the pending search timer is cleared and responses still in
    /// flight are dropped.
    pub fn teardown(&self) {
        self.inner.torn_down.store(true, Ordering::SeqCst);
        self.inner.search.cancel();
    }
}

fn check_page_size(options: &[u64], page_size: u64) -> AppResult<()> {
    if !options.contains(&page_size) {
        return Err(AppError::validation(format!(
            "Page size {page_size} is not one of {options:?}"
        )));
    }
    if page_size > MAX_PAGE_SIZE {
        return Err(AppError::validation(format!(
            "Page size {page_size} exceeds the maximum of {MAX_PAGE_SIZE}"
        )));
    }
    Ok(())
}
