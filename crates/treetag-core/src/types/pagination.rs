//! Pagination types for list views.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_PAGE_SIZE: u64 = 20;
/// Maximum page size.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Zero-based index of the first row on this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Return the row limit.
    pub fn limit(&self) -> u64 {
        self.page_size
    }

    /// Inclusive `(from, to)` row range, as range-based gateways expect.
    pub fn range(&self) -> (u64, u64) {
        let from = self.offset();
        (from, from.saturating_add(self.page_size.saturating_sub(1)))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Number of pages needed for `total_items`; never less than one.
pub fn page_count(total_items: u64, page_size: u64) -> u64 {
    if total_items == 0 || page_size == 0 {
        1
    } else {
        total_items.div_ceil(page_size)
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages (at least 1).
    pub total_pages: u64,
    /// Whether there is a next page.
    pub has_next: bool,
    /// Whether there is a previous page.
    pub has_previous: bool,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = page_count(total_items, page_size);
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }

    /// Create an empty response.
    pub fn empty(page_request: &PageRequest) -> Self {
        Self::new(Vec::new(), page_request.page, page_request.page_size, 0)
    }

    /// Human-readable position, e.g. `"21 - 40 of 45"`.
    pub fn summary(&self) -> String {
        if self.total_items == 0 {
            return "0 - 0 of 0".to_string();
        }
        let skipped = self.page.saturating_sub(1).saturating_mul(self.page_size);
        if skipped >= self.total_items {
            return format!("0 - 0 of {}", self.total_items);
        }
        let first = skipped + 1;
        let last = self.page.saturating_mul(self.page_size).min(self.total_items);
        format!("{first} - {last} of {}", self.total_items)
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
