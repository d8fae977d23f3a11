//! Core type definitions used across the TreeTag workspace.

pub mod filter;
pub mod pagination;
pub mod query;
pub mod sorting;

pub use filter::{FilterField, FilterOp, FilterValue};
pub use pagination::{PageRequest, PageResponse};
pub use query::{QueryPage, SelectQuery};
pub use sorting::{SortDirection, SortField};
