//! List/query controller for the dashboard collections.

pub mod collection;
pub mod controller;

pub use collection::{Collection, CreatedWithin, Facets, ListEntity, ListState, SortKey};
pub use controller::{ListController, ListSnapshot};
