//! Create/edit form state for a single tree.

pub mod csv;
pub mod tree_form;

pub use tree_form::{FormSnapshot, TreeForm};
