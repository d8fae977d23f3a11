//! Entity normalizers.
//!
//! Gateway rows are loosely typed: any nested object may be missing,
//! `null`, malformed, or (for embedded to-one relations) wrapped in a
//! one-element array. These functions never fail; every field falls back
//! to its zero value. A field row without its classification cannot be
//! represented and is dropped by [`field_records`].

mod location;
mod tree;
mod user;
mod value;

pub use location::{location, locations};
pub use tree::{classification, classifications, field_record, field_records, merge_template, profile};
pub use user::{display_name, user, users};
pub use value::to_one;
