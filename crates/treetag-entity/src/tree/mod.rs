//! Tree domain entities.

pub mod coordinates;
pub mod profile;
pub mod record;

pub use coordinates::Coordinates;
pub use profile::{Endemic, Rank, Taxonomy, TreeProfile};
pub use record::{ClassificationRecord, FieldRecord, RecordKind, TreeRecord};
