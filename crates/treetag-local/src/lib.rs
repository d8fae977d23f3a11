//! # treetag-local
//!
//! Local persisted key/value state. Holds the mirrored auth token and the
//! scan counter. Two [`LocalStore`](treetag_core::traits::LocalStore)
//! implementations are provided:
//!
//! - **file**: a JSON object on disk, rewritten on every change
//! - **memory**: an in-process map using [dashmap](https://crates.io/crates/dashmap)

#[cfg(feature = "file")]
pub mod file;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "file")]
pub use file::FileStore;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
