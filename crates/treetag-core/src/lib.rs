//! # treetag-core
//!
//! Core crate for TreeTag. Contains the traits implemented by the remote
//! gateway and local state crates, configuration schemas, query types
//! (filter, sorting, pagination, select queries), auth events, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other TreeTag crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
