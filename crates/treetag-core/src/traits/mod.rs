//! Core traits defined in `treetag-core` and implemented by other crates.

pub mod auth;
pub mod gateway;
pub mod local_store;
pub mod position;

pub use auth::{AuthProvider, AuthSession, AuthUser};
pub use gateway::Gateway;
pub use local_store::LocalStore;
pub use position::{GeoError, Position, PositionSource};
