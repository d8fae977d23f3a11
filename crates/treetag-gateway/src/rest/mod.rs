//! HTTP clients for the hosted backend's table and auth APIs.

pub mod auth;
pub mod client;
pub mod params;

use std::sync::Arc;

use tokio::sync::RwLock;

pub use auth::RestAuth;
pub use client::RestGateway;

/// Access token shared between the auth client (writer) and the table
/// client (reader). `None` means requests go out with the anon key only.
pub type TokenSlot = Arc<RwLock<Option<String>>>;
