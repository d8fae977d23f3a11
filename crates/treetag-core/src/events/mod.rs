//! Events emitted by the auth provider.

pub mod auth;

pub use auth::AuthEvent;
