//! Process-wide session state.

pub mod store;

pub use store::{SessionState, SessionStore};
