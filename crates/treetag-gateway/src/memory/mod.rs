//! In-process gateway and auth provider with the same semantics as the
//! REST clients.

mod auth;
mod eval;
pub mod gateway;

pub use auth::MemoryAuth;
pub use gateway::{GatewayRequest, MemoryGateway};
