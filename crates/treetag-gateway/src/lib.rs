//! # treetag-gateway
//!
//! Clients for the hosted backend. Two implementations of the
//! [`Gateway`](treetag_core::traits::Gateway) trait are provided:
//!
//! - **rest**: HTTP client for a PostgREST-style table API plus a
//!   GoTrue-style auth client, built on [reqwest](https://crates.io/crates/reqwest)
//! - **memory**: in-process tables with the same filter, ordering, range,
//!   count, and embedding semantics; records every request
//!
//! The implementation is selected by the caller at wiring time.

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "rest")]
pub mod rest;

#[cfg(feature = "memory")]
pub use memory::{GatewayRequest, MemoryAuth, MemoryGateway};
#[cfg(feature = "rest")]
pub use rest::{RestAuth, RestGateway, TokenSlot};
