//! # treetag-entity
//!
//! Domain entity models for TreeTag. Every struct in this crate is a
//! strict, fully populated shape; loosely typed gateway rows become these
//! shapes only through the [`normalize`] functions.

pub mod location;
pub mod normalize;
pub mod tables;
pub mod tree;
pub mod user;
