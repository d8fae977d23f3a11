//! Record mutations: trees, locations, and user profiles.

pub mod confirm;
pub mod location;
pub mod tree;
pub mod user;

pub use confirm::{Confirm, delete_confirmed};
pub use location::LocationService;
pub use tree::TreeService;
pub use user::UserService;
