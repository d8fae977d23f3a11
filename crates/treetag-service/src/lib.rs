//! # treetag-service
//!
//! Controllers and services for TreeTag. Each one is headless: it owns
//! state, talks to the gateway, and publishes snapshots over a `watch`
//! channel for whatever renders it.
//!
//! Services follow constructor injection; every dependency arrives at
//! construction time as an `Arc` to a trait object.

pub mod autocomplete;
pub mod debounce;
pub mod form;
pub mod list;
pub mod nearby;
pub mod qr;
pub mod record;
pub mod scan;
pub mod session;

pub use autocomplete::{Autocomplete, LocationSource, SuggestionSource, TemplateHydrator, TreeNameSource};
pub use debounce::Debouncer;
pub use form::TreeForm;
pub use list::{Collection, ListController, SortKey};
pub use nearby::{Nearby, nearest_first};
pub use qr::QrPayload;
pub use record::{Confirm, LocationService, TreeService, UserService};
pub use scan::ScanTracker;
pub use session::SessionStore;
