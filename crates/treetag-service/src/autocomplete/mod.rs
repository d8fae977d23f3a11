//! Debounced name/location suggestions and template hydration.

pub mod controller;
pub mod hydrate;
pub mod source;

pub use controller::{Autocomplete, AutocompleteSnapshot, SuggestPhase};
pub use hydrate::{Hydration, TemplateHydrator};
pub use source::{LocationSource, SuggestionSource, TreeNameSource};
