//! Fill a draft from the catalog entry a user picked by name.

use tracing::{info, warn};

use crate::form::TreeForm;
use crate::record::TreeService;

use super::controller::Autocomplete;

/// Outcome of a template fetch after a name was picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration {
    /// Every template field was merged into the draft.
    Merged,
    /// No catalog entry has that exact name; only the name was set.
    NoTemplate,
    /// The fetch failed; only the name was set.
    Failed(String),
    /// The form was submitting and nothing changed.
    Skipped,
}

/// Applies a picked tree name to a form and hydrates it from the catalog.
#[derive(Debug, Clone)]
pub struct TemplateHydrator {
    trees: TreeService,
}

impl TemplateHydrator {
    /// Hydrator reading templates through `trees`.
    pub fn new(trees: TreeService) -> Self {
        Self { trees }
    }

    /// Select `name` in the lookup field, set it on the draft, then merge
    /// the matching catalog entry. On failure the draft keeps everything
    /// but the new name and an inline notice is shown.
    pub async fn select(&self, autocomplete: &Autocomplete, form: &TreeForm, name: &str) -> Hydration {
        autocomplete.select(name);
        self.apply(form, name).await
    }

    /// Set `name` on the draft and merge its template.
    pub async fn apply(&self, form: &TreeForm, name: &str) -> Hydration {
        if !form.set_common_name(name) {
            return Hydration::Skipped;
        }

        match self.trees.fetch_template(name).await {
            Ok(Some(template)) => {
                if !form.merge_template(&template) {
                    return Hydration::Skipped;
                }
                form.clear_notice();
                info!(name, "Hydrated draft from template");
                Hydration::Merged
            }
            Ok(None) => {
                form.set_notice(format!("No saved details found for \"{name}\"."));
                Hydration::NoTemplate
            }
            Err(e) => {
                warn!(name, error = %e, "Template fetch failed");
                form.set_notice(format!("Couldn't load details for \"{name}\". You can fill them in manually."));
                Hydration::Failed(e.message)
            }
        }
    }
}
