//! Draft state for creating or editing one tree.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use treetag_core::error::AppError;
use treetag_core::result::AppResult;
use treetag_core::traits::position::{GeoError, Position, PositionSource};
use treetag_entity::normalize;
use treetag_entity::tree::{ClassificationRecord, FieldRecord, Rank, TreeRecord};

use super::csv::{join_list, parse_coordinate, parse_list};

/// Everything a form view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSnapshot {
    /// The record being edited.
    pub draft: TreeRecord,
    /// Characteristic text not yet committed.
    pub staged_characteristic: String,
    /// A submission is in progress; fields are disabled.
    pub submitting: bool,
    /// Non-blocking inline notice.
    pub notice: Option<String>,
}

#[derive(Debug)]
struct FormState {
    draft: TreeRecord,
    staged: String,
    submitting: bool,
    notice: Option<String>,
}

/// Resets the in-progress flag however the submission ends.
struct Submitting<'a>(&'a Mutex<FormState>);

impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).submitting = false;
    }
}

/// Form controller for a tree draft.
///
/// Handles are cheap clones sharing one draft. While a submission is in
/// progress every setter is a no-op and returns `false`.
#[derive(Debug, Clone)]
pub struct TreeForm {
    state: Arc<Mutex<FormState>>,
}

impl TreeForm {
    fn with_draft(draft: TreeRecord) -> Self {
        Self {
            state: Arc::new(Mutex::new(FormState {
                draft,
                staged: String::new(),
                submitting: false,
                notice: None,
            })),
        }
    }

    /// Blank classification with a fresh id.
    pub fn new_classification() -> Self {
        Self::with_draft(TreeRecord::Classification(ClassificationRecord::draft()))
    }

    /// Blank field placement with a fresh id.
    pub fn new_field_record() -> Self {
        Self::with_draft(TreeRecord::Field(FieldRecord::draft()))
    }

    /// Edit a copy of `record`; the caller's value is never touched.
    pub fn edit(record: &TreeRecord) -> Self {
        Self::with_draft(record.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn edit_draft<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut TreeRecord) -> bool,
    {
        let mut state = self.lock();
        if state.submitting {
            debug!("Form is submitting; ignoring edit");
            return false;
        }
        f(&mut state.draft)
    }

    fn edit_field<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut FieldRecord),
    {
        self.edit_draft(|draft| match draft {
            TreeRecord::Field(record) => {
                f(record);
                true
            }
            TreeRecord::Classification(_) => false,
        })
    }

    /// Copy of the current draft.
    pub fn draft(&self) -> TreeRecord {
        self.lock().draft.clone()
    }

    /// Everything a view renders.
    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.lock();
        FormSnapshot {
            draft: state.draft.clone(),
            staged_characteristic: state.staged.clone(),
            submitting: state.submitting,
            notice: state.notice.clone(),
        }
    }

    /// Whether fields are disabled for a submission.
    pub fn is_submitting(&self) -> bool {
        self.lock().submitting
    }

    /// Current inline notice.
    pub fn notice(&self) -> Option<String> {
        self.lock().notice.clone()
    }

    /// Show an inline notice.
    pub fn set_notice(&self, notice: impl Into<String>) {
        self.lock().notice = Some(notice.into());
    }

    /// Dismiss the inline notice.
    pub fn clear_notice(&self) {
        self.lock().notice = None;
    }

    /// Set the common name.
    pub fn set_common_name(&self, value: &str) -> bool {
        self.edit_draft(|d| {
            d.profile_mut().common_name = value.to_string();
            true
        })
    }

    /// Set the scientific name.
    pub fn set_scientific_name(&self, value: &str) -> bool {
        self.edit_draft(|d| {
            d.profile_mut().scientific_name = value.to_string();
            true
        })
    }

    /// Set one taxonomic rank.
    pub fn set_rank(&self, rank: Rank, value: &str) -> bool {
        self.edit_draft(|d| {
            *d.profile_mut().taxonomy.get_mut(rank) = value.to_string();
            true
        })
    }

    /// Set the endemic region.
    pub fn set_region(&self, value: &str) -> bool {
        self.edit_draft(|d| {
            d.profile_mut().endemic.region = value.to_string();
            true
        })
    }

    /// Parse and set the countries from comma-separated text.
    pub fn set_countries(&self, text: &str) -> bool {
        self.edit_draft(|d| {
            d.profile_mut().endemic.countries = parse_list(text);
            true
        })
    }

    /// Parse and set the provinces from comma-separated text.
    pub fn set_provinces(&self, text: &str) -> bool {
        self.edit_draft(|d| {
            d.profile_mut().endemic.provinces = parse_list(text);
            true
        })
    }

    /// Countries as displayed in the text input.
    pub fn countries_text(&self) -> String {
        join_list(&self.lock().draft.profile().endemic.countries)
    }

    /// Provinces as displayed in the text input.
    pub fn provinces_text(&self) -> String {
        join_list(&self.lock().draft.profile().endemic.provinces)
    }

    /// Set the description.
    pub fn set_description(&self, value: &str) -> bool {
        self.edit_draft(|d| {
            d.profile_mut().description = value.to_string();
            true
        })
    }

    /// Set the latitude from text; unparseable input stores `0`.
    pub fn set_latitude(&self, text: &str) -> bool {
        self.edit_field(|r| r.coordinates.latitude = parse_coordinate(text))
    }

    /// Set the longitude from text; unparseable input stores `0`.
    pub fn set_longitude(&self, text: &str) -> bool {
        self.edit_field(|r| r.coordinates.longitude = parse_coordinate(text))
    }

    /// Set the free-text location label.
    pub fn set_location(&self, label: &str) -> bool {
        self.edit_field(|r| r.coordinates.location = label.to_string())
    }

    /// Link (or unlink) a location row.
    pub fn set_location_id(&self, id: Option<i64>) -> bool {
        self.edit_field(|r| r.location_id = id)
    }

    /// Set the placement status.
    pub fn set_status(&self, status: &str) -> bool {
        self.edit_field(|r| r.status = status.trim().to_string())
    }

    /// Link the placement to a classification row.
    pub fn link_classification(&self, classification_id: &str) -> bool {
        self.edit_field(|r| r.classification_id = classification_id.to_string())
    }

    /// Replace the staged characteristic text.
    pub fn stage_characteristic(&self, text: &str) -> bool {
        let mut state = self.lock();
        if state.submitting {
            return false;
        }
        state.staged = text.to_string();
        true
    }

    /// Commit the staged characteristic (Enter or the add action).
    ///
    /// Blank text is ignored. The staging input is cleared on commit.
    pub fn commit_characteristic(&self) -> bool {
        let mut state = self.lock();
        if state.submitting {
            return false;
        }
        let text = state.staged.trim().to_string();
        if text.is_empty() {
            return false;
        }
        state.draft.profile_mut().characteristics.push(text);
        state.staged.clear();
        true
    }

    /// Key press in the staging input; only `Enter` commits.
    pub fn characteristic_key(&self, key: &str) -> bool {
        key == "Enter" && self.commit_characteristic()
    }

    /// Remove the characteristic at `index`.
    pub fn remove_characteristic(&self, index: usize) -> bool {
        self.edit_draft(|d| {
            let characteristics = &mut d.profile_mut().characteristics;
            if index < characteristics.len() {
                characteristics.remove(index);
                true
            } else {
                false
            }
        })
    }

    /// Merge a template row's descriptive fields into the draft.
    ///
    /// Identity and creation time are kept. A field draft is also linked
    /// to the template's classification.
    pub fn merge_template(&self, template: &Value) -> bool {
        self.edit_draft(|d| {
            normalize::merge_template(d.profile_mut(), template);
            if let TreeRecord::Field(record) = d {
                match template.get("id") {
                    Some(Value::String(id)) if !id.is_empty() => {
                        record.classification_id = id.clone();
                    }
                    Some(Value::Number(id)) => record.classification_id = id.to_string(),
                    _ => {}
                }
            }
            true
        })
    }

    /// Fill the coordinates from the device position.
    ///
    /// On failure the coordinates are left as they were and the notice is
    /// set to the outcome's message.
    pub async fn apply_position(
        &self,
        source: &dyn PositionSource,
        timeout: Duration,
    ) -> Result<Position, GeoError> {
        if matches!(self.lock().draft, TreeRecord::Classification(_)) {
            return Err(GeoError::Unavailable(
                "classification records have no coordinates".to_string(),
            ));
        }

        match source.current_position(timeout).await {
            Ok(position) => {
                self.edit_field(|r| {
                    r.coordinates.latitude = position.latitude;
                    r.coordinates.longitude = position.longitude;
                });
                self.clear_notice();
                Ok(position)
            }
            Err(e) => {
                warn!(error = %e, "Could not read device position");
                self.set_notice(e.user_message());
                Err(e)
            }
        }
    }

    /// Why the draft cannot be submitted, if it cannot.
    pub fn validation_error(&self) -> Option<&'static str> {
        let state = self.lock();
        if state.draft.profile().common_name.trim().is_empty() {
            return Some("Common name is required");
        }
        match &state.draft {
            TreeRecord::Field(r) if r.classification_id.is_empty() => {
                Some("Choose a tree classification before placing a tree")
            }
            _ => None,
        }
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && self.validation_error().is_none()
    }

    /// Hand the draft to `handler` with fields disabled until it returns.
    ///
    /// The handler decides success; its result is returned unchanged and
    /// the form is re-enabled either way.
    pub async fn submit<F, Fut>(&self, handler: F) -> AppResult<TreeRecord>
    where
        F: FnOnce(TreeRecord) -> Fut,
        Fut: Future<Output = AppResult<TreeRecord>>,
    {
        if let Some(problem) = self.validation_error() {
            return Err(AppError::validation(problem));
        }

        let draft = {
            let mut state = self.lock();
            if state.submitting {
                return Err(AppError::conflict("A submission is already in progress"));
            }
            state.submitting = true;
            state.draft.clone()
        };

        let _submitting = Submitting(&self.state);
        handler(draft).await
    }

    /// Invoke `on_cancel`. The draft is left as it is.
    pub fn cancel<F: FnOnce()>(&self, on_cancel: F) {
        on_cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use serde_json::json;
    use treetag_core::error::ErrorKind;

    struct FixedPosition(Result<Position, GeoError>);

    #[async_trait]
    impl PositionSource for FixedPosition {
        async fn current_position(&self, _timeout: Duration) -> Result<Position, GeoError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_edit_copy_is_independent() {
        let mut original = ClassificationRecord::draft();
        original.profile.characteristics = vec!["Shade tree".into()];
        let original = TreeRecord::Classification(original);

        let form = TreeForm::edit(&original);
        form.stage_characteristic("Red sap");
        assert!(form.commit_characteristic());

        assert_eq!(original.profile().characteristics, vec!["Shade tree"]);
        assert_eq!(form.draft().profile().characteristics, vec!["Shade tree", "Red sap"]);
    }

    #[test]
    fn test_list_and_coordinate_setters() {
        let form = TreeForm::new_field_record();
        form.set_countries("Philippines, , Indonesia,");
        assert_eq!(form.countries_text(), "Philippines, Indonesia");

        form.set_latitude("14.65");
        form.set_longitude("abc");
        let draft = form.draft();
        let coords = draft.coordinates().expect("field record");
        assert_eq!(coords.latitude, 14.65);
        assert_eq!(coords.longitude, 0.0);

        let classification = TreeForm::new_classification();
        assert!(!classification.set_latitude("1.0"));
    }

    #[test]
    fn test_characteristic_staging() {
        let form = TreeForm::new_classification();
        form.stage_characteristic("   ");
        assert!(!form.characteristic_key("Enter"));

        form.stage_characteristic("  Buttressed trunk ");
        assert!(!form.characteristic_key("a"));
        assert!(form.characteristic_key("Enter"));
        assert_eq!(form.snapshot().staged_characteristic, "");

        assert!(!form.remove_characteristic(3));
        assert!(form.remove_characteristic(0));
        assert!(form.draft().profile().characteristics.is_empty());
    }

    #[tokio::test]
    async fn test_fields_disabled_while_submitting() {
        let form = TreeForm::new_classification();
        form.set_common_name("Narra");

        let other = form.clone();
        let result = form
            .submit(|_draft| async move {
                assert!(other.is_submitting());
                assert!(!other.set_common_name("Molave"));
                Err::<TreeRecord, _>(AppError::gateway("offline"))
            })
            .await;

        assert_matches!(result, Err(e) if e.kind == ErrorKind::Gateway);
        assert!(!form.is_submitting());
        assert_eq!(form.draft().profile().common_name, "Narra");
        assert!(form.set_common_name("Molave"));
    }

    #[tokio::test]
    async fn test_submit_requires_name() {
        let form = TreeForm::new_classification();
        let result = form.submit(|draft| async move { Ok(draft) }).await;
        assert_matches!(result, Err(e) if e.kind == ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_denied_position_keeps_coordinates() {
        let form = TreeForm::new_field_record();
        form.set_latitude("10.5");

        let denied = FixedPosition(Err(GeoError::PermissionDenied));
        let result = form.apply_position(&denied, Duration::from_secs(10)).await;
        assert_matches!(result, Err(GeoError::PermissionDenied));
        assert_eq!(form.draft().coordinates().map(|c| c.latitude), Some(10.5));
        assert!(form
            .notice()
            .is_some_and(|n| n.starts_with("Location permission denied")));

        let fix = FixedPosition(Ok(Position {
            latitude: 14.6,
            longitude: 121.0,
            accuracy_m: Some(5.0),
        }));
        form.apply_position(&fix, Duration::from_secs(10)).await.expect("fix");
        assert_eq!(form.draft().coordinates().map(|c| c.longitude), Some(121.0));
        assert!(form.notice().is_none());
    }

    #[test]
    fn test_template_merge_links_classification() {
        let form = TreeForm::new_field_record();
        let id = form.draft().id().to_string();
        form.merge_template(&json!({ "id": "t-9", "common_name": "Narra", "created_at": "2020-01-01T00:00:00Z" }));

        let draft = form.draft();
        assert_eq!(draft.id(), id);
        assert!(draft.created_at().is_none());
        assert_matches!(draft, TreeRecord::Field(r) if r.classification_id == "t-9");
    }
}
