//! Suggestion panel state machine for one lookup field.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{OnceCell, watch};
use tracing::{debug, warn};

use treetag_core::config::query::QueryConfig;

use crate::debounce::Debouncer;

use super::source::SuggestionSource;

/// Below this many characters the recent list is shown instead of a search.
pub const MIN_QUERY_CHARS: usize = 2;

/// Where a lookup stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SuggestPhase {
    /// Nothing requested yet, or a value was just selected.
    #[default]
    Idle,
    /// A lookup is outstanding.
    Loading,
    /// Candidates to offer.
    Results(Vec<String>),
    /// The lookup failed.
    Error(String),
}

/// What a lookup field renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutocompleteSnapshot {
    /// Current input text.
    pub value: String,
    /// The input has focus.
    pub focused: bool,
    /// The suggestion panel is visible.
    pub open: bool,
    /// Lookup state.
    pub phase: SuggestPhase,
}

#[derive(Debug, Default)]
struct FieldState {
    value: String,
    focused: bool,
    open: bool,
    phase: SuggestPhase,
    suppress: Option<String>,
    applied: u64,
}

impl FieldState {
    fn snapshot(&self) -> AutocompleteSnapshot {
        AutocompleteSnapshot {
            value: self.value.clone(),
            focused: self.focused,
            open: self.open,
            phase: self.phase.clone(),
        }
    }
}

struct AutocompleteInner {
    source: Arc<dyn SuggestionSource>,
    recent: OnceCell<Vec<String>>,
    state: Mutex<FieldState>,
    latest: AtomicU64,
    torn_down: AtomicBool,
    lookup: Debouncer,
    blur: Debouncer,
    snapshot: watch::Sender<AutocompleteSnapshot>,
}

impl AutocompleteInner {
    fn with_state<R>(&self, f: impl FnOnce(&mut FieldState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let result = f(&mut state);
        self.snapshot.send_replace(state.snapshot());
        result
    }

    fn next_token(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, token: u64) -> bool {
        !self.torn_down.load(Ordering::SeqCst) && self.latest.load(Ordering::SeqCst) == token
    }

    async fn show_recent(&self, token: u64) {
        let loaded = self
            .recent
            .get_or_try_init(|| async { self.source.recent().await })
            .await
            .cloned();

        if !self.is_current(token) {
            return;
        }
        self.with_state(|s| {
            s.applied = token;
            s.phase = match loaded {
                Ok(values) => SuggestPhase::Results(values),
                Err(e) => {
                    warn!(error = %e, "Loading recent suggestions failed");
                    SuggestPhase::Error(e.message)
                }
            };
        });
    }

    async fn search(&self, term: String, token: u64) {
        if !self.is_current(token) {
            return;
        }
        self.with_state(|s| s.phase = SuggestPhase::Loading);
        debug!(term = %term, token, "Suggestion lookup");

        let result = self.source.search(&term).await;
        if !self.is_current(token) {
            debug!(token, "Discarding stale suggestions");
            return;
        }
        self.with_state(|s| {
            s.applied = token;
            s.phase = match result {
                Ok(values) => SuggestPhase::Results(values),
                Err(e) => {
                    warn!(term = %term, error = %e, "Suggestion lookup failed");
                    SuggestPhase::Error(e.message)
                }
            };
        });
    }
}

/// Debounced suggestions for one input.
///
/// Under two characters the focused field offers the source's recent
/// values, fetched once and cached. From two characters on, a substring
/// search runs after the input settles. Selecting a value suppresses the
/// lookup its own text change would trigger. Blurring closes the panel
/// after a grace delay and keeps the results.
#[derive(Clone)]
pub struct Autocomplete {
    inner: Arc<AutocompleteInner>,
}

impl std::fmt::Debug for Autocomplete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autocomplete")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl Autocomplete {
    /// Lookup field over `source` with the configured timings.
    pub fn new(source: Arc<dyn SuggestionSource>, config: &QueryConfig) -> Self {
        Self {
            inner: Arc::new(AutocompleteInner {
                source,
                recent: OnceCell::new(),
                state: Mutex::new(FieldState::default()),
                latest: AtomicU64::new(0),
                torn_down: AtomicBool::new(false),
                lookup: Debouncer::new(Duration::from_millis(config.debounce_ms)),
                blur: Debouncer::new(Duration::from_millis(config.blur_grace_ms)),
                snapshot: watch::channel(AutocompleteSnapshot::default()).0,
            }),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> AutocompleteSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<AutocompleteSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// The input gained focus. Opens the panel; with a short value the
    /// recent list is shown.
    pub async fn focus(&self) {
        self.inner.blur.cancel();
        let short = self.inner.with_state(|s| {
            s.focused = true;
            s.open = true;
            s.value.trim().chars().count() < MIN_QUERY_CHARS
        });
        if short {
            let token = self.inner.next_token();
            self.inner.show_recent(token).await;
        }
    }

    /// The input text changed.
    pub async fn input(&self, text: &str) {
        let (suppressed, focused) = self.inner.with_state(|s| {
            s.value = text.to_string();
            let suppressed = s.suppress.take().is_some_and(|v| v == text);
            (suppressed, s.focused)
        });
        if suppressed {
            debug!(value = %text, "Skipping lookup for selected value");
            return;
        }

        let token = self.inner.next_token();
        let term = text.trim().to_string();
        if term.chars().count() < MIN_QUERY_CHARS {
            self.inner.lookup.cancel();
            if focused {
                self.inner.show_recent(token).await;
            } else {
                self.inner.with_state(|s| {
                    s.phase = SuggestPhase::Idle;
                    s.applied = token;
                });
            }
            return;
        }

        let inner = self.inner.clone();
        self.inner.lookup.schedule(async move {
            inner.search(term, token).await;
        });
    }

    /// A suggestion was picked. Sets the value, closes the panel, and
    /// suppresses the lookup for this value.
    pub fn select(&self, value: &str) {
        self.inner.lookup.cancel();
        let token = self.inner.next_token();
        self.inner.with_state(|s| {
            s.applied = token;
            s.value = value.to_string();
            s.suppress = Some(value.to_string());
            s.open = false;
            s.phase = SuggestPhase::Idle;
        });
    }

    /// Wait until the newest lookup has been applied and return its phase.
    ///
    /// Returns the current phase straight away after teardown.
    pub async fn settled(&self) -> SuggestPhase {
        let mut changes = self.subscribe();
        loop {
            let (phase, applied) = {
                let state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
                (state.phase.clone(), state.applied)
            };
            let latest = self.inner.latest.load(Ordering::SeqCst);
            if self.inner.torn_down.load(Ordering::SeqCst)
                || (applied == latest && phase != SuggestPhase::Loading)
            {
                return phase;
            }
            if changes.changed().await.is_err() {
                return phase;
            }
        }
    }

    /// The input lost focus. The panel closes after the grace delay so a
    /// click on a suggestion can still land; results are kept.
    pub fn blur(&self) {
        self.inner.with_state(|s| s.focused = false);
        let inner = self.inner.clone();
        self.inner.blur.schedule(async move {
            if inner.torn_down.load(Ordering::SeqCst) {
                return;
            }
            inner.with_state(|s| {
                if !s.focused {
                    s.open = false;
                }
            });
        });
    }

    /// Clear pending timers and ignore responses still in flight.
    pub fn teardown(&self) {
        self.inner.torn_down.store(true, Ordering::SeqCst);
        self.inner.lookup.cancel();
        self.inner.blur.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use treetag_core::result::AppResult;

    #[derive(Default)]
    struct CountingSource {
        recent_calls: AtomicUsize,
        searches: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SuggestionSource for CountingSource {
        async fn recent(&self) -> AppResult<Vec<String>> {
            self.recent_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["Narra".into(), "Molave".into()])
        }

        async fn search(&self, term: &str) -> AppResult<Vec<String>> {
            self.searches
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(term.to_string());
            Ok(vec![format!("{term}gsana")])
        }
    }

    fn field() -> (Arc<CountingSource>, Autocomplete) {
        let source = Arc::new(CountingSource::default());
        let autocomplete = Autocomplete::new(source.clone(), &QueryConfig::default());
        (source, autocomplete)
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_input_uses_cached_recent() {
        let (source, field) = field();
        field.focus().await;
        field.input("N").await;
        field.input("").await;

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.recent_calls.load(Ordering::SeqCst), 1);
        assert!(source.searches.lock().unwrap_or_else(|e| e.into_inner()).is_empty());
        assert_eq!(
            field.snapshot().phase,
            SuggestPhase::Results(vec!["Narra".into(), "Molave".into()])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_does_not_search_again() {
        let (source, field) = field();
        field.focus().await;
        field.input("An").await;
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(field.snapshot().phase, SuggestPhase::Results(vec!["Angsana".into()]));

        field.select("Angsana");
        field.input("Angsana").await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(*source.searches.lock().unwrap_or_else(|e| e.into_inner()), vec!["An"]);
        let snapshot = field.snapshot();
        assert_eq!(snapshot.value, "Angsana");
        assert!(!snapshot.open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_waits_for_newest_lookup() {
        let (_source, field) = field();
        field.focus().await;
        field.input("Na").await;
        assert_eq!(field.settled().await, SuggestPhase::Results(vec!["Nagsana".into()]));

        field.input("Mo").await;
        assert_eq!(field.settled().await, SuggestPhase::Results(vec!["Mogsana".into()]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blur_closes_after_grace_and_keeps_results() {
        let (_source, field) = field();
        field.focus().await;
        field.blur();
        assert!(field.snapshot().open);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let snapshot = field.snapshot();
        assert!(!snapshot.open);
        assert!(!snapshot.focused);
        assert_matches::assert_matches!(snapshot.phase, SuggestPhase::Results(_));
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_drops_pending_lookup() {
        let (source, field) = field();
        field.focus().await;
        field.input("Nar").await;
        field.teardown();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(source.searches.lock().unwrap_or_else(|e| e.into_inner()).is_empty());
    }
}
