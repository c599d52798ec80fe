//! Debounced place search with multi-location badges.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, warn};

use super::location::LocationSelection;
use crate::client::{session_token, Geocoder};
use crate::models::{GeocodedPlace, Suggestion};

pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);
pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_SELECTED_LOCATIONS: usize = 3;

/// Runs only the most recent of a burst of calls.
///
/// Every [`Debouncer::run`] bumps a shared generation, waits out the delay
/// and gives up if a newer call arrived meanwhile.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `task` after the delay. `None` if superseded before or while it ran.
    pub async fn run<F, Fut, T>(&self, task: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if !self.is_current(generation) {
            return None;
        }

        let output = task().await;
        self.is_current(generation).then_some(output)
    }

    /// Drop whatever is pending.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

/// Keys the search input reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// How a picked suggestion was committed.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationPick {
    /// Committed with geometry from the geocoder
    Located { name: String, place: GeocodedPlace },
    /// Committed by name only
    Named(String),
    /// Already selected, or the selection limit is reached
    Ignored,
}

#[derive(Debug, Default)]
struct TypeaheadState {
    input: String,
    suggestions: Vec<Suggestion>,
    selected: Vec<String>,
    is_open: bool,
    highlighted: Option<usize>,
}

impl TypeaheadState {
    fn reset_input(&mut self) {
        self.input.clear();
        self.suggestions.clear();
        self.is_open = false;
        self.highlighted = None;
    }
}

pub struct LocationSearch {
    geocoder: Arc<dyn Geocoder>,
    selection: LocationSelection,
    debouncer: Debouncer,
    session_token: String,
    state: Mutex<TypeaheadState>,
}

impl LocationSearch {
    pub fn new(geocoder: Arc<dyn Geocoder>, selection: LocationSelection) -> Self {
        Self::with_debouncer(geocoder, selection, Debouncer::default())
    }

    pub fn with_debouncer(
        geocoder: Arc<dyn Geocoder>,
        selection: LocationSelection,
        debouncer: Debouncer,
    ) -> Self {
        Self {
            geocoder,
            selection,
            debouncer,
            session_token: session_token(),
            state: Mutex::new(TypeaheadState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, TypeaheadState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn input(&self) -> String {
        self.state().input.clone()
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.state().suggestions.clone()
    }

    pub fn selected_locations(&self) -> Vec<String> {
        self.state().selected.clone()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.state().highlighted
    }

    /// Rebuild the badges from a committed, comma separated location string.
    pub fn sync_selected(&self, value: &str) {
        self.state().selected = value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
    }

    /// Record new input text and, once it settles, fetch suggestions for it.
    /// Returns `None` when a newer keystroke superseded this one.
    pub async fn input_changed(&self, text: &str) -> Option<Vec<Suggestion>> {
        self.state().input = text.to_string();

        if text.chars().count() < MIN_QUERY_CHARS {
            self.debouncer.cancel();
            let mut state = self.state();
            state.suggestions.clear();
            state.is_open = false;
            state.highlighted = None;
            return Some(Vec::new());
        }

        let geocoder = Arc::clone(&self.geocoder);
        let token = self.session_token.clone();
        let query = text.to_string();
        let result = self
            .debouncer
            .run(|| async move { geocoder.suggest(&query, &token).await })
            .await?;

        let suggestions = result.unwrap_or_else(|e| {
            warn!("Location suggestions failed: {}", e);
            Vec::new()
        });

        let mut state = self.state();
        state.is_open = !suggestions.is_empty();
        state.highlighted = None;
        state.suggestions = suggestions.clone();
        Some(suggestions)
    }

    /// Commit `suggestion` as a location and add it as a badge.
    pub async fn select(&self, suggestion: &Suggestion) -> LocationPick {
        let name = suggestion.name.clone();
        {
            let mut state = self.state();
            let duplicate = state.selected.contains(&name);
            if duplicate || state.selected.len() >= MAX_SELECTED_LOCATIONS {
                debug!("Ignoring location pick '{}'", name);
                state.reset_input();
                return LocationPick::Ignored;
            }
        }

        let pick = match self.geocoder.retrieve(suggestion, &self.session_token).await {
            Ok(Some(place)) => match place.bbox {
                Some(bbox) => {
                    self.selection
                        .select_location_with_bbox(&name, bbox, place.center);
                    LocationPick::Located {
                        name: name.clone(),
                        place,
                    }
                }
                None => self.pick_by_name(&name),
            },
            Ok(None) => self.pick_by_name(&name),
            Err(e) => {
                warn!("Failed to retrieve location '{}': {}", name, e);
                self.pick_by_name(&name)
            }
        };

        let mut state = self.state();
        state.selected.push(name);
        state.reset_input();
        pick
    }

    fn pick_by_name(&self, name: &str) -> LocationPick {
        self.selection.select_location(name);
        LocationPick::Named(name.to_string())
    }

    fn commit_selected(&self, selected: &[String]) {
        self.selection.select_location(&selected.join(", "));
    }

    /// Remove a badge and re-commit the remaining names.
    pub fn remove(&self, name: &str) {
        let remaining = {
            let mut state = self.state();
            state.selected.retain(|selected| selected != name);
            state.selected.clone()
        };
        self.commit_selected(&remaining);
    }

    pub async fn handle_key(&self, key: Key) -> Option<LocationPick> {
        let suggestion = {
            let mut state = self.state();
            if key == Key::Backspace {
                if !state.input.is_empty() || state.selected.is_empty() {
                    return None;
                }
                state.selected.pop();
                let remaining = state.selected.clone();
                drop(state);
                self.commit_selected(&remaining);
                return None;
            }

            if !state.is_open || state.suggestions.is_empty() {
                return None;
            }

            let last = state.suggestions.len() - 1;
            match key {
                Key::ArrowDown => {
                    state.highlighted = Some(state.highlighted.map_or(0, |i| (i + 1).min(last)));
                    None
                }
                Key::ArrowUp => {
                    state.highlighted = state.highlighted.and_then(|i| i.checked_sub(1));
                    None
                }
                Key::Escape => {
                    state.is_open = false;
                    None
                }
                Key::Enter => state
                    .highlighted
                    .and_then(|i| state.suggestions.get(i).cloned()),
                Key::Backspace => None,
            }
        };

        match suggestion {
            Some(suggestion) => Some(self.select(&suggestion).await),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ApiResult};
    use crate::models::{BBox, LngLat};
    use crate::store::SearchStore;
    use async_trait::async_trait;

    #[derive(Default)]
    struct FakeGeocoder {
        queries: Mutex<Vec<String>>,
        place: Option<GeocodedPlace>,
        fail_retrieve: bool,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn suggest(&self, query: &str, session_token: &str) -> ApiResult<Vec<Suggestion>> {
            assert!(session_token.starts_with("session-"));
            self.queries.lock().unwrap().push(query.to_string());
            Ok(vec![suggestion(&format!("{query} Mitte")), suggestion(query)])
        }

        async fn retrieve(
            &self,
            _suggestion: &Suggestion,
            _session_token: &str,
        ) -> ApiResult<Option<GeocodedPlace>> {
            if self.fail_retrieve {
                return Err(ApiError::decode("/retrieve", "bad feature"));
            }
            Ok(self.place)
        }
    }

    fn suggestion(name: &str) -> Suggestion {
        Suggestion {
            name: name.to_string(),
            place_formatted: "Österreich".to_string(),
            feature_type: "place".to_string(),
            mapbox_id: format!("id-{name}"),
        }
    }

    fn setup(geocoder: FakeGeocoder) -> (SearchStore, Arc<FakeGeocoder>, LocationSearch) {
        let store = SearchStore::new();
        let geocoder = Arc::new(geocoder);
        let search = LocationSearch::new(geocoder.clone(), LocationSelection::new(store.clone()));
        (store, geocoder, search)
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_keeps_only_latest_call() {
        let debouncer = Debouncer::default();
        let (first, second) = tokio::join!(debouncer.run(|| async { 1 }), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            debouncer.run(|| async { 2 }).await
        });
        assert_eq!(first, None);
        assert_eq!(second, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn short_input_skips_geocoder() {
        let (_, geocoder, search) = setup(FakeGeocoder::default());
        assert_eq!(search.input_changed("W").await, Some(Vec::new()));
        assert!(geocoder.queries.lock().unwrap().is_empty());
        assert!(!search.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn typing_burst_queries_once() {
        let (_, geocoder, search) = setup(FakeGeocoder::default());
        let (first, last) = tokio::join!(search.input_changed("Wi"), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            search.input_changed("Wien").await
        });

        assert!(first.is_none());
        assert_eq!(last.unwrap().len(), 2);
        assert_eq!(*geocoder.queries.lock().unwrap(), vec!["Wien".to_string()]);
        assert!(search.is_open());
    }

    #[tokio::test]
    async fn retrieved_bbox_is_committed() {
        let bbox = BBox::new(16.2, 48.1, 16.5, 48.3);
        let (store, _, search) = setup(FakeGeocoder {
            place: Some(GeocodedPlace {
                bbox: Some(bbox),
                center: Some(LngLat::new(16.37, 48.2)),
            }),
            ..FakeGeocoder::default()
        });

        let pick = search.select(&suggestion("Wien")).await;

        assert!(matches!(pick, LocationPick::Located { .. }));
        let data = store.filters().location_data.unwrap();
        assert_eq!(data.bbox, Some(bbox));
        assert_eq!(search.selected_locations(), vec!["Wien"]);
        assert_eq!(search.input(), "");
    }

    #[tokio::test]
    async fn retrieve_failure_falls_back_to_name() {
        let (store, _, search) = setup(FakeGeocoder {
            fail_retrieve: true,
            ..FakeGeocoder::default()
        });

        let pick = search.select(&suggestion("Hallstatt")).await;
        assert_eq!(pick, LocationPick::Named("Hallstatt".to_string()));
        assert_eq!(store.filters().location, "Hallstatt");
        assert!(store.filters().location_data.is_none());
    }

    #[tokio::test]
    async fn at_most_three_distinct_locations() {
        let (_, _, search) = setup(FakeGeocoder::default());
        for name in ["Graz", "Linz", "Graz", "Wels", "Steyr"] {
            search.select(&suggestion(name)).await;
        }
        assert_eq!(search.selected_locations(), vec!["Graz", "Linz", "Wels"]);
    }

    #[tokio::test]
    async fn backspace_and_remove_recommit_remaining() {
        let (store, _, search) = setup(FakeGeocoder::default());
        search.select(&suggestion("Graz")).await;
        search.select(&suggestion("Linz")).await;
        search.select(&suggestion("Wels")).await;

        search.remove("Linz");
        assert_eq!(store.filters().location, "Graz, Wels");

        search.handle_key(Key::Backspace).await;
        assert_eq!(search.selected_locations(), vec!["Graz"]);
        assert_eq!(store.filters().location, "Graz");
    }

    #[tokio::test(start_paused = true)]
    async fn keyboard_navigation_selects_highlighted() {
        let (_, _, search) = setup(FakeGeocoder::default());
        search.input_changed("Linz").await;

        search.handle_key(Key::ArrowDown).await;
        search.handle_key(Key::ArrowDown).await;
        search.handle_key(Key::ArrowDown).await;
        assert_eq!(search.highlighted(), Some(1));

        search.handle_key(Key::ArrowUp).await;
        assert_eq!(search.highlighted(), Some(0));

        let pick = search.handle_key(Key::Enter).await;
        assert_eq!(pick, Some(LocationPick::Named("Linz Mitte".to_string())));
        assert!(!search.is_open());
    }
}
