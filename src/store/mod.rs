//! Shared search state: filters plus transient UI mode.
//!
//! `SearchState` is plain data changed only through [`SearchAction`]s.
//! [`SearchStore`] is the cloneable handle components share; every change is
//! published on a `tokio::sync::watch` channel.

pub mod mode;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::models::{
    Histogram, LocationFilter, PriceRangeFilter, PropertyTypeFilter, SearchFilters,
};

pub use mode::ModeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopoverId {
    Location,
    Category,
    Price,
}

impl PopoverId {
    pub const ALL: [PopoverId; 3] = [PopoverId::Location, PopoverId::Category, PopoverId::Price];
}

/// Layout used on small viewports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Map,
}

/// Replacement of a single filter key; other keys are preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterUpdate {
    Location(String),
    LocationData(Option<LocationFilter>),
    PropertyType(Option<PropertyTypeFilter>),
    PriceRange(Option<PriceRangeFilter>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchAction {
    SetFilters(SearchFilters),
    UpdateFilter(FilterUpdate),
    ResetFilters,
    TogglePopover(PopoverId),
    CloseDropdown,
    ExitSearchMode,
    SetViewMode(ViewMode),
    OpenMobileSearch,
    CloseMobileSearch,
    SetSelectedCategory {
        category_id: Option<String>,
        subcategories: Vec<String>,
    },
    SetHistogram(Option<Histogram>),
    SetHistogramLoading(bool),
    SetSearching(bool),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub filters: SearchFilters,
    pub open_popover: Option<PopoverId>,
    /// Expanded search bar with backdrop; may be active with no popover open.
    pub is_in_search_mode: bool,
    pub view_mode: ViewMode,
    pub is_mobile_search_open: bool,
    /// In-progress category pick, kept apart from `filters.property_type`.
    pub selected_category_id: Option<String>,
    pub selected_subcategories: Vec<String>,
    pub histogram: Option<Histogram>,
    pub histogram_loading: bool,
    pub is_searching: bool,
}

impl SearchState {
    /// Apply `action`; returns whether anything changed.
    pub fn apply(&mut self, action: SearchAction) -> bool {
        let before = self.clone();
        self.reduce(action);
        *self != before
    }

    fn reduce(&mut self, action: SearchAction) {
        match action {
            SearchAction::SetFilters(filters) => self.filters = filters,
            SearchAction::UpdateFilter(update) => match update {
                FilterUpdate::Location(location) => self.filters.location = location,
                FilterUpdate::LocationData(data) => self.filters.location_data = data,
                FilterUpdate::PropertyType(property_type) => {
                    self.filters.property_type = property_type
                }
                FilterUpdate::PriceRange(price_range) => self.filters.price_range = price_range,
            },
            SearchAction::ResetFilters => self.filters = SearchFilters::default(),
            SearchAction::TogglePopover(id) => {
                if self.open_popover == Some(id) {
                    self.open_popover = None;
                    self.is_in_search_mode = false;
                } else {
                    self.open_popover = Some(id);
                    self.is_in_search_mode = true;
                }
            }
            SearchAction::CloseDropdown => self.open_popover = None,
            SearchAction::ExitSearchMode => {
                self.open_popover = None;
                self.is_in_search_mode = false;
            }
            SearchAction::SetViewMode(mode) => self.view_mode = mode,
            SearchAction::OpenMobileSearch => self.is_mobile_search_open = true,
            SearchAction::CloseMobileSearch => self.is_mobile_search_open = false,
            SearchAction::SetSelectedCategory {
                category_id,
                subcategories,
            } => {
                self.selected_category_id = category_id;
                self.selected_subcategories = subcategories;
            }
            SearchAction::SetHistogram(histogram) => self.histogram = histogram,
            SearchAction::SetHistogramLoading(loading) => self.histogram_loading = loading,
            SearchAction::SetSearching(searching) => self.is_searching = searching,
        }
    }

    pub fn is_open(&self, id: PopoverId) -> bool {
        self.open_popover == Some(id)
    }

    pub fn is_any_popover_open(&self) -> bool {
        PopoverId::ALL.iter().any(|id| self.is_open(*id))
    }

    /// The backdrop overlay is shown exactly while search mode is active.
    pub fn is_backdrop_visible(&self) -> bool {
        self.is_in_search_mode
    }
}

/// Cloneable handle to one search state instance
#[derive(Debug, Clone)]
pub struct SearchStore {
    inner: Arc<watch::Sender<SearchState>>,
}

impl Default for SearchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchStore {
    pub fn new() -> Self {
        Self::with_state(SearchState::default())
    }

    pub fn with_state(state: SearchState) -> Self {
        let (sender, _) = watch::channel(state);
        Self {
            inner: Arc::new(sender),
        }
    }

    /// Apply an action; subscribers are only woken when the state changed.
    pub fn dispatch(&self, action: SearchAction) -> bool {
        debug!(?action, "search store dispatch");
        self.inner.send_if_modified(|state| state.apply(action))
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.subscribe()
    }

    /// Read the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&SearchState) -> R) -> R {
        let state = self.inner.borrow();
        f(&*state)
    }

    pub fn snapshot(&self) -> SearchState {
        self.inner.borrow().clone()
    }

    pub fn filters(&self) -> SearchFilters {
        self.read(|state| state.filters.clone())
    }

    pub fn set_filters(&self, filters: SearchFilters) {
        self.dispatch(SearchAction::SetFilters(filters));
    }

    /// Replace only the location pair, keeping category and price.
    pub fn set_location(&self, location: impl Into<String>, data: Option<LocationFilter>) {
        let mut filters = self.filters();
        filters.location = location.into();
        filters.location_data = data;
        self.set_filters(filters);
    }

    pub fn clear_location(&self) {
        self.set_location(String::new(), None);
    }

    pub fn update_filter(&self, update: FilterUpdate) {
        self.dispatch(SearchAction::UpdateFilter(update));
    }

    pub fn reset_filters(&self) {
        self.dispatch(SearchAction::ResetFilters);
    }

    pub fn toggle(&self, id: PopoverId) {
        self.dispatch(SearchAction::TogglePopover(id));
    }

    pub fn close_dropdown(&self) {
        self.dispatch(SearchAction::CloseDropdown);
    }

    pub fn exit_search_mode(&self) {
        self.dispatch(SearchAction::ExitSearchMode);
    }

    pub fn is_open(&self, id: PopoverId) -> bool {
        self.read(|state| state.is_open(id))
    }

    pub fn is_any_popover_open(&self) -> bool {
        self.read(SearchState::is_any_popover_open)
    }

    pub fn is_backdrop_visible(&self) -> bool {
        self.read(SearchState::is_backdrop_visible)
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.dispatch(SearchAction::SetViewMode(mode));
    }

    pub fn open_mobile_search(&self) {
        self.dispatch(SearchAction::OpenMobileSearch);
    }

    pub fn close_mobile_search(&self) {
        self.dispatch(SearchAction::CloseMobileSearch);
    }

    pub fn set_selected_category(&self, category_id: Option<String>, subcategories: Vec<String>) {
        self.dispatch(SearchAction::SetSelectedCategory {
            category_id,
            subcategories,
        });
    }

    pub fn set_histogram(&self, histogram: Option<Histogram>) {
        self.dispatch(SearchAction::SetHistogram(histogram));
    }

    pub fn set_histogram_loading(&self, loading: bool) {
        self.dispatch(SearchAction::SetHistogramLoading(loading));
    }

    pub fn set_searching(&self, searching: bool) {
        self.dispatch(SearchAction::SetSearching(searching));
    }
}
