//! City and district picking. A full selection collapses to the city id; a
//! partial one filters on the district ids with their union bbox.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::client::LocationApi;
use crate::error::ApiResult;
use crate::models::{BBox, BoundaryItem, City, LocationFilter};
use crate::store::SearchStore;

#[derive(Debug, Default)]
struct DistrictState {
    city: Option<City>,
    selected_ids: Vec<String>,
    /// Bumped on every committed change; older boundary lookups are ignored.
    generation: u64,
    pending: usize,
}

fn lock(state: &Mutex<DistrictState>) -> MutexGuard<'_, DistrictState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Counts a boundary lookup as in flight until dropped, including when the
/// lookup future is cancelled mid-request.
struct PendingLookup<'a> {
    state: &'a Mutex<DistrictState>,
}

impl<'a> PendingLookup<'a> {
    fn start(state: &'a Mutex<DistrictState>) -> Self {
        lock(state).pending += 1;
        Self { state }
    }
}

impl Drop for PendingLookup<'_> {
    fn drop(&mut self) {
        lock(self.state).pending -= 1;
    }
}

/// Display name for a partial district selection.
pub fn districts_label(city_name: &str, count: usize) -> String {
    let noun = if count == 1 { "district" } else { "districts" };
    format!("{} ({} {})", city_name, count, noun)
}

pub struct DistrictSelection {
    store: SearchStore,
    api: Arc<dyn LocationApi>,
    state: Mutex<DistrictState>,
}

impl DistrictSelection {
    pub fn new(store: SearchStore, api: Arc<dyn LocationApi>) -> Self {
        Self {
            store,
            api,
            state: Mutex::new(DistrictState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, DistrictState> {
        lock(&self.state)
    }

    pub fn selected_city(&self) -> Option<City> {
        self.state().city.clone()
    }

    pub fn selected_district_ids(&self) -> Vec<String> {
        self.state().selected_ids.clone()
    }

    /// True while a boundary lookup is in flight.
    pub fn is_loading(&self) -> bool {
        self.state().pending > 0
    }

    /// Open `city` with every district selected and filter on the whole city.
    pub async fn click_city(&self, city: &City) {
        let generation = {
            let mut state = self.state();
            state.city = Some(city.clone());
            state.selected_ids = city.district_ids();
            state.generation += 1;
            state.generation
        };
        self.apply_city(city, generation).await;
    }

    /// Leave the district list. The committed filter is kept.
    pub fn back(&self) {
        let mut state = self.state();
        state.city = None;
        state.selected_ids.clear();
        state.generation += 1;
    }

    pub async fn toggle_district(&self, district_id: &str) {
        let Some((city, selected, generation)) = self.update_selection(|city, selected| {
            if let Some(index) = selected.iter().position(|id| id == district_id) {
                selected.remove(index);
            } else if city.children.iter().any(|d| d.id == district_id) {
                selected.push(district_id.to_string());
            }
        }) else {
            return;
        };

        self.apply_selection(&city, selected, generation).await;
    }

    /// Select every district, or clear the selection if all are selected.
    pub async fn toggle_select_all(&self) {
        let Some((city, selected, generation)) = self.update_selection(|city, selected| {
            if selected.len() == city.children.len() {
                selected.clear();
            } else {
                *selected = city.district_ids();
            }
        }) else {
            return;
        };

        self.apply_selection(&city, selected, generation).await;
    }

    fn update_selection(
        &self,
        change: impl FnOnce(&City, &mut Vec<String>),
    ) -> Option<(City, Vec<String>, u64)> {
        let mut state = self.state();
        let city = state.city.clone()?;
        let before = state.selected_ids.clone();
        change(&city, &mut state.selected_ids);
        if state.selected_ids == before {
            return None;
        }
        state.generation += 1;
        Some((city, state.selected_ids.clone(), state.generation))
    }

    async fn apply_selection(&self, city: &City, selected: Vec<String>, generation: u64) {
        if selected.is_empty() {
            debug!("No districts selected, clearing location");
            self.store.clear_location();
        } else if selected.len() == city.children.len() {
            self.apply_city(city, generation).await;
        } else {
            self.apply_districts(city, selected, generation).await;
        }
    }

    async fn lookup(&self, ids: &[String], generation: u64) -> Option<ApiResult<Vec<BoundaryItem>>> {
        let pending = PendingLookup::start(&self.state);
        let result = self.api.boundary(ids).await;
        drop(pending);

        if self.state().generation != generation {
            debug!("Ignoring boundary for superseded selection");
            return None;
        }
        Some(result)
    }

    async fn apply_city(&self, city: &City, generation: u64) {
        let ids = vec![city.id.clone()];
        let bbox = match self.lookup(&ids, generation).await {
            Some(Ok(items)) => items.first().map(|item| item.bbox),
            Some(Err(e)) => {
                warn!("Failed to fetch city boundary for {}: {}", city.name, e);
                return;
            }
            None => return,
        };

        match bbox {
            Some(bbox) => self
                .store
                .set_location(city.name.clone(), Some(LocationFilter::within(&city.name, ids, bbox))),
            None => warn!("No boundary returned for {}", city.name),
        }
    }

    async fn apply_districts(&self, city: &City, ids: Vec<String>, generation: u64) {
        let items = match self.lookup(&ids, generation).await {
            Some(Ok(items)) => items,
            Some(Err(e)) => {
                warn!("Failed to fetch district boundaries: {}", e);
                return;
            }
            None => return,
        };

        let Some(bbox) = BBox::union_all(items.iter().map(|item| &item.bbox)) else {
            warn!("No boundaries returned for {} districts", ids.len());
            return;
        };

        let name = districts_label(&city.name, ids.len());
        self.store
            .set_location(name.clone(), Some(LocationFilter::within(name, ids, bbox)));
    }
}
