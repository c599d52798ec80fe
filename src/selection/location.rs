use tracing::debug;

use crate::models::{BBox, LngLat, LocationFilter, RecentSearch};
use crate::store::SearchStore;
use crate::utils::location::{
    bbox_for_location, center_for_location, DEFAULT_VIENNA_BBOX, RECENT_SEARCH_OFFSET,
    VIENNA_CENTER,
};

/// Commits place picks to the store's location pair.
#[derive(Debug, Clone)]
pub struct LocationSelection {
    store: SearchStore,
}

impl LocationSelection {
    pub fn new(store: SearchStore) -> Self {
        Self { store }
    }

    /// Pick a place by name. Known cities get their static bbox; anything else
    /// is kept as a plain name and matched by city on the backend.
    pub fn select_location(&self, name: &str) {
        match bbox_for_location(name) {
            Some(bbox) => {
                let center = center_for_location(name);
                self.store
                    .set_location(name, Some(LocationFilter::with_bbox(name, bbox, center)));
            }
            None => {
                debug!("No static bbox for '{}'", name);
                self.store.set_location(name, None);
            }
        }
    }

    pub fn select_location_with_bbox(&self, name: &str, bbox: BBox, center: Option<LngLat>) {
        self.store
            .set_location(name, Some(LocationFilter::with_bbox(name, bbox, center)));
    }

    pub fn select_default_vienna(&self) {
        self.select_location_with_bbox("Vienna", DEFAULT_VIENNA_BBOX, Some(VIENNA_CENTER));
    }

    /// Re-run a recent search around its point and close the popover.
    pub fn select_recent_search(&self, search: &RecentSearch) {
        let point = search.point();
        self.select_location_with_bbox(
            &search.name,
            BBox::around(point, RECENT_SEARCH_OFFSET),
            Some(point),
        );
        self.store.close_dropdown();
    }
}
