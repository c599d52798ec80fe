//! Price histogram and listing count for the current filters.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use super::compose::{compose, histogram_filter};
use super::filter::SearchFilter;
use crate::client::SearchApi;
use crate::error::ApiResult;
use crate::models::{Histogram, RentBuyMode, SearchFilters};
use crate::store::SearchStore;

#[derive(Debug, Default)]
struct Slot<T> {
    /// Key of the latest request
    requested: Option<String>,
    /// Key the cached value was computed for
    loaded: Option<String>,
    generation: u64,
    value: Option<T>,
}

impl<T: Clone> Slot<T> {
    /// Register a request for `key`; `None` when the cached value already covers it.
    fn begin(&mut self, key: &str) -> Option<u64> {
        if self.loaded.as_deref() == Some(key) && self.requested.as_deref() == Some(key) {
            return None;
        }
        self.requested = Some(key.to_string());
        self.generation += 1;
        Some(self.generation)
    }

    fn complete(&mut self, generation: u64, value: T) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loaded = self.requested.clone();
        self.value = Some(value);
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}

#[derive(Debug, Default)]
struct FacetState {
    histogram: Slot<Histogram>,
    count: Slot<u64>,
}

/// Keeps the price histogram and the listing count in step with the filters.
///
/// Requests may overlap; a response is only applied if no newer request was
/// issued for the same facet in the meantime.
pub struct FacetQueries {
    api: Arc<dyn SearchApi>,
    store: SearchStore,
    state: Mutex<FacetState>,
}

fn key_of(filter: &SearchFilter) -> String {
    serde_json::to_string(filter).unwrap_or_else(|_| format!("{:?}", filter))
}

impl FacetQueries {
    pub fn new(api: Arc<dyn SearchApi>, store: SearchStore) -> Self {
        Self {
            api,
            store,
            state: Mutex::new(FacetState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FacetState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch the price distribution for `filters` (price bounds ignored) and
    /// publish it to the store. Returns whether the store was updated.
    pub async fn refresh_histogram(
        &self,
        filters: &SearchFilters,
        mode: RentBuyMode,
    ) -> ApiResult<bool> {
        let filter = histogram_filter(filters, mode);
        let Some(generation) = self.state().histogram.begin(&key_of(&filter)) else {
            debug!("Histogram already current");
            return Ok(false);
        };

        self.store.set_histogram_loading(true);
        let result = self.api.histogram(&filter).await;

        if !self.state().histogram.is_current(generation) {
            debug!("Discarding stale histogram");
            return Ok(false);
        }
        self.store.set_histogram_loading(false);

        match result {
            Ok(histogram) => {
                self.state().histogram.complete(generation, histogram.clone());
                self.store.set_histogram(Some(histogram));
                Ok(true)
            }
            Err(e) => {
                warn!("Failed to fetch histogram: {}", e);
                Err(e)
            }
        }
    }

    /// Fetch the number of listings matching `filters`.
    pub async fn refresh_count(&self, filters: &SearchFilters, mode: RentBuyMode) -> ApiResult<u64> {
        let filter = compose(filters, mode);
        let Some(generation) = self.state().count.begin(&key_of(&filter)) else {
            return Ok(self.count());
        };

        let count = self.api.count(&filter).await.map_err(|e| {
            warn!("Failed to fetch count: {}", e);
            e
        })?;

        if self.state().count.complete(generation, count) {
            Ok(count)
        } else {
            debug!("Discarding stale count");
            Ok(self.count())
        }
    }

    /// Last applied count, 0 before the first response.
    pub fn count(&self) -> u64 {
        self.state().count.value.unwrap_or(0)
    }

    pub fn histogram(&self) -> Option<Histogram> {
        self.state().histogram.value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceRangeFilter;
    use crate::search::testing::FakeSearchApi;
    use std::time::Duration;

    fn filters(location: &str) -> SearchFilters {
        SearchFilters {
            location: location.to_string(),
            price_range: Some(PriceRangeFilter::eur(500.0, 1500.0)),
            ..SearchFilters::default()
        }
    }

    fn histogram(bars: &[u64]) -> Histogram {
        Histogram {
            range: (Some(400.0), Some(4000.0)),
            histogram: bars.to_vec(),
        }
    }

    #[tokio::test]
    async fn histogram_ignores_price_and_updates_store() {
        let api = Arc::new(FakeSearchApi::default());
        api.push_histogram(Duration::ZERO, histogram(&[1, 2, 3]));
        let store = SearchStore::new();
        let facets = FacetQueries::new(api.clone(), store.clone());

        assert!(facets
            .refresh_histogram(&filters("Vienna"), RentBuyMode::Rent)
            .await
            .unwrap());

        let request = &api.histogram_requests()[0];
        assert!(request.rent_min.is_none() && request.rent_max.is_none());
        let state = store.snapshot();
        assert_eq!(state.histogram, Some(histogram(&[1, 2, 3])));
        assert!(!state.histogram_loading);
    }

    #[tokio::test]
    async fn price_change_alone_does_not_refetch_histogram() {
        let api = Arc::new(FakeSearchApi::default());
        let facets = FacetQueries::new(api.clone(), SearchStore::new());

        facets
            .refresh_histogram(&filters("Vienna"), RentBuyMode::Rent)
            .await
            .unwrap();
        let mut cheaper = filters("Vienna");
        cheaper.price_range = Some(PriceRangeFilter::eur(400.0, 900.0));
        let refreshed = facets
            .refresh_histogram(&cheaper, RentBuyMode::Rent)
            .await
            .unwrap();

        assert!(!refreshed);
        assert_eq!(api.histogram_requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_histogram_is_superseded() {
        let api = Arc::new(FakeSearchApi::default());
        api.push_histogram(Duration::from_millis(500), histogram(&[9]));
        api.push_histogram(Duration::from_millis(10), histogram(&[1]));
        let store = SearchStore::new();
        let facets = FacetQueries::new(api.clone(), store.clone());

        let vienna = filters("Vienna");
        let graz = filters("Graz");
        let (slow, fast) = tokio::join!(
            facets.refresh_histogram(&vienna, RentBuyMode::Rent),
            facets.refresh_histogram(&graz, RentBuyMode::Rent),
        );

        assert!(!slow.unwrap());
        assert!(fast.unwrap());
        assert_eq!(store.snapshot().histogram, Some(histogram(&[1])));
    }

    #[tokio::test]
    async fn count_uses_full_filter() {
        let api = Arc::new(FakeSearchApi::default());
        api.push_count(Ok(42));
        let facets = FacetQueries::new(api.clone(), SearchStore::new());

        let count = facets
            .refresh_count(&filters("Vienna"), RentBuyMode::Buy)
            .await
            .unwrap();

        assert_eq!(count, 42);
        assert_eq!(facets.count(), 42);
        assert_eq!(api.count_requests()[0].rent_min, Some(500.0));
    }

    #[tokio::test]
    async fn failed_count_keeps_previous_value() {
        let api = Arc::new(FakeSearchApi::default());
        api.push_count(Ok(7));
        api.push_count(Err(crate::search::testing::server_error()));
        let facets = FacetQueries::new(api.clone(), SearchStore::new());

        facets
            .refresh_count(&filters("Vienna"), RentBuyMode::Rent)
            .await
            .unwrap();
        assert!(facets
            .refresh_count(&filters("Graz"), RentBuyMode::Rent)
            .await
            .is_err());
        assert_eq!(facets.count(), 7);
    }
}
