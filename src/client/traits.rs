use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{BoundaryItem, City, GeocodedPlace, Histogram, RecentSearch, SearchPage, Suggestion};
use crate::search::filter::{SearchFilter, SearchInput};

/// Property search backend
/// Implemented by the HTTP client and by in-memory fakes in tests
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Fetch one page of properties
    async fn search(&self, input: &SearchInput) -> ApiResult<SearchPage>;

    /// Price distribution for `filter`; any price bounds are ignored
    async fn histogram(&self, filter: &SearchFilter) -> ApiResult<Histogram>;

    /// Number of listings matching `filter`
    async fn count(&self, filter: &SearchFilter) -> ApiResult<u64>;

    /// Get the name of the backend
    fn source_name(&self) -> &'static str;
}

/// Boundary and place data for the location picker
#[async_trait]
pub trait LocationApi: Send + Sync {
    /// One bbox per id, in request order
    async fn boundary(&self, ids: &[String]) -> ApiResult<Vec<BoundaryItem>>;

    async fn popular_locations(&self) -> ApiResult<Vec<City>>;

    async fn recent_searches(&self) -> ApiResult<Vec<RecentSearch>>;
}

/// Place typeahead service
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn suggest(&self, query: &str, session_token: &str) -> ApiResult<Vec<Suggestion>>;

    /// Resolve a picked suggestion to geometry; `None` when the service has no feature for it
    async fn retrieve(
        &self,
        suggestion: &Suggestion,
        session_token: &str,
    ) -> ApiResult<Option<GeocodedPlace>>;
}
