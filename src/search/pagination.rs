//! Accumulating, de-duplicated pagination over the property search API.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::compose::compose;
use super::filter::{Paging, SearchFilter, SearchInput, SearchSort};
use crate::client::SearchApi;
use crate::error::{ApiError, ApiResult};
use crate::models::{Pagination, Property, PropertyId, RentBuyMode, SearchFilters, SearchPage};

pub const PAGE_SIZE: u32 = 26;

/// Identity of a query; any change resets accumulated results.
pub fn filter_key(filters: &SearchFilters, mode: RentBuyMode) -> String {
    #[derive(Serialize)]
    struct Key<'a> {
        filters: &'a SearchFilters,
        mode: RentBuyMode,
    }

    let key = Key { filters, mode };
    serde_json::to_string(&key).unwrap_or_else(|_| format!("{:?}", (filters, mode)))
}

/// Results merged across pages, keyed by property id in arrival order.
#[derive(Debug, Clone)]
pub struct PropertyAccumulator {
    key: Option<String>,
    properties: Vec<Property>,
    seen: HashSet<PropertyId>,
    total: u64,
    all_total: u64,
    current_page: u32,
    page_size: u32,
}

impl Default for PropertyAccumulator {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl PropertyAccumulator {
    pub fn new(page_size: u32) -> Self {
        Self {
            key: None,
            properties: Vec::new(),
            seen: HashSet::new(),
            total: 0,
            all_total: 0,
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Switch to `key`, clearing everything if it differs. Returns whether it did.
    pub fn reset_for(&mut self, key: &str) -> bool {
        if self.key.as_deref() == Some(key) {
            return false;
        }
        self.key = Some(key.to_string());
        self.properties.clear();
        self.seen.clear();
        self.total = 0;
        self.all_total = 0;
        self.current_page = 1;
        true
    }

    /// Merge the result for `page`. Page 1 replaces the list, later pages append
    /// properties not seen yet. Returns the number of properties added.
    pub fn apply_page(&mut self, page: u32, result: SearchPage) -> usize {
        if page <= 1 {
            self.properties.clear();
            self.seen.clear();
        }

        let before = self.properties.len();
        for property in result.properties {
            if self.seen.insert(property.id) {
                self.properties.push(property);
            }
        }

        self.total = result.pagination.total;
        self.all_total = result.pagination.all_total_count;
        self.properties.len() - before
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> u32 {
        self.total.div_ceil(u64::from(self.page_size)) as u32
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    fn advance(&mut self) {
        self.current_page += 1;
    }

    fn rewind(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.current_page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages(),
            has_next_page: self.has_next_page(),
            has_previous_page: self.current_page > 1,
            all_total_count: self.all_total,
        }
    }
}

/// A request issued by [`PropertySearch::begin_fetch`] or
/// [`PropertySearch::begin_load_more`], to be handed back to
/// [`PropertySearch::complete_fetch`] with its result.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    key: String,
    page: u32,
    advanced: bool,
    pub input: SearchInput,
}

impl FetchTicket {
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// UI-facing state of the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// No location yet; nothing is queried
    Disabled,
    Loading,
    Failed,
    Empty,
    Ready,
}

/// Snapshot of the result list for rendering
#[derive(Debug, Clone)]
pub struct SearchView {
    pub properties: Vec<Property>,
    pub pagination: Pagination,
    pub is_loading: bool,
    pub is_fetching_next_page: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    page: u32,
    advanced: bool,
}

/// Drives paged searches for the current filters and accumulates the results.
///
/// Every issued request carries a generation; only the response to the most
/// recent one is applied.
pub struct PropertySearch {
    api: Arc<dyn SearchApi>,
    accumulator: PropertyAccumulator,
    filter: SearchFilter,
    sort: SearchSort,
    enabled: bool,
    generation: u64,
    in_flight: Option<InFlight>,
    loaded: bool,
    error: Option<ApiError>,
}

impl PropertySearch {
    pub fn new(api: Arc<dyn SearchApi>) -> Self {
        Self::with_page_size(api, PAGE_SIZE)
    }

    pub fn with_page_size(api: Arc<dyn SearchApi>, page_size: u32) -> Self {
        Self {
            api,
            accumulator: PropertyAccumulator::new(page_size),
            filter: SearchFilter::default(),
            sort: SearchSort::newest_first(),
            enabled: false,
            generation: 0,
            in_flight: None,
            loaded: false,
            error: None,
        }
    }

    /// Point the search at new filters. Returns true when the query changed,
    /// in which case results, page and pending requests are dropped.
    pub fn set_query(&mut self, filters: &SearchFilters, mode: RentBuyMode) -> bool {
        let key = filter_key(filters, mode);
        if !self.accumulator.reset_for(&key) {
            return false;
        }

        self.filter = compose(filters, mode);
        self.enabled = filters.has_location();
        self.generation += 1;
        self.in_flight = None;
        self.loaded = false;
        self.error = None;
        debug!("Search query changed (enabled: {})", self.enabled);
        true
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn ticket(&mut self, advanced: bool) -> Option<FetchTicket> {
        if !self.enabled {
            return None;
        }
        let key = self.accumulator.key()?.to_string();
        let page = self.accumulator.current_page();
        // A refetch that supersedes a load-more still owns its page advance.
        let advanced = advanced || self.in_flight.is_some_and(|f| f.advanced && f.page == page);

        self.generation += 1;
        self.in_flight = Some(InFlight { page, advanced });

        Some(FetchTicket {
            generation: self.generation,
            key,
            page,
            advanced,
            input: SearchInput {
                filter: self.filter.clone(),
                sort: Some(self.sort.clone()),
                paging: Paging {
                    page,
                    page_size: self.accumulator.page_size(),
                },
            },
        })
    }

    /// Issue a request for the current page; `None` while the query is disabled.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        self.ticket(false)
    }

    /// Advance one page and issue its request. `None` when there is no next
    /// page or a request is already in flight.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        if self.in_flight.is_some() || !self.accumulator.has_next_page() {
            return None;
        }
        self.accumulator.advance();
        let ticket = self.ticket(true);
        if ticket.is_none() {
            self.accumulator.rewind();
        }
        ticket
    }

    /// Apply the response to `ticket`. Returns false if it was superseded.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: ApiResult<SearchPage>) -> bool {
        if ticket.generation != self.generation
            || self.accumulator.key() != Some(ticket.key.as_str())
        {
            debug!("Discarding stale response for page {}", ticket.page);
            return false;
        }

        self.in_flight = None;
        self.loaded = true;

        match result {
            Ok(page) => {
                let added = self.accumulator.apply_page(ticket.page, page);
                info!(
                    "Page {} added {} properties ({} of {})",
                    ticket.page,
                    added,
                    self.accumulator.properties().len(),
                    self.accumulator.total()
                );
                self.error = None;
            }
            Err(e) => {
                warn!("Search for page {} failed: {}", ticket.page, e);
                if ticket.advanced {
                    self.accumulator.rewind();
                }
                self.error = Some(e);
            }
        }
        true
    }

    async fn run(&mut self, ticket: FetchTicket) {
        let result = self.api.search(&ticket.input).await;
        self.complete_fetch(ticket, result);
    }

    /// Fetch the current page.
    pub async fn fetch(&mut self) {
        if let Some(ticket) = self.begin_fetch() {
            self.run(ticket).await;
        }
    }

    /// Fetch the next page, if there is one and nothing is in flight.
    pub async fn load_more(&mut self) {
        if let Some(ticket) = self.begin_load_more() {
            self.run(ticket).await;
        }
    }

    /// Re-issue the current page, e.g. after an error.
    pub async fn retry(&mut self) {
        self.fetch().await;
    }

    fn has_retryable_error(&self) -> bool {
        self.error.as_ref().is_some_and(ApiError::is_retryable)
    }

    /// Load up to `pages` pages from the first. A transient failure is retried
    /// once; paging stops at the last page or the first error that persists.
    pub async fn load_pages(&mut self, pages: u32) {
        self.fetch().await;
        if self.has_retryable_error() {
            warn!("Retrying first page");
            self.retry().await;
        }
        for _ in 1..pages {
            if self.error.is_some() || !self.has_next_page() {
                break;
            }
            self.load_more().await;
            if self.has_retryable_error() {
                warn!("Retrying page {}", self.accumulator.current_page() + 1);
                self.load_more().await;
            }
        }
    }

    pub fn properties(&self) -> &[Property] {
        self.accumulator.properties()
    }

    pub fn pagination(&self) -> Pagination {
        self.accumulator.pagination()
    }

    pub fn has_next_page(&self) -> bool {
        self.accumulator.has_next_page()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.in_flight, Some(InFlight { page: 1, .. })) || (self.enabled && !self.loaded)
    }

    pub fn is_fetching_next_page(&self) -> bool {
        matches!(self.in_flight, Some(InFlight { page, .. }) if page > 1)
    }

    pub fn status(&self) -> SearchStatus {
        if !self.enabled {
            return SearchStatus::Disabled;
        }
        if !self.properties().is_empty() {
            return SearchStatus::Ready;
        }
        if self.error.is_some() {
            SearchStatus::Failed
        } else if self.is_loading() {
            SearchStatus::Loading
        } else {
            SearchStatus::Empty
        }
    }

    pub fn view(&self) -> SearchView {
        SearchView {
            properties: self.properties().to_vec(),
            pagination: self.pagination(),
            is_loading: self.is_loading(),
            is_fetching_next_page: self.is_fetching_next_page(),
            error: self.error.as_ref().map(ToString::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocationFilter;
    use crate::search::testing::{page, property, server_error, FakeSearchApi};
    use rstest::rstest;

    fn vienna() -> SearchFilters {
        SearchFilters {
            location: "Vienna".to_string(),
            ..SearchFilters::default()
        }
    }

    fn search_with(api: &Arc<FakeSearchApi>) -> PropertySearch {
        let mut search = PropertySearch::new(api.clone());
        search.set_query(&vienna(), RentBuyMode::Rent);
        search
    }

    #[rstest]
    #[case(1, true)]
    #[case(2, true)]
    #[case(3, false)]
    fn next_page_from_total(#[case] current: u32, #[case] expected: bool) {
        let mut accumulator = PropertyAccumulator::default();
        accumulator.reset_for("k");
        accumulator.apply_page(1, page(1, &[1], 57));
        for _ in 1..current {
            accumulator.advance();
        }
        assert_eq!(accumulator.total_pages(), 3);
        assert_eq!(accumulator.has_next_page(), expected);
    }

    #[test]
    fn repeated_page_is_idempotent() {
        let mut accumulator = PropertyAccumulator::default();
        accumulator.reset_for("k");
        accumulator.apply_page(1, page(1, &[1, 2, 3], 6));
        assert_eq!(accumulator.apply_page(2, page(2, &[3, 4, 5], 6)), 2);
        assert_eq!(accumulator.apply_page(2, page(2, &[3, 4, 5], 6)), 0);

        let ids: Vec<_> = accumulator.properties().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn first_page_replaces() {
        let mut accumulator = PropertyAccumulator::default();
        accumulator.reset_for("k");
        accumulator.apply_page(1, page(1, &[1, 2], 4));
        accumulator.apply_page(2, page(2, &[3, 4], 4));
        accumulator.apply_page(1, page(1, &[9], 1));
        assert_eq!(accumulator.properties(), &[property(9)]);
    }

    #[test]
    fn filter_key_tracks_mode() {
        let filters = vienna();
        assert_ne!(
            filter_key(&filters, RentBuyMode::Rent),
            filter_key(&filters, RentBuyMode::Buy)
        );
        assert_eq!(
            filter_key(&filters, RentBuyMode::Rent),
            filter_key(&filters.clone(), RentBuyMode::Rent)
        );
    }

    #[tokio::test]
    async fn disabled_without_location() {
        let api = Arc::new(FakeSearchApi::default());
        let mut search = PropertySearch::new(api.clone());
        search.set_query(&SearchFilters::default(), RentBuyMode::Rent);

        search.fetch().await;
        assert_eq!(search.status(), SearchStatus::Disabled);
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn bbox_alone_enables_query() {
        let api = Arc::new(FakeSearchApi::default());
        api.push_page(page(1, &[1], 1));
        let mut search = PropertySearch::new(api.clone());
        let filters = SearchFilters {
            location_data: Some(LocationFilter::with_bbox(
                "",
                crate::utils::DEFAULT_VIENNA_BBOX,
                None,
            )),
            ..SearchFilters::default()
        };
        search.set_query(&filters, RentBuyMode::Buy);
        search.fetch().await;
        assert_eq!(search.status(), SearchStatus::Ready);
    }

    #[tokio::test]
    async fn accumulates_pages_and_stops_at_last() {
        let api = Arc::new(FakeSearchApi::default());
        api.push_page(page(1, &[1, 2], 57));
        api.push_page(page(2, &[2, 3], 57));
        api.push_page(page(3, &[4], 57));
        let mut search = search_with(&api);

        search.fetch().await;
        search.load_more().await;
        assert!(search.has_next_page());
        search.load_more().await;
        assert!(!search.has_next_page());
        search.load_more().await;

        let ids: Vec<_> = search.properties().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        let pages: Vec<_> = api.requests().iter().map(|r| r.paging.page).collect();
        assert_eq!(pages, vec![1, 2, 3]);
        assert_eq!(api.requests()[0].paging.page_size, PAGE_SIZE);
    }

    #[tokio::test]
    async fn filter_change_resets_results() {
        let api = Arc::new(FakeSearchApi::default());
        api.push_page(page(1, &[1, 2], 57));
        api.push_page(page(2, &[3], 57));
        let mut search = search_with(&api);
        search.fetch().await;
        search.load_more().await;
        assert_eq!(search.pagination().page, 2);

        let graz = SearchFilters {
            location: "Graz".to_string(),
            ..SearchFilters::default()
        };
        assert!(search.set_query(&graz, RentBuyMode::Rent));
        assert!(search.properties().is_empty());
        assert_eq!(search.pagination().page, 1);
        assert_eq!(search.pagination().total, 0);
        assert!(!search.set_query(&graz, RentBuyMode::Rent));
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let api = Arc::new(FakeSearchApi::default());
        let mut search = search_with(&api);

        let stale = search.begin_fetch().unwrap();
        search.set_query(
            &SearchFilters {
                location: "Linz".to_string(),
                ..SearchFilters::default()
            },
            RentBuyMode::Rent,
        );
        let fresh = search.begin_fetch().unwrap();

        assert!(!search.complete_fetch(stale, Ok(page(1, &[1], 1))));
        assert!(search.properties().is_empty());
        assert!(search.complete_fetch(fresh, Ok(page(1, &[7], 1))));
        assert_eq!(search.properties(), &[property(7)]);
    }

    #[tokio::test]
    async fn failed_load_more_retries_same_page() {
        let api = Arc::new(FakeSearchApi::default());
        api.push_page(page(1, &[1], 57));
        api.push_error();
        api.push_page(page(2, &[2], 57));
        let mut search = search_with(&api);

        search.fetch().await;
        search.load_more().await;
        assert!(search.error().is_some());
        assert_eq!(search.properties().len(), 1);
        assert_eq!(search.status(), SearchStatus::Ready);
        assert_eq!(search.pagination().page, 1);

        search.load_more().await;
        assert!(search.error().is_none());
        let pages: Vec<_> = api.requests().iter().map(|r| r.paging.page).collect();
        assert_eq!(pages, vec![1, 2, 2]);
    }

    #[tokio::test]
    async fn load_more_waits_for_in_flight_request() {
        let api = Arc::new(FakeSearchApi::default());
        let mut search = search_with(&api);
        let first = search.begin_fetch().unwrap();
        search.complete_fetch(first, Ok(page(1, &[1], 57)));

        let next = search.begin_load_more().unwrap();
        assert_eq!(next.page(), 2);
        assert!(search.is_fetching_next_page());
        assert!(search.begin_load_more().is_none());
    }

    #[tokio::test]
    async fn failed_refetch_during_load_more_rewinds_page() {
        let api = Arc::new(FakeSearchApi::default());
        let mut search = search_with(&api);
        let first = search.begin_fetch().unwrap();
        search.complete_fetch(first, Ok(page(1, &[1], 57)));

        let superseded = search.begin_load_more().unwrap();
        let refetch = search.begin_fetch().unwrap();
        assert_eq!(refetch.page(), 2);
        assert!(search.complete_fetch(refetch, Err(server_error())));
        assert!(!search.complete_fetch(superseded, Ok(page(2, &[2], 57))));
        assert_eq!(search.pagination().page, 1);

        let again = search.begin_load_more().unwrap();
        assert_eq!(again.page(), 2);
    }

    #[tokio::test]
    async fn load_pages_retries_transient_failure_once() {
        let api = Arc::new(FakeSearchApi::default());
        api.push_page(page(1, &[1], 57));
        api.push_error();
        api.push_page(page(2, &[2], 57));
        api.push_page(page(3, &[3], 57));
        let mut search = search_with(&api);

        search.load_pages(3).await;

        assert!(search.error().is_none());
        assert_eq!(search.properties().len(), 3);
        let pages: Vec<_> = api.requests().iter().map(|r| r.paging.page).collect();
        assert_eq!(pages, vec![1, 2, 2, 3]);
    }

    #[tokio::test]
    async fn load_pages_stops_on_persistent_failure() {
        let api = Arc::new(FakeSearchApi::default());
        api.push_page(page(1, &[1], 57));
        api.push_error();
        api.push_error();
        let mut search = search_with(&api);

        search.load_pages(3).await;

        assert!(search.error().is_some());
        assert_eq!(search.pagination().page, 1);
        let pages: Vec<_> = api.requests().iter().map(|r| r.paging.page).collect();
        assert_eq!(pages, vec![1, 2, 2]);
    }

    #[tokio::test]
    async fn status_reflects_outcome() {
        let api = Arc::new(FakeSearchApi::default());
        api.push_error();
        api.push_page(page(1, &[], 0));
        let mut search = search_with(&api);
        assert_eq!(search.status(), SearchStatus::Loading);

        search.fetch().await;
        assert_eq!(search.status(), SearchStatus::Failed);
        assert!(search.view().error.is_some());

        search.retry().await;
        assert_eq!(search.status(), SearchStatus::Empty);
        assert!(!search.view().is_loading);
    }
}
