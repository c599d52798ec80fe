use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::filter::{SearchFilter, SearchInput};
use crate::client::SearchApi;
use crate::error::{ApiError, ApiResult};
use crate::models::{Histogram, Pagination, Property, PropertyId, SearchPage};

pub fn property(id: PropertyId) -> Property {
    serde_json::from_value(serde_json::json!({ "id": id })).unwrap()
}

pub fn page(number: u32, ids: &[PropertyId], total: u64) -> SearchPage {
    SearchPage {
        properties: ids.iter().copied().map(property).collect(),
        pagination: Pagination {
            page: number,
            page_size: 26,
            total,
            ..Pagination::default()
        },
    }
}

pub fn server_error() -> ApiError {
    ApiError::Status {
        endpoint: "/tenement/search".to_string(),
        status: StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Scripted search backend; unscripted calls return empty results.
#[derive(Default)]
pub struct FakeSearchApi {
    pages: Mutex<VecDeque<ApiResult<SearchPage>>>,
    histograms: Mutex<VecDeque<(Duration, ApiResult<Histogram>)>>,
    counts: Mutex<VecDeque<ApiResult<u64>>>,
    requests: Mutex<Vec<SearchInput>>,
    histogram_requests: Mutex<Vec<SearchFilter>>,
    count_requests: Mutex<Vec<SearchFilter>>,
}

impl FakeSearchApi {
    pub fn push_page(&self, page: SearchPage) {
        self.pages.lock().unwrap().push_back(Ok(page));
    }

    pub fn push_error(&self) {
        self.pages.lock().unwrap().push_back(Err(server_error()));
    }

    pub fn push_histogram(&self, delay: Duration, histogram: Histogram) {
        self.histograms
            .lock()
            .unwrap()
            .push_back((delay, Ok(histogram)));
    }

    pub fn push_count(&self, count: ApiResult<u64>) {
        self.counts.lock().unwrap().push_back(count);
    }

    pub fn requests(&self) -> Vec<SearchInput> {
        self.requests.lock().unwrap().clone()
    }

    pub fn histogram_requests(&self) -> Vec<SearchFilter> {
        self.histogram_requests.lock().unwrap().clone()
    }

    pub fn count_requests(&self) -> Vec<SearchFilter> {
        self.count_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchApi for FakeSearchApi {
    async fn search(&self, input: &SearchInput) -> ApiResult<SearchPage> {
        self.requests.lock().unwrap().push(input.clone());
        let next = self.pages.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(page(input.paging.page, &[], 0)))
    }

    async fn histogram(&self, filter: &SearchFilter) -> ApiResult<Histogram> {
        self.histogram_requests.lock().unwrap().push(filter.clone());
        let next = self.histograms.lock().unwrap().pop_front();
        let (delay, result) = next.unwrap_or_else(|| (Duration::ZERO, Ok(Histogram::default())));
        tokio::time::sleep(delay).await;
        result
    }

    async fn count(&self, filter: &SearchFilter) -> ApiResult<u64> {
        self.count_requests.lock().unwrap().push(filter.clone());
        let next = self.counts.lock().unwrap().pop_front();
        next.unwrap_or(Ok(0))
    }

    fn source_name(&self) -> &'static str {
        "fake"
    }
}
