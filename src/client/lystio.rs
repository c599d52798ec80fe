use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::traits::{LocationApi, SearchApi};
use super::wire::{api_filter, api_request, ApiSearchResponse, BoundaryRequest};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    BoundaryItem, City, CountResponse, Histogram, PopularLocation, RecentSearch, SearchPage,
};
use crate::search::filter::{SearchFilter, SearchInput};

pub const DEFAULT_API_URL: &str = "https://api.lystio.co";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("estate-scout/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the marketplace search and geo endpoints
#[derive(Debug, Clone)]
pub struct LystioClient {
    client: Client,
    base_url: String,
}

impl LystioClient {
    /// Create a client against the production API
    pub fn new() -> ApiResult<Self> {
        Self::with_base_url(DEFAULT_API_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client against a custom base url, e.g. a staging host or a mock server
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::transport("client builder", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", path);
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::transport(path, e))?;
        Self::decode(path, response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::transport(path, e))?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        if !status.is_success() {
            warn!("{} returned {}", path, status);
            return Err(ApiError::Status {
                endpoint: path.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(path, e))?;
        serde_json::from_slice(&body).map_err(|e| ApiError::decode(path, e))
    }
}

/// Check a boundary response against the ids it was requested for.
pub fn validate_boundaries(ids: &[String], items: &[BoundaryItem]) -> ApiResult<()> {
    if items.len() != ids.len() {
        return Err(ApiError::Validation(format!(
            "expected {} boundaries, got {}",
            ids.len(),
            items.len()
        )));
    }
    for (id, item) in ids.iter().zip(items) {
        item.bbox
            .validate()
            .map_err(|reason| ApiError::Validation(format!("boundary {}: {}", id, reason)))?;
    }
    Ok(())
}

#[async_trait]
impl SearchApi for LystioClient {
    async fn search(&self, input: &SearchInput) -> ApiResult<SearchPage> {
        let request = api_request(&input.filter, input.sort.as_ref(), input.paging);
        let response: ApiSearchResponse = self.post_json("/tenement/search", &request).await?;
        let page = SearchPage::from(response);

        info!(
            "Fetched page {}/{} ({} properties, {} total)",
            page.pagination.page,
            page.pagination.total_pages,
            page.properties.len(),
            page.pagination.total
        );
        Ok(page)
    }

    async fn histogram(&self, filter: &SearchFilter) -> ApiResult<Histogram> {
        let body = api_filter(&filter.without_price());
        self.post_json("/tenement/search/histogram", &body).await
    }

    async fn count(&self, filter: &SearchFilter) -> ApiResult<u64> {
        let body = api_filter(filter);
        let response: CountResponse = self.post_json("/tenement/search/count", &body).await?;
        Ok(response.count)
    }

    fn source_name(&self) -> &'static str {
        "Lystio"
    }
}

#[async_trait]
impl LocationApi for LystioClient {
    async fn boundary(&self, ids: &[String]) -> ApiResult<Vec<BoundaryItem>> {
        if ids.is_empty() {
            return Err(ApiError::Validation("boundary lookup needs at least one id".into()));
        }

        let items: Vec<BoundaryItem> = self
            .post_json("/geo/boundary", &BoundaryRequest { ids })
            .await?;
        validate_boundaries(ids, &items)?;
        debug!("Resolved {} boundaries", items.len());
        Ok(items)
    }

    async fn popular_locations(&self) -> ApiResult<Vec<City>> {
        let locations: Vec<PopularLocation> = self.get_json("/geo/boundary/popular").await?;
        info!("Loaded {} popular locations", locations.len());
        Ok(locations.into_iter().map(City::from).collect())
    }

    async fn recent_searches(&self) -> ApiResult<Vec<RecentSearch>> {
        self.get_json("/geo/search/recent").await
    }
}
