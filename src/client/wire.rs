//! Request and response shapes of the upstream marketplace API.

use serde::{Deserialize, Serialize};

use crate::models::{BBox, Pagination, Property, RentBuyMode, SearchPage};
use crate::search::filter::{Paging, SearchFilter, SearchSort, SortOrder};

const RENT_UPPER: f64 = 999_999_999.0;
const SIZE_UPPER: f64 = 999_999.0;
const COUNT_UPPER: f64 = 99.0;

type Range = (Option<f64>, Option<f64>);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFilter {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_type: Option<Vec<RentBuyMode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms_bed: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms_bath: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub within_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_price_on_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_now: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cellar: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Every key is sent; unset keys go out as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSort {
    pub rent: Option<SortOrder>,
    pub rent_per: Option<SortOrder>,
    pub distance: Option<SortOrder>,
    pub size: Option<SortOrder>,
    pub rooms: Option<SortOrder>,
    pub created_at: Option<SortOrder>,
    pub count_leads: Option<SortOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub filter: ApiFilter,
    pub sort: ApiSort,
    pub paging: Paging,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPaging {
    pub page_count: u32,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    #[serde(default)]
    pub all_total_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSearchResponse {
    pub res: Vec<Property>,
    pub paging: ApiPaging,
}

impl From<ApiSearchResponse> for SearchPage {
    fn from(response: ApiSearchResponse) -> Self {
        let paging = response.paging;
        SearchPage {
            properties: response.res,
            pagination: Pagination {
                page: paging.page,
                page_size: paging.page_size,
                total: paging.total_count,
                total_pages: paging.page_count,
                has_next_page: paging.page < paging.page_count,
                has_previous_page: paging.page > 1,
                all_total_count: paging.all_total_count,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoundaryRequest<'a> {
    pub ids: &'a [String],
}

fn range(min: Option<f64>, max: Option<f64>, upper: f64) -> Option<Range> {
    if min.is_none() && max.is_none() {
        return None;
    }
    Some((Some(min.unwrap_or(0.0)), Some(max.unwrap_or(upper))))
}

fn non_empty<T: Clone>(values: &Option<Vec<T>>) -> Option<Vec<T>> {
    values.as_ref().filter(|values| !values.is_empty()).cloned()
}

/// Map the client-facing filter onto the upstream filter.
///
/// Open-ended ranges get sentinel bounds. A city name without geometry is
/// sent as free-text search unless an explicit query is present.
pub fn api_filter(filter: &SearchFilter) -> ApiFilter {
    ApiFilter {
        status: "active".to_string(),
        r#type: non_empty(&filter.r#type),
        sub_type: non_empty(&filter.sub_type),
        rent_type: non_empty(&filter.rent_type),
        condition: non_empty(&filter.condition),
        rent: range(filter.rent_min, filter.rent_max, RENT_UPPER),
        size: range(filter.size_min, filter.size_max, SIZE_UPPER),
        rooms: range(filter.rooms_min, filter.rooms_max, COUNT_UPPER),
        rooms_bed: range(filter.rooms_bed_min, filter.rooms_bed_max, COUNT_UPPER),
        rooms_bath: range(filter.rooms_bath_min, filter.rooms_bath_max, COUNT_UPPER),
        bbox: filter.bbox,
        within_id: non_empty(&filter.within_id),
        show_price_on_request: filter.show_price_on_request,
        available_now: filter.available_now,
        tags: non_empty(&filter.tags),
        amenities: filter.amenities.clone(),
        parking: range(filter.parking_min, filter.parking_max, COUNT_UPPER),
        cellar: range(filter.cellar_min, filter.cellar_max, COUNT_UPPER),
        search: filter.query.clone().or_else(|| filter.city.clone()),
    }
}

pub fn api_sort(sort: Option<&SearchSort>) -> ApiSort {
    let Some(sort) = sort else {
        return ApiSort::default();
    };
    ApiSort {
        rent: sort.rent,
        size: sort.size,
        rooms: sort.rooms,
        created_at: sort.created_at,
        distance: sort.distance,
        ..ApiSort::default()
    }
}

pub fn api_request(filter: &SearchFilter, sort: Option<&SearchSort>, paging: Paging) -> ApiRequest {
    ApiRequest {
        filter: api_filter(filter),
        sort: api_sort(sort),
        paging,
    }
}
