pub mod filters;
pub mod geo;
pub mod places;

use serde::{Deserialize, Deserializer, Serialize};

pub use filters::{
    LocationFilter, PriceRangeFilter, PropertyTypeFilter, RentBuyMode, SearchFilters, UiMode,
    ALL_SUBCATEGORIES,
};
pub use geo::{BBox, LngLat};
pub use places::{
    BoundaryItem, City, District, GeocodedPlace, PopularLocation, RecentSearch, Suggestion,
};

pub type PropertyId = u64;

/// Media attached to a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub cdn_url: Option<String>,
}

/// Core property document returned by the search API
///
/// Only the fields the search core reads are typed; everything else the API
/// sends is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    /// `[lng, lat]`
    #[serde(default)]
    pub location: Option<[f64; 2]>,
    #[serde(default)]
    pub rent: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rent_per: Vec<Option<f64>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub rooms: Option<f64>,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default, rename = "type")]
    pub type_id: Option<u32>,
    #[serde(default)]
    pub sub_type: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media: Vec<Media>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Property {
    pub fn lng_lat(&self) -> Option<LngLat> {
        self.location.map(LngLat::from)
    }

    pub fn first_photo(&self) -> Option<&str> {
        self.media
            .iter()
            .find(|media| media.kind == "photo")
            .and_then(|media| media.cdn_url.as_deref())
    }

    /// First known bound of the price-per-m² range.
    pub fn price_per_sqm(&self) -> Option<f64> {
        self.rent_per.iter().flatten().next().copied()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Paging metadata for one page of results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub all_total_count: u64,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub properties: Vec<Property>,
    pub pagination: Pagination,
}

/// Price distribution for the current filter (price bounds excluded)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `[min, max]`, both `None` when nothing matches
    pub range: (Option<f64>, Option<f64>),
    pub histogram: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}
