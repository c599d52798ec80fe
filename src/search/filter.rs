use serde::{Deserialize, Serialize};

use crate::models::{BBox, RentBuyMode};

/// Backend search filter produced by filter composition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    /// Backend property type ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<Vec<u32>>,
    /// Backend property subtype ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_type: Option<Vec<RentBuyMode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Vec<u32>>,

    /// Minimum price (EUR)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_min: Option<f64>,
    /// Maximum price (EUR)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_max: Option<f64>,

    /// Minimum size in square meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_min: Option<f64>,
    /// Maximum size in square meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_max: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms_bed_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms_bed_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms_bath_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms_bath_max: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
    /// Place ids the listing must be contained in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub within_id: Option<Vec<String>>,
    /// Free-text city match, used when no geometry is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_price_on_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_now: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cellar_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cellar_max: Option<f64>,

    /// Free-text search query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl SearchFilter {
    /// Same filter without price bounds, for the price histogram.
    pub fn without_price(&self) -> Self {
        Self {
            rent_min: None,
            rent_max: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSort {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<SortOrder>,
}

impl SearchSort {
    pub fn newest_first() -> Self {
        Self {
            created_at: Some(SortOrder::Desc),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

/// Full search request: filter, sort and page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchInput {
    pub filter: SearchFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SearchSort>,
    pub paging: Paging,
}
