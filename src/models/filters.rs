use serde::{Deserialize, Serialize};

use super::geo::{BBox, LngLat};

/// Sentinel subcategory id meaning "every subcategory of the category".
pub const ALL_SUBCATEGORIES: &str = "all";

/// Structured location constraint.
///
/// When both `within_id` and `bbox` are set, `within_id` is the filter and
/// `bbox` only positions the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFilter {
    /// Display name, e.g. "Vienna" or "Vienna (3 districts)".
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within_id: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<LngLat>,
}

impl LocationFilter {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            within_id: None,
            bbox: None,
            center: None,
        }
    }

    /// Bbox-only location, center derived from the box when not given.
    pub fn with_bbox(name: impl Into<String>, bbox: BBox, center: Option<LngLat>) -> Self {
        Self {
            name: name.into(),
            within_id: None,
            bbox: Some(bbox),
            center: center.or_else(|| Some(bbox.center())),
        }
    }

    /// Containment filter over `ids`; the bbox is kept for display.
    pub fn within(name: impl Into<String>, ids: Vec<String>, bbox: BBox) -> Self {
        Self {
            name: name.into(),
            within_id: Some(ids),
            bbox: Some(bbox),
            center: Some(bbox.center()),
        }
    }

    /// Non-empty `within_id`, if any.
    pub fn within_ids(&self) -> Option<&[String]> {
        self.within_id
            .as_deref()
            .filter(|ids| !ids.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTypeFilter {
    pub category_id: String,
    pub category_name: String,
    /// Subcategory ids, or [`ALL_SUBCATEGORIES`].
    pub subcategories: Vec<String>,
}

/// Price bounds in whole euros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRangeFilter {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

impl PriceRangeFilter {
    pub fn eur(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            currency: "EUR".to_string(),
        }
    }
}

/// The canonical query state behind the search bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub location: String,
    pub location_data: Option<LocationFilter>,
    pub property_type: Option<PropertyTypeFilter>,
    pub price_range: Option<PriceRangeFilter>,
}

impl SearchFilters {
    /// True when a location constraint exists; unscoped searches are never run.
    pub fn has_location(&self) -> bool {
        !self.location.is_empty()
            || self
                .location_data
                .as_ref()
                .and_then(|data| data.bbox.as_ref())
                .is_some()
    }

    /// Bbox the map should show for the committed location.
    pub fn display_bbox(&self) -> Option<&BBox> {
        self.location_data
            .as_ref()
            .and_then(|data| data.bbox.as_ref())
    }
}

/// Listing mode understood by the marketplace API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentBuyMode {
    #[default]
    Rent,
    Buy,
}

impl RentBuyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentBuyMode::Rent => "rent",
            RentBuyMode::Buy => "buy",
        }
    }
}

/// Mode toggle shown in the UI. `Ai` is not forwarded to the API yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    #[default]
    Rent,
    Buy,
    Ai,
}

impl From<UiMode> for RentBuyMode {
    fn from(mode: UiMode) -> Self {
        match mode {
            UiMode::Buy => RentBuyMode::Buy,
            UiMode::Rent | UiMode::Ai => RentBuyMode::Rent,
        }
    }
}

impl std::str::FromStr for UiMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "rent" => Ok(UiMode::Rent),
            "buy" => Ok(UiMode::Buy),
            "ai" => Ok(UiMode::Ai),
            other => Err(format!("unknown mode '{other}', expected rent, buy or ai")),
        }
    }
}
