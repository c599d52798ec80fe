use serde::{Deserialize, Serialize};

use super::geo::{BBox, LngLat};

/// A district within a city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    pub id: String,
    pub name: String,
    pub postal_code: String,
}

/// A city and its districts, as shown in the location picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub children: Vec<District>,
}

impl City {
    pub fn district_ids(&self) -> Vec<String> {
        self.children
            .iter()
            .map(|district| district.id.clone())
            .collect()
    }
}

/// District entry as returned by the popular-locations endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationChild {
    pub name: String,
    pub alt_name: String,
    pub id: String,
    #[serde(rename = "postal_code")]
    pub postal_code: String,
    pub url_segment: Option<String>,
}

/// City entry as returned by the popular-locations endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularLocation {
    pub name: String,
    pub alt_name: String,
    pub id: String,
    pub children: Vec<LocationChild>,
    pub url_segment: String,
}

impl From<PopularLocation> for City {
    fn from(location: PopularLocation) -> Self {
        City {
            id: location.id,
            name: location.name,
            children: location
                .children
                .into_iter()
                .map(|child| District {
                    id: child.id,
                    name: child.name,
                    postal_code: child.postal_code,
                })
                .collect(),
        }
    }
}

/// One entry of a boundary lookup, in request order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryItem {
    pub bbox: BBox,
    #[serde(default)]
    pub geojson: serde_json::Value,
}

/// A previously searched place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearch {
    pub mapbox_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    /// `[lng, lat]`
    pub pt: [f64; 2],
}

impl RecentSearch {
    pub fn point(&self) -> LngLat {
        LngLat::from(self.pt)
    }
}

/// Typeahead suggestion from the geocoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    #[serde(default)]
    pub place_formatted: String,
    #[serde(default)]
    pub feature_type: String,
    pub mapbox_id: String,
}

/// Geometry resolved for a picked suggestion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodedPlace {
    pub bbox: Option<BBox>,
    pub center: Option<LngLat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn popular_location_converts_to_city() {
        let popular: PopularLocation = serde_json::from_value(json!({
            "name": "Graz",
            "altName": "Graz",
            "id": "osm:graz",
            "urlSegment": "graz",
            "children": [
                {"name": "Innere Stadt", "altName": "I.", "id": "osm:graz:1", "postal_code": "8010", "urlSegment": null},
                {"name": "St. Leonhard", "altName": "II.", "id": "osm:graz:2", "postal_code": "8010", "urlSegment": "st-leonhard"}
            ]
        }))
        .unwrap();

        let city = City::from(popular);
        assert_eq!(city.id, "osm:graz");
        assert_eq!(city.district_ids(), vec!["osm:graz:1", "osm:graz:2"]);
        assert_eq!(city.children[0].postal_code, "8010");
    }
}
