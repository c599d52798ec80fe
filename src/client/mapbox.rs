use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::traits::Geocoder;
use crate::error::{ApiError, ApiResult};
use crate::models::{BBox, GeocodedPlace, LngLat, Suggestion};
use crate::utils::location::{POINT_FEATURE_OFFSET, VIENNA_CENTER};

pub const DEFAULT_MAPBOX_URL: &str = "https://api.mapbox.com";

const SUGGEST_PATH: &str = "/search/searchbox/v1/suggest";
const RETRIEVE_PATH: &str = "/search/searchbox/v1/retrieve";

/// New typeahead session token, one per search session.
pub fn session_token() -> String {
    format!("session-{}", Utc::now().timestamp_millis())
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct RetrieveResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeatureProperties {
    /// `[min_lng, min_lat, max_lng, max_lat]`
    #[serde(default)]
    pub bbox: Option<[f64; 4]>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Geometry {
    fn point(&self) -> Option<LngLat> {
        if self.kind != "Point" {
            return None;
        }
        let coordinates: [f64; 2] = serde_json::from_value(self.coordinates.clone()).ok()?;
        Some(LngLat::from(coordinates))
    }
}

impl Feature {
    /// Resolve geometry: an explicit bbox wins, a point feature gets a small box around it.
    pub fn to_place(&self) -> GeocodedPlace {
        let point = self.geometry.point();
        let bbox = match (self.properties.bbox, point) {
            (Some([min_lng, min_lat, max_lng, max_lat]), _) => {
                Some(BBox::new(min_lng, min_lat, max_lng, max_lat))
            }
            (None, Some(point)) => Some(BBox::around(point, POINT_FEATURE_OFFSET)),
            (None, None) => None,
        };
        let bbox = bbox.filter(|bbox| match bbox.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Ignoring malformed feature bbox: {}", e);
                false
            }
        });
        let center = point.or_else(|| {
            self.properties
                .coordinates
                .map(|c| LngLat::new(c.longitude, c.latitude))
        });
        GeocodedPlace { bbox, center }
    }
}

/// Mapbox Search Box client, biased towards Austria
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    client: Client,
    base_url: String,
    access_token: String,
}

impl MapboxGeocoder {
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        Self::with_base_url(DEFAULT_MAPBOX_URL, access_token, timeout)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::transport("client builder", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&[("access_token", self.access_token.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::transport(path, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Geocoder returned {} for {}", status, path);
            return Err(ApiError::Status {
                endpoint: path.to_string(),
                status,
            });
        }
        response.json().await.map_err(|e| ApiError::decode(path, e))
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn suggest(&self, query: &str, session_token: &str) -> ApiResult<Vec<Suggestion>> {
        let proximity = format!("{},{}", VIENNA_CENTER.lng, VIENNA_CENTER.lat);
        let response: SuggestResponse = self
            .get(
                SUGGEST_PATH,
                &[
                    ("q", query.to_string()),
                    ("session_token", session_token.to_string()),
                    ("language", "de".to_string()),
                    ("country", "AT".to_string()),
                    ("proximity", proximity),
                ],
            )
            .await?;
        debug!("{} suggestions for {:?}", response.suggestions.len(), query);
        Ok(response.suggestions)
    }

    async fn retrieve(
        &self,
        suggestion: &Suggestion,
        session_token: &str,
    ) -> ApiResult<Option<GeocodedPlace>> {
        let path = format!("{}/{}", RETRIEVE_PATH, suggestion.mapbox_id);
        let response: RetrieveResponse = self
            .get(&path, &[("session_token", session_token.to_string())])
            .await?;
        Ok(response.features.first().map(Feature::to_place))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(value: serde_json::Value) -> Feature {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn explicit_bbox_wins() {
        let place = feature(json!({
            "geometry": {"type": "Point", "coordinates": [16.37, 48.21]},
            "properties": {"bbox": [16.1, 48.0, 16.6, 48.4]}
        }))
        .to_place();
        assert_eq!(place.bbox, Some(BBox::new(16.1, 48.0, 16.6, 48.4)));
        assert_eq!(place.center, Some(LngLat::new(16.37, 48.21)));
    }

    #[test]
    fn inverted_bbox_is_dropped() {
        let place = feature(json!({
            "geometry": {"type": "Point", "coordinates": [16.37, 48.21]},
            "properties": {"bbox": [16.6, 48.4, 16.1, 48.0]}
        }))
        .to_place();
        assert!(place.bbox.is_none());
        assert_eq!(place.center, Some(LngLat::new(16.37, 48.21)));
    }

    #[test]
    fn point_feature_gets_small_box() {
        let place = feature(json!({
            "geometry": {"type": "Point", "coordinates": [16.0, 48.0]},
            "properties": {}
        }))
        .to_place();
        let bbox = place.bbox.unwrap();
        assert!((bbox.min_lng() - 15.99).abs() < 1e-9);
        assert!((bbox.max_lat() - 48.01).abs() < 1e-9);
    }

    #[test]
    fn polygon_without_bbox_uses_property_coordinates() {
        let place = feature(json!({
            "geometry": {"type": "Polygon", "coordinates": [[[16.0, 48.0]]]},
            "properties": {"coordinates": {"longitude": 14.3, "latitude": 46.6}}
        }))
        .to_place();
        assert!(place.bbox.is_none());
        assert_eq!(place.center, Some(LngLat::new(14.3, 46.6)));
    }

    #[test]
    fn session_tokens_are_prefixed() {
        assert!(session_token().starts_with("session-"));
    }
}
