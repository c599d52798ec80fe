//! Static place lookups and bbox helpers for Austrian cities.

use crate::models::{BBox, LngLat};

pub struct CityCoordinates {
    pub name: &'static str,
    pub center: LngLat,
    pub bbox: BBox,
}

/// Major Austrian cities; "Wien" aliases "Vienna".
pub const CITY_COORDINATES: &[CityCoordinates] = &[
    CityCoordinates {
        name: "Vienna",
        center: LngLat::new(16.3738, 48.2082),
        bbox: BBox::new(16.1825, 48.1182, 16.5776, 48.3226),
    },
    CityCoordinates {
        name: "Wien",
        center: LngLat::new(16.3738, 48.2082),
        bbox: BBox::new(16.1825, 48.1182, 16.5776, 48.3226),
    },
    CityCoordinates {
        name: "Graz",
        center: LngLat::new(15.4395, 47.0707),
        bbox: BBox::new(15.3495, 46.9907, 15.5295, 47.1507),
    },
    CityCoordinates {
        name: "Linz",
        center: LngLat::new(14.2858, 48.3069),
        bbox: BBox::new(14.1958, 48.2269, 14.3758, 48.3869),
    },
    CityCoordinates {
        name: "Salzburg",
        center: LngLat::new(13.055, 47.8095),
        bbox: BBox::new(12.965, 47.7295, 13.145, 47.8895),
    },
    CityCoordinates {
        name: "Innsbruck",
        center: LngLat::new(11.3926, 47.2692),
        bbox: BBox::new(11.3026, 47.1892, 11.4826, 47.3492),
    },
    CityCoordinates {
        name: "Klagenfurt",
        center: LngLat::new(14.3055, 46.6244),
        bbox: BBox::new(14.2155, 46.5444, 14.3955, 46.7044),
    },
];

/// Center used for the default map view and geocoder proximity bias.
pub const VIENNA_CENTER: LngLat = LngLat::new(16.3738, 48.2082);

/// Wider Vienna viewport used on first load.
pub const DEFAULT_VIENNA_BBOX: BBox = BBox::new(
    15.97407557372918,
    47.875726161656644,
    16.768524426270902,
    48.538330669849046,
);

/// Buffer around a recent-search point, roughly 1 km.
pub const RECENT_SEARCH_OFFSET: f64 = 0.009;

/// Buffer around a geocoded point without its own bbox.
pub const POINT_FEATURE_OFFSET: f64 = 0.01;

fn find_city(location: &str, allow_prefix: bool) -> Option<&'static CityCoordinates> {
    let needle = location.trim();
    if needle.is_empty() {
        return None;
    }

    if let Some(city) = CITY_COORDINATES.iter().find(|city| city.name == needle) {
        return Some(city);
    }

    let lower = needle.to_lowercase();
    if let Some(city) = CITY_COORDINATES
        .iter()
        .find(|city| city.name.to_lowercase() == lower)
    {
        return Some(city);
    }

    if allow_prefix {
        return CITY_COORDINATES
            .iter()
            .find(|city| city.name.to_lowercase().starts_with(&lower));
    }

    None
}

/// Bbox for a city name: exact, case-insensitive, then prefix match ("Vien").
pub fn bbox_for_location(location: &str) -> Option<BBox> {
    find_city(location, true).map(|city| city.bbox)
}

/// Center for a city name: exact or case-insensitive match only.
pub fn center_for_location(location: &str) -> Option<LngLat> {
    find_city(location, false).map(|city| city.center)
}

/// Approximate bbox for a circle of `radius_km` around `center`.
pub fn bbox_from_radius(center: LngLat, radius_km: f64) -> BBox {
    let lat_degrees = radius_km / 111.0;
    let lng_degrees = radius_km / (111.0 * center.lat.to_radians().cos());

    BBox::new(
        center.lng - lng_degrees,
        center.lat - lat_degrees,
        center.lng + lng_degrees,
        center.lat + lat_degrees,
    )
}

pub fn format_bbox(bbox: &BBox) -> String {
    format!(
        "SW: {:.4}, {:.4} - NE: {:.4}, {:.4}",
        bbox.min_lat(),
        bbox.min_lng(),
        bbox.max_lat(),
        bbox.max_lng()
    )
}
