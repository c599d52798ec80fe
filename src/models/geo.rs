use serde::{Deserialize, Serialize};

/// A point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

/// Axis-aligned bounding box, serialized as `[[minLng, minLat], [maxLng, maxLat]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox(pub [[f64; 2]; 2]);

impl BBox {
    pub const fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        Self([[min_lng, min_lat], [max_lng, max_lat]])
    }

    /// Square box of `offset` degrees on each side of `point`.
    pub fn around(point: LngLat, offset: f64) -> Self {
        Self::new(
            point.lng - offset,
            point.lat - offset,
            point.lng + offset,
            point.lat + offset,
        )
    }

    pub fn min_lng(&self) -> f64 {
        self.0[0][0]
    }

    pub fn min_lat(&self) -> f64 {
        self.0[0][1]
    }

    pub fn max_lng(&self) -> f64 {
        self.0[1][0]
    }

    pub fn max_lat(&self) -> f64 {
        self.0[1][1]
    }

    pub fn center(&self) -> LngLat {
        LngLat {
            lng: (self.min_lng() + self.max_lng()) / 2.0,
            lat: (self.min_lat() + self.max_lat()) / 2.0,
        }
    }

    pub fn contains(&self, point: LngLat) -> bool {
        point.lng >= self.min_lng()
            && point.lng <= self.max_lng()
            && point.lat >= self.min_lat()
            && point.lat <= self.max_lat()
    }

    /// Componentwise min/max of both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox::new(
            self.min_lng().min(other.min_lng()),
            self.min_lat().min(other.min_lat()),
            self.max_lng().max(other.max_lng()),
            self.max_lat().max(other.max_lat()),
        )
    }

    /// Union of every box in `boxes`, `None` when empty.
    pub fn union_all<'a, I>(boxes: I) -> Option<BBox>
    where
        I: IntoIterator<Item = &'a BBox>,
    {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BBox>, bbox| match acc {
                Some(merged) => Some(merged.union(bbox)),
                None => Some(*bbox),
            })
    }

    /// Checks that the corners are finite, ordered and within WGS84 range.
    pub fn validate(&self) -> Result<(), String> {
        let [[min_lng, min_lat], [max_lng, max_lat]] = self.0;
        if [min_lng, min_lat, max_lng, max_lat]
            .into_iter()
            .any(|value| !value.is_finite())
        {
            return Err("bounding box must contain finite coordinates".to_string());
        }
        if min_lng > max_lng || min_lat > max_lat {
            return Err("bounding box must be [[minLng, minLat], [maxLng, maxLat]]".to_string());
        }
        if !(-180.0..=180.0).contains(&min_lng) || !(-180.0..=180.0).contains(&max_lng) {
            return Err("longitude must be within [-180, 180]".to_string());
        }
        if !(-90.0..=90.0).contains(&min_lat) || !(-90.0..=90.0).contains(&max_lat) {
            return Err("latitude must be within [-90, 90]".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn bbox_serializes_as_nested_pairs() {
        let bbox = BBox::new(16.1, 48.1, 16.5, 48.3);
        let json = serde_json::to_value(bbox).unwrap();
        assert_eq!(json, serde_json::json!([[16.1, 48.1], [16.5, 48.3]]));

        let back: BBox = serde_json::from_value(json).unwrap();
        assert_eq!(back, bbox);
    }

    #[test]
    fn union_all_spans_every_box() {
        let boxes = [
            BBox::new(16.30, 48.20, 16.35, 48.22),
            BBox::new(16.28, 48.19, 16.33, 48.21),
            BBox::new(16.36, 48.18, 16.40, 48.25),
        ];
        let merged = BBox::union_all(&boxes).unwrap();
        assert_eq!(merged, BBox::new(16.28, 48.18, 16.40, 48.25));
        assert!(BBox::union_all(&[]).is_none());
    }

    #[rstest]
    #[case(LngLat::new(16.37, 48.20), true)]
    #[case(LngLat::new(16.1825, 48.1182), true)]
    #[case(LngLat::new(15.0, 48.20), false)]
    #[case(LngLat::new(16.37, 49.0), false)]
    fn contains_is_inclusive(#[case] point: LngLat, #[case] expected: bool) {
        let vienna = BBox::new(16.1825, 48.1182, 16.5776, 48.3226);
        assert_eq!(vienna.contains(point), expected);
    }

    #[rstest]
    #[case(BBox::new(f64::NAN, 48.0, 16.0, 49.0))]
    #[case(BBox::new(17.0, 48.0, 16.0, 49.0))]
    #[case(BBox::new(16.0, 48.0, 181.0, 49.0))]
    #[case(BBox::new(16.0, -91.0, 17.0, 49.0))]
    fn validate_rejects_malformed_boxes(#[case] bbox: BBox) {
        assert!(bbox.validate().is_err());
    }

    #[test]
    fn around_buffers_both_axes() {
        let bbox = BBox::around(LngLat::new(16.0, 48.0), 0.5);
        assert_eq!(bbox, BBox::new(15.5, 47.5, 16.5, 48.5));
        assert_eq!(bbox.center(), LngLat::new(16.0, 48.0));
    }
}
