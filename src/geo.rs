//! Geographic primitives.
//!
//! Coordinates are WGS84 lat/lon in degrees. Distances are statute miles.

use serde::{Deserialize, Serialize};

/// Earth radius in miles.
const EARTH_RADIUS_MI: f64 = 3959.0;

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    #[serde(alias = "lon")]
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True if latitude is in [-90, 90] and longitude in [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Axis-aligned box in degrees, inclusive on all edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Smallest box containing every coordinate, or None for an empty input.
    pub fn around<'a, I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let init = BoundingBox {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lng: first.lng,
            max_lng: first.lng,
        };

        Some(iter.fold(init, |b, c| BoundingBox {
            min_lat: b.min_lat.min(c.lat),
            max_lat: b.max_lat.max(c.lat),
            min_lng: b.min_lng.min(c.lng),
            max_lng: b.max_lng.max(c.lng),
        }))
    }

    /// Grow the box by separate latitude and longitude margins (degrees).
    pub fn expand(&self, lat_margin: f64, lng_margin: f64) -> Self {
        BoundingBox {
            min_lat: self.min_lat - lat_margin,
            max_lat: self.max_lat + lat_margin,
            min_lng: self.min_lng - lng_margin,
            max_lng: self.max_lng + lng_margin,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    pub fn contains(&self, c: &Coordinate) -> bool {
        self.min_lat <= c.lat && c.lat <= self.max_lat && self.min_lng <= c.lng && c.lng <= self.max_lng
    }
}

/// Haversine distance between two coordinates in miles.
pub fn haversine_miles(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_MI * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pt(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng)
    }

    #[test]
    fn haversine_same_point() {
        let p = pt(37.7749, -122.4194);
        assert_eq!(haversine_miles(&p, &p), 0.0);
    }

    #[test]
    fn haversine_san_francisco_to_los_angeles() {
        let sf = pt(37.7749, -122.4194);
        let la = pt(34.0522, -118.2437);
        let dist = haversine_miles(&sf, &la);
        assert!(dist > 300.0 && dist < 450.0, "Expected ~347 mi, got {dist:.1}");
    }

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let dist = haversine_miles(&pt(0.0, 0.0), &pt(0.0, 1.0));
        assert!((dist - 69.1).abs() < 0.1, "Expected ~69.1 mi, got {dist}");
    }

    #[test]
    fn bounding_box_around_points() {
        let pts = [pt(1.0, -3.0), pt(-2.0, 4.0), pt(0.5, 0.0)];
        let bbox = BoundingBox::around(&pts).unwrap();
        assert_eq!(bbox.min_lat, -2.0);
        assert_eq!(bbox.max_lat, 1.0);
        assert_eq!(bbox.min_lng, -3.0);
        assert_eq!(bbox.max_lng, 4.0);
        assert_eq!(bbox.lat_span(), 3.0);
        assert_eq!(bbox.lng_span(), 7.0);
    }

    #[test]
    fn bounding_box_empty_input() {
        let pts: [Coordinate; 0] = [];
        assert!(BoundingBox::around(&pts).is_none());
    }

    #[test]
    fn bounding_box_contains_edges() {
        let bbox = BoundingBox::around(&[pt(0.0, 0.0), pt(1.0, 1.0)]).unwrap();
        assert!(bbox.contains(&pt(1.0, 1.0)));
        assert!(!bbox.contains(&pt(1.01, 0.5)));
        assert!(bbox.expand(0.1, 0.0).contains(&pt(1.01, 0.5)));
    }

    #[test]
    fn coordinate_validity() {
        assert!(pt(90.0, -180.0).is_valid());
        assert!(!pt(90.5, 0.0).is_valid());
        assert!(!pt(0.0, 181.0).is_valid());
    }

    proptest! {
        #[test]
        fn haversine_is_symmetric(
            lat1 in -90.0f64..90.0, lng1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lng2 in -180.0f64..180.0,
        ) {
            let a = pt(lat1, lng1);
            let b = pt(lat2, lng2);
            prop_assert_eq!(haversine_miles(&a, &b), haversine_miles(&b, &a));
        }

        #[test]
        fn haversine_is_non_negative(
            lat1 in -90.0f64..90.0, lng1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lng2 in -180.0f64..180.0,
        ) {
            let d = haversine_miles(&pt(lat1, lng1), &pt(lat2, lng2));
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_MI + 1e-6);
        }
    }
}
