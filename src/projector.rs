//! Route projection.
//!
//! Places a point on the route's 1-D distance axis and tests whether it lies
//! inside the search corridor. Both operations look only at segment
//! endpoints, never at segment interiors: a station is positioned at the
//! cumulative distance of whichever segment endpoint is closest to it.

use crate::geo::{haversine_miles, Coordinate};
use crate::route::Route;

/// Miles per degree of latitude (approximate, latitude independent).
const MILES_PER_DEG_LAT: f64 = 69.0;
/// Miles per degree of longitude, fixed for mid-latitudes.
const MILES_PER_DEG_LNG: f64 = 54.0;

/// Approximate distance along the route to the segment endpoint nearest `point`.
///
/// Segments are scanned in route order and only a strictly closer endpoint
/// replaces the current best, so the earliest segment wins on exact ties.
/// Within a segment the start wins only if it is strictly closer than the end.
pub fn project_distance(route: &Route, point: &Coordinate) -> f64 {
    let mut min_distance = f64::INFINITY;
    let mut best_along = 0.0;
    let mut cumulative = 0.0;

    for segment in &route.segments {
        let to_start = haversine_miles(point, &segment.start);
        let to_end = haversine_miles(point, &segment.end);
        let nearest = to_start.min(to_end);

        if nearest < min_distance {
            min_distance = nearest;
            best_along = if to_start < to_end {
                cumulative
            } else {
                cumulative + segment.length
            };
        }

        cumulative += segment.length;
    }

    best_along
}

/// True if `point` is within `corridor_width_miles` of any segment endpoint.
///
/// Each segment is first screened with a box padded by a fixed
/// degrees-per-mile conversion, so the corridor is slightly anisotropic far
/// from mid-latitudes.
pub fn is_near_route(route: &Route, point: &Coordinate, corridor_width_miles: f64) -> bool {
    let lat_pad = corridor_width_miles / MILES_PER_DEG_LAT;
    let lng_pad = corridor_width_miles / MILES_PER_DEG_LNG;

    route.segments.iter().any(|segment| {
        let min_lat = segment.start.lat.min(segment.end.lat) - lat_pad;
        let max_lat = segment.start.lat.max(segment.end.lat) + lat_pad;
        let min_lng = segment.start.lng.min(segment.end.lng) - lng_pad;
        let max_lng = segment.start.lng.max(segment.end.lng) + lng_pad;

        if !(min_lat <= point.lat && point.lat <= max_lat && min_lng <= point.lng && point.lng <= max_lng) {
            return false;
        }

        let to_start = haversine_miles(point, &segment.start);
        let to_end = haversine_miles(point, &segment.end);
        to_start.min(to_end) <= corridor_width_miles
    })
}
