//! Candidate station search.
//!
//! A coarse box around the whole route narrows the inventory before each
//! remaining station gets the per-segment corridor test and is projected
//! onto the route's distance axis.

use log::{debug, info};
use serde::Serialize;

use crate::geo::{BoundingBox, Coordinate};
use crate::projector::{is_near_route, project_distance};
use crate::route::Route;
use crate::station::{FuelStation, StationInventory};

/// A station that lies near the route, tagged with its position on it.
///
/// Derived fresh for each optimization; never reused across routes.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateStation {
    pub station: FuelStation,
    /// Where the station was matched against the route.
    pub location: Coordinate,
    /// Miles from the route origin.
    pub distance_along_route: f64,
}

/// Box around every segment endpoint, padded so long routes keep stations
/// near their middle.
///
/// The pad is `max(0.5, 10% of lat span, 10% of lng span) + 0.5` degrees.
pub fn route_bounding_box(route: &Route) -> Option<BoundingBox> {
    let bounds = route.bounds()?;
    let buffer = 0.5_f64
        .max(bounds.lat_span() * 0.1)
        .max(bounds.lng_span() * 0.1)
        + 0.5;
    Some(bounds.expand(buffer, buffer))
}

/// Stations within `corridor_width_miles` of the route, in no particular order.
///
/// An empty result is not an error here; the optimizer decides what to do
/// with it.
pub fn filter_candidates<I>(route: &Route, inventory: &I, corridor_width_miles: f64) -> Vec<CandidateStation>
where
    I: StationInventory + ?Sized,
{
    let Some(bbox) = route_bounding_box(route) else {
        return Vec::new();
    };

    let in_box = inventory.stations_in(&bbox);
    info!("Stations in route bounding box: {}", in_box.len());

    let candidates: Vec<CandidateStation> = in_box
        .into_iter()
        .filter_map(|station| {
            let location = station.location?;
            if !is_near_route(route, &location, corridor_width_miles) {
                return None;
            }
            let distance_along_route = project_distance(route, &location);
            debug!("Station {} at mile {:.1}", station.id, distance_along_route);
            Some(CandidateStation {
                station,
                location,
                distance_along_route,
            })
        })
        .collect();

    info!(
        "Stations within {} miles of route: {}",
        corridor_width_miles,
        candidates.len()
    );
    candidates
}
