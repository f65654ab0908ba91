//! Route polylines.
//!
//! A route is a chain of straight segments with precomputed lengths and an
//! independently supplied total distance. Segment lengths are trusted as
//! given; they are never re-derived from the endpoints.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::geo::{haversine_miles, BoundingBox, Coordinate};

/// One leg of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub start: Coordinate,
    pub end: Coordinate,
    /// Length of this leg in miles.
    #[serde(alias = "distance")]
    pub length: f64,
}

/// A driving route between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Total driving distance in miles.
    pub distance: f64,
    /// Segments in driving order.
    pub segments: Vec<RouteSegment>,
}

impl Route {
    pub fn new(distance: f64, segments: Vec<RouteSegment>) -> Self {
        Self { distance, segments }
    }

    /// Build a route from an ordered point list, measuring each leg with
    /// haversine. Returns None if fewer than 2 points are given.
    pub fn from_points(points: &[Coordinate]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let segments: Vec<RouteSegment> = points
            .windows(2)
            .map(|w| RouteSegment {
                start: w[0],
                end: w[1],
                length: haversine_miles(&w[0], &w[1]),
            })
            .collect();
        let distance = segments.iter().map(|s| s.length).sum();

        Some(Self { distance, segments })
    }

    /// Check the route is usable by the optimizer.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.segments.is_empty() {
            return Err(PlanError::InvalidRoute("route has no segments".into()));
        }
        if !self.distance.is_finite() || self.distance <= 0.0 {
            return Err(PlanError::InvalidRoute(format!(
                "total distance must be positive, got {}",
                self.distance
            )));
        }

        for (i, seg) in self.segments.iter().enumerate() {
            if !seg.start.is_valid() || !seg.end.is_valid() {
                return Err(PlanError::InvalidRoute(format!(
                    "segment {i} has an out-of-range coordinate"
                )));
            }
            if !seg.length.is_finite() || seg.length < 0.0 {
                return Err(PlanError::InvalidRoute(format!(
                    "segment {i} has invalid length {}",
                    seg.length
                )));
            }
        }

        Ok(())
    }

    pub fn origin(&self) -> Option<Coordinate> {
        self.segments.first().map(|s| s.start)
    }

    pub fn destination(&self) -> Option<Coordinate> {
        self.segments.last().map(|s| s.end)
    }

    /// Every segment endpoint, starts then ends.
    pub fn endpoints(&self) -> impl Iterator<Item = &Coordinate> {
        self.segments
            .iter()
            .map(|s| &s.start)
            .chain(self.segments.iter().map(|s| &s.end))
    }

    /// Tight box around all segment endpoints.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::around(self.endpoints())
    }
}
