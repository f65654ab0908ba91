//! GPX 1.1 input.
//!
//! Wraps the `gpx` crate and turns each track and route in a file into an
//! ordered polyline that can be measured into a `Route`. Multi-segment
//! tracks are flattened into one polyline.

use std::io::Read;

use crate::error::PlanError;
use crate::geo::Coordinate;
use crate::route::Route;

/// A named polyline taken from a GPX track or route.
#[derive(Debug, Clone, PartialEq)]
pub struct GpxPath {
    pub name: Option<String>,
    pub points: Vec<Coordinate>,
}

impl GpxPath {
    /// Measure the polyline into a route. None if it has fewer than 2 points.
    pub fn to_route(&self) -> Option<Route> {
        Route::from_points(&self.points)
    }
}

fn coordinate(wp: &gpx::Waypoint) -> Coordinate {
    let p = wp.point();
    Coordinate::new(p.y(), p.x())
}

/// Parse every track and route from a GPX document, tracks first.
pub fn parse<R: Read>(reader: R) -> Result<Vec<GpxPath>, PlanError> {
    let gpx = gpx::read(reader).map_err(|e| PlanError::Gpx(e.to_string()))?;

    let tracks = gpx.tracks.iter().map(|t| GpxPath {
        name: t.name.clone(),
        points: t
            .segments
            .iter()
            .flat_map(|seg| seg.points.iter())
            .map(coordinate)
            .collect(),
    });

    let routes = gpx.routes.iter().map(|r| GpxPath {
        name: r.name.clone(),
        points: r.points.iter().map(coordinate).collect(),
    });

    Ok(tracks.chain(routes).collect())
}

/// Parse GPX from a byte slice.
pub fn parse_bytes(data: &[u8]) -> Result<Vec<GpxPath>, PlanError> {
    parse(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test"
     xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>I-80 West</name>
    <trkseg>
      <trkpt lat="41.0" lon="-96.0"></trkpt>
      <trkpt lat="41.0" lon="-97.0"></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="41.0" lon="-98.0"></trkpt>
    </trkseg>
  </trk>
  <rte>
    <name>Short Hop</name>
    <rtept lat="40.0" lon="-100.0"></rtept>
    <rtept lat="40.5" lon="-100.0"></rtept>
  </rte>
</gpx>"#;

    #[test]
    fn parse_tracks_then_routes() {
        let paths = parse_bytes(MINIMAL_GPX.as_bytes()).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].name.as_deref(), Some("I-80 West"));
        assert_eq!(paths[1].name.as_deref(), Some("Short Hop"));
    }

    #[test]
    fn multi_segment_track_is_flattened() {
        let paths = parse_bytes(MINIMAL_GPX.as_bytes()).unwrap();
        assert_eq!(paths[0].points.len(), 3);
        assert!((paths[0].points[2].lng + 98.0).abs() < 1e-9);
        assert!((paths[0].points[2].lat - 41.0).abs() < 1e-9);
    }

    #[test]
    fn path_to_route_measures_legs() {
        let paths = parse_bytes(MINIMAL_GPX.as_bytes()).unwrap();
        let route = paths[1].to_route().unwrap();
        assert_eq!(route.segments.len(), 1);
        // Half a degree of latitude is ~34.5 miles.
        assert!((route.distance - 34.5).abs() < 0.2, "got {}", route.distance);
    }

    #[test]
    fn single_point_path_has_no_route() {
        let path = GpxPath {
            name: None,
            points: vec![Coordinate::new(1.0, 1.0)],
        };
        assert!(path.to_route().is_none());
    }

    #[test]
    fn parse_empty_gpx() {
        let empty = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test"
     xmlns="http://www.topografix.com/GPX/1/1">
</gpx>"#;
        assert!(parse_bytes(empty.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn parse_invalid_xml_returns_error() {
        assert!(matches!(parse_bytes(b"not xml at all"), Err(PlanError::Gpx(_))));
    }
}
