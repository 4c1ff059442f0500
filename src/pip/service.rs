//! Geofilter decision for a single coordinate.

use super::Boundary;
use crate::models::Coordinate;

/// Accept or reject a coordinate against the boundary.
///
/// With no boundary (not loaded yet, or failed to load) every coordinate
/// is accepted, so ingestion degrades to pass-through instead of stalling.
pub fn accepts(coord: Coordinate, boundary: Option<&Boundary>) -> bool {
    match boundary {
        Some(boundary) => boundary.contains(coord),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_boundary_accepts_everything() {
        assert!(accepts(Coordinate::new(48.8566, 2.3522), None));
        assert!(accepts(Coordinate::new(-90.0, 180.0), None));
    }

    #[test]
    fn test_multipolygon_parts() {
        let boundary = Boundary::from_geojson_str(
            r#"{
                "type": "Feature",
                "properties": {"name": "two islands"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]],
                        [[[10.0, 10.0], [12.0, 10.0], [12.0, 12.0], [10.0, 12.0], [10.0, 10.0]]]
                    ]
                }
            }"#,
        )
        .unwrap();

        assert!(accepts(Coordinate::new(1.0, 1.0), Some(&boundary)));
        assert!(accepts(Coordinate::new(11.0, 11.0), Some(&boundary)));
        assert!(!accepts(Coordinate::new(5.0, 5.0), Some(&boundary)));
    }

    #[test]
    fn test_hole_in_collection_feature() {
        let boundary = Boundary::from_geojson_str(
            r#"{
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": {},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [
                            [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                            [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
                        ]
                    }
                }]
            }"#,
        )
        .unwrap();

        assert!(accepts(Coordinate::new(1.0, 1.0), Some(&boundary)));
        assert!(!accepts(Coordinate::new(5.0, 5.0), Some(&boundary)));
    }
}
