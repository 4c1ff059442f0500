//! Coordinate extraction from textual `POINT` geometry.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::Coordinate;

/// `POINT (<lon> <lat>)`, each number optionally signed and optionally fractional.
const POINT_PATTERN: &str = r"POINT \((-?\d+(?:\.\d*)?)\s+(-?\d+(?:\.\d*)?)\)";

fn point_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(POINT_PATTERN).expect("POINT pattern is a valid regex"))
}

/// Extract a coordinate from a geometry field.
///
/// The source order is longitude first, latitude second. Absent, unmatched or
/// non-finite input yields `None`; a literal `0` is a real coordinate.
pub fn extract_coordinate(raw: Option<&str>) -> Option<Coordinate> {
    let captures = point_regex().captures(raw?)?;

    let lon: f64 = captures.get(1)?.as_str().parse().ok()?;
    let lat: f64 = captures.get(2)?.as_str().parse().ok()?;

    if !lon.is_finite() || !lat.is_finite() {
        return None;
    }

    Some(Coordinate::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lon_then_lat() {
        let coord = extract_coordinate(Some("POINT (-99.1332 19.4326)")).unwrap();
        assert_eq!(coord.lon, -99.1332);
        assert_eq!(coord.lat, 19.4326);
    }

    #[test]
    fn test_integers_and_trailing_dot() {
        let coord = extract_coordinate(Some("POINT (-99 19.)")).unwrap();
        assert_eq!(coord, Coordinate::new(19.0, -99.0));
    }

    #[test]
    fn test_zero_is_a_coordinate() {
        assert_eq!(
            extract_coordinate(Some("POINT (0 0)")),
            Some(Coordinate::new(0.0, 0.0))
        );
    }

    #[test]
    fn test_embedded_in_longer_text() {
        let coord = extract_coordinate(Some("SRID=4326;POINT (2.3522 48.8566)")).unwrap();
        assert_eq!(coord, Coordinate::new(48.8566, 2.3522));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(extract_coordinate(None), None);
        assert_eq!(extract_coordinate(Some("")), None);
        assert_eq!(extract_coordinate(Some("not a point")), None);
        assert_eq!(extract_coordinate(Some("POINT (abc 19.4)")), None);
        assert_eq!(extract_coordinate(Some("POINT (-99.1)")), None);
        assert_eq!(extract_coordinate(Some("POINT(-99.1 19.4)")), None);
        assert_eq!(extract_coordinate(Some("LINESTRING (0 0, 1 1)")), None);
    }

    #[test]
    fn test_overflowing_number_is_rejected() {
        let huge = "9".repeat(400);
        let raw = format!("POINT ({} 1)", huge);
        assert_eq!(extract_coordinate(Some(&raw)), None);
    }
}
