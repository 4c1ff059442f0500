//! Location records: raw CSV rows and the accepted, immutable result.

use serde::{Deserialize, Serialize};

/// Metric value used when a row carries none.
pub const MISSING_METRIC: &str = "N/A";

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(lat: {}, lon: {})", self.lat, self.lon)
    }
}

/// One row of the location CSV.
///
/// Only the columns below are read; anything else in the header is ignored.
/// Empty cells count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "non_empty")]
    pub id: Option<String>,

    #[serde(default, alias = "name", deserialize_with = "non_empty")]
    pub nombre: Option<String>,

    /// Textual geometry, expected as `POINT (<lon> <lat>)`
    #[serde(default, deserialize_with = "non_empty")]
    pub geometry: Option<String>,

    #[serde(default, alias = "metric", deserialize_with = "non_empty")]
    pub nps: Option<String>,
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// An accepted location as exposed to map consumers.
///
/// Field names on the wire are `{id, nombre, latitud, longitud, nps}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "latitud")]
    pub latitude: f64,

    #[serde(rename = "longitud")]
    pub longitude: f64,

    #[serde(rename = "nps")]
    pub metric: String,
}

impl Location {
    /// Build a location from a raw row, filling positional defaults.
    ///
    /// `row` is the 1-based data row number in the source.
    pub fn from_record(record: RawRecord, coord: Coordinate, row: usize) -> Self {
        Self {
            id: record.id.unwrap_or_else(|| format!("row_{}", row)),
            name: record.nombre.unwrap_or_else(|| format!("Ubicación {}", row)),
            latitude: coord.lat,
            longitude: coord.lon,
            metric: record.nps.unwrap_or_else(|| MISSING_METRIC.to_string()),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_positional() {
        let loc = Location::from_record(RawRecord::default(), Coordinate::new(19.0, -99.0), 7);
        assert_eq!(loc.id, "row_7");
        assert_eq!(loc.name, "Ubicación 7");
        assert_eq!(loc.metric, "N/A");
    }

    #[test]
    fn test_wire_field_names() {
        let loc = Location {
            id: "r1".to_string(),
            name: "Centro".to_string(),
            latitude: 19.4326,
            longitude: -99.1332,
            metric: "42".to_string(),
        };
        let value = serde_json::to_value(&loc).unwrap();
        assert_eq!(value["id"], "r1");
        assert_eq!(value["nombre"], "Centro");
        assert_eq!(value["latitud"], 19.4326);
        assert_eq!(value["longitud"], -99.1332);
        assert_eq!(value["nps"], "42");
    }

    #[test]
    fn test_csv_row_ignores_extra_columns_and_empty_cells() {
        let data = "id,nombre,extra,geometry,nps\n,Tienda,x,POINT (1 2),\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let record: RawRecord = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(record.id, None);
        assert_eq!(record.nombre.as_deref(), Some("Tienda"));
        assert_eq!(record.geometry.as_deref(), Some("POINT (1 2)"));
        assert_eq!(record.nps, None);
    }
}
