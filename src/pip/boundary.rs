//! Boundary loading from a GeoJSON definition.

use std::path::{Path, PathBuf};

use geo::MultiPolygon;
use geojson::GeoJson;
use thiserror::Error;
use tracing::{error, info, warn};

use super::BoundaryIndex;
use crate::models::Coordinate;

/// Why the boundary could not be loaded.
///
/// None of these are fatal: callers fall back to unfiltered ingestion.
#[derive(Debug, Error)]
pub enum BoundaryLoadError {
    #[error("boundary file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read boundary file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid boundary GeoJSON: {0}")]
    Parse(String),

    #[error("unsupported boundary geometry: {0}")]
    UnsupportedGeometry(String),
}

/// Shape of the top-level GeoJSON value the boundary came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Polygon,
    MultiPolygon,
    Feature,
    FeatureCollection,
}

/// The region used for membership tests. Immutable once loaded.
#[derive(Debug)]
pub struct Boundary {
    kind: BoundaryKind,
    index: BoundaryIndex,
}

impl Boundary {
    /// Read and parse the boundary file.
    ///
    /// Logs the outcome; does not retry.
    pub async fn load(path: &Path) -> Result<Self, BoundaryLoadError> {
        let result = match tokio::fs::read_to_string(path).await {
            Ok(text) => Self::from_geojson_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BoundaryLoadError::NotFound(path.to_path_buf()))
            }
            Err(source) => Err(BoundaryLoadError::Io {
                path: path.to_path_buf(),
                source,
            }),
        };

        match &result {
            Ok(boundary) => info!(
                "Boundary loaded from {} ({:?}, {} parts)",
                path.display(),
                boundary.kind,
                boundary.part_count()
            ),
            Err(e) => error!("Failed to load boundary: {}", e),
        }

        result
    }

    pub fn from_geojson_str(text: &str) -> Result<Self, BoundaryLoadError> {
        let geojson: GeoJson = text
            .parse()
            .map_err(|e: geojson::Error| BoundaryLoadError::Parse(e.to_string()))?;
        Self::from_geojson(geojson)
    }

    pub fn from_geojson(geojson: GeoJson) -> Result<Self, BoundaryLoadError> {
        let (kind, parts) = match geojson {
            GeoJson::Geometry(geometry) => {
                let kind = match &geometry.value {
                    geojson::Value::Polygon(_) => BoundaryKind::Polygon,
                    _ => BoundaryKind::MultiPolygon,
                };
                (kind, vec![into_multipolygon(geometry)?])
            }
            GeoJson::Feature(feature) => {
                let geometry = feature
                    .geometry
                    .ok_or_else(|| BoundaryLoadError::UnsupportedGeometry("null".to_string()))?;
                (BoundaryKind::Feature, vec![into_multipolygon(geometry)?])
            }
            GeoJson::FeatureCollection(collection) => {
                let mut parts = Vec::with_capacity(collection.features.len());
                for (i, feature) in collection.features.into_iter().enumerate() {
                    let Some(geometry) = feature.geometry else {
                        warn!("Boundary feature {} has no geometry, skipping", i);
                        continue;
                    };
                    match into_multipolygon(geometry) {
                        Ok(part) => parts.push(part),
                        Err(e) => warn!("Boundary feature {} skipped: {}", i, e),
                    }
                }
                (BoundaryKind::FeatureCollection, parts)
            }
        };

        Ok(Self {
            kind,
            index: BoundaryIndex::build(parts),
        })
    }

    /// Point-in-polygon membership, edge-inclusive
    pub fn contains(&self, coord: Coordinate) -> bool {
        self.index.contains(coord.lon, coord.lat)
    }

    pub fn kind(&self) -> BoundaryKind {
        self.kind
    }

    pub fn part_count(&self) -> usize {
        self.index.len()
    }
}

fn into_multipolygon(geometry: geojson::Geometry) -> Result<MultiPolygon<f64>, BoundaryLoadError> {
    let geometry = geo::Geometry::<f64>::try_from(geometry)
        .map_err(|e| BoundaryLoadError::Parse(e.to_string()))?;

    match geometry {
        geo::Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
        geo::Geometry::MultiPolygon(multi) => Ok(multi),
        other => Err(BoundaryLoadError::UnsupportedGeometry(
            geometry_name(&other).to_string(),
        )),
    }
}

fn geometry_name(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}
