//! Point-in-Polygon (PIP) geofencing.
//!
//! Loads the boundary GeoJSON once and answers membership queries for
//! extracted coordinates using an R-tree over the boundary's polygon parts.

mod boundary;
mod index;
mod service;

pub use boundary::{Boundary, BoundaryKind, BoundaryLoadError};
pub use index::BoundaryIndex;
pub use service::accepts;
