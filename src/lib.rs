//! Geocerca - a role-gated location map service with boundary geofencing
//!
//! This library provides the ingestion pipeline, session handling and HTTP
//! API shared by the `server` and `ingest` binaries.

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod models;
pub mod pip;
pub mod pipeline;
pub mod questions;
pub mod survey;

pub use models::{Coordinate, Location, RawRecord, Role};
pub use pip::Boundary;
pub use pipeline::LocationService;
