//! Location ingestion pipeline.
//!
//! CSV rows → extracted coordinates → boundary membership → ordered store,
//! read back through a role projection.

mod coordinate;
mod projector;
mod service;
mod source;
mod store;

pub use coordinate::extract_coordinate;
pub use projector::{project, project_role};
pub use service::LocationService;
pub use source::{CsvSource, MalformedRow, RecordSourceError, SourceRow, SourceRows};
pub use store::{filter_records, IngestReport, LocationStore, StoreStatus};
