//! In-memory location store and the rebuild that fills it.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;
use tracing::{info, warn};

use super::coordinate::extract_coordinate;
use super::source::SourceRow;
use crate::models::Location;
use crate::pip::{accepts, Boundary};

/// Lifecycle of the store contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    /// Nothing has been published yet
    Empty,
    /// A rebuild is in flight; readers still see the previous snapshot
    Loading,
    /// The last rebuild published a snapshot
    Ready,
    /// The last rebuild aborted; the previous snapshot is kept
    Failed,
}

/// Counters for a single rebuild
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub accepted: usize,
    pub dropped_geometry: usize,
    pub dropped_outside: usize,
    pub dropped_malformed: usize,
}

impl IngestReport {
    pub fn total_rows(&self) -> usize {
        self.accepted + self.dropped_geometry + self.dropped_outside + self.dropped_malformed
    }
}

/// Run extraction and the geofilter over rows in source order.
///
/// Row-level problems drop only that row. Order of accepted rows is kept.
pub fn filter_records<I>(rows: I, boundary: Option<&Boundary>) -> (Vec<Location>, IngestReport)
where
    I: IntoIterator<Item = SourceRow>,
{
    let mut locations = Vec::new();
    let mut report = IngestReport::default();

    for SourceRow { row, record } in rows {
        let record = match record {
            Ok(record) => record,
            Err(malformed) => {
                warn!(
                    "Row {} could not be parsed ({}), skipping: {}",
                    row, malformed.reason, malformed.raw
                );
                report.dropped_malformed += 1;
                continue;
            }
        };

        let Some(coord) = extract_coordinate(record.geometry.as_deref()) else {
            warn!(
                "Row {} skipped: missing/invalid geometry {:?}",
                row, record.geometry
            );
            report.dropped_geometry += 1;
            continue;
        };

        if !accepts(coord, boundary) {
            warn!("Row {} skipped: location {} is outside the boundary", row, coord);
            report.dropped_outside += 1;
            continue;
        }

        locations.push(Location::from_record(record, coord, row));
        report.accepted += 1;
    }

    (locations, report)
}

struct StoreState {
    status: StoreStatus,
    generation: u64,
}

/// Ordered, immutable snapshots of accepted locations.
///
/// One writer publishes whole snapshots; readers clone the `Arc` and never
/// observe a partially rebuilt list.
pub struct LocationStore {
    snapshot: RwLock<Arc<[Location]>>,
    state: Mutex<StoreState>,
}

impl Default for LocationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationStore {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::from(Vec::new())),
            state: Mutex::new(StoreState {
                status: StoreStatus::Empty,
                generation: 0,
            }),
        }
    }

    /// Current contents in source order
    pub fn snapshot(&self) -> Arc<[Location]> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self) -> StoreStatus {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).status
    }

    /// Number of completed rebuilds
    pub fn generation(&self) -> u64 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).generation
    }

    /// Replace the contents with the accepted subset of `rows`.
    ///
    /// The new list is built completely before it is published.
    pub fn rebuild<I>(&self, rows: I, boundary: Option<&Boundary>) -> IngestReport
    where
        I: IntoIterator<Item = SourceRow>,
    {
        let (locations, report) = filter_records(rows, boundary);
        self.publish(locations);
        info!("{} locations loaded", report.accepted);
        report
    }

    fn publish(&self, locations: Vec<Location>) {
        let snapshot: Arc<[Location]> = Arc::from(locations);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = snapshot;

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.status = StoreStatus::Ready;
        state.generation += 1;
    }

    pub(crate) fn mark_loading(&self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).status = StoreStatus::Loading;
    }

    pub(crate) fn mark_failed(&self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).status = StoreStatus::Failed;
    }
}
