//! Location service: owns the boundary, the store and the rebuild token.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::projector::project;
use super::source::{CsvSource, RecordSourceError};
use super::store::{IngestReport, LocationStore, StoreStatus};
use crate::models::{AccessDenied, Location};
use crate::pip::Boundary;

/// Boundary availability as seen by the rebuild
enum BoundarySlot {
    Pending,
    Loaded(Arc<Boundary>),
    Failed,
}

/// Explicitly owned ingestion service shared by request handlers.
///
/// The boundary is loaded once; rebuilds are serialized through a single
/// async token so concurrent readers never start overlapping rebuilds.
pub struct LocationService {
    boundary_path: PathBuf,
    source_path: PathBuf,
    boundary: RwLock<BoundarySlot>,
    store: LocationStore,
    rebuild_token: Mutex<()>,
}

impl LocationService {
    pub fn new(boundary_path: impl Into<PathBuf>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            boundary_path: boundary_path.into(),
            source_path: source_path.into(),
            boundary: RwLock::new(BoundarySlot::Pending),
            store: LocationStore::new(),
            rebuild_token: Mutex::new(()),
        }
    }

    /// Startup sequence: boundary first, then the initial rebuild.
    ///
    /// A failed boundary load is logged and ingestion continues unfiltered.
    pub async fn start(&self) {
        self.load_boundary().await;
        if let Err(e) = self.rebuild().await {
            error!("Initial location load failed: {}", e);
        }
    }

    pub async fn load_boundary(&self) {
        let slot = match Boundary::load(&self.boundary_path).await {
            Ok(boundary) => BoundarySlot::Loaded(Arc::new(boundary)),
            Err(_) => {
                warn!("Spatial filtering disabled, locations will not be filtered by boundary");
                BoundarySlot::Failed
            }
        };
        *self.boundary.write().unwrap_or_else(PoisonError::into_inner) = slot;
    }

    /// The loaded boundary; `None` while pending or after a failed load
    pub fn boundary(&self) -> Option<Arc<Boundary>> {
        match &*self.boundary.read().unwrap_or_else(PoisonError::into_inner) {
            BoundarySlot::Loaded(boundary) => Some(Arc::clone(boundary)),
            BoundarySlot::Pending | BoundarySlot::Failed => None,
        }
    }

    pub fn store(&self) -> &LocationStore {
        &self.store
    }

    pub fn status(&self) -> StoreStatus {
        self.store.status()
    }

    /// Force a full rebuild from the record source.
    pub async fn rebuild(&self) -> Result<IngestReport, RecordSourceError> {
        let _token = self.rebuild_token.lock().await;
        self.rebuild_locked().await
    }

    /// Rebuild only if the store is empty and no rebuild finished while waiting.
    pub async fn ensure_loaded(&self) {
        // Generation is read before emptiness so a rebuild finishing in
        // between is seen by one check or the other.
        let seen = self.store.generation();
        if !self.store.is_empty() {
            return;
        }

        let _token = self.rebuild_token.lock().await;
        if self.store.generation() != seen {
            debug!("Concurrent rebuild completed, skipping reload");
            return;
        }

        warn!("Location store is empty, reloading");
        if let Err(e) = self.rebuild_locked().await {
            error!("Location reload failed: {}", e);
        }
    }

    /// Role-projected locations, reloading first when the store is empty.
    pub async fn locations_for(&self, role: &str) -> Result<Vec<Location>, AccessDenied> {
        self.ensure_loaded().await;
        let snapshot = self.store.snapshot();
        let view = project(&snapshot, role)?;
        info!(
            "Role '{}' requested locations: {} of {}",
            role,
            view.len(),
            snapshot.len()
        );
        Ok(view.to_vec())
    }

    async fn rebuild_locked(&self) -> Result<IngestReport, RecordSourceError> {
        self.store.mark_loading();

        let source = match CsvSource::open(&self.source_path).await {
            Ok(source) => source,
            Err(e) => {
                self.store.mark_failed();
                return Err(e);
            }
        };
        let rows = match source.rows() {
            Ok(rows) => rows,
            Err(e) => {
                self.store.mark_failed();
                return Err(e);
            }
        };

        let boundary = self.boundary();
        if boundary.is_none() {
            debug!("Rebuilding without a boundary");
        }

        let report = self.store.rebuild(rows, boundary.as_deref());
        info!(
            "Rebuilt locations from {}: {} accepted, {} invalid geometry, {} outside boundary, {} malformed",
            source.path().display(),
            report.accepted,
            report.dropped_geometry,
            report.dropped_outside,
            report.dropped_malformed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const BOUNDARY: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "Mexico"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-118.0, 14.5], [-86.5, 14.5], [-86.5, 32.7], [-118.0, 32.7], [-118.0, 14.5]]]
            }
        }]
    }"#;

    const CSV: &str = "id,nombre,geometry,nps\n\
        r1,Zócalo,POINT (-99.1332 19.4326),9\n\
        r2,Paris,POINT (2.3522 48.8566),7\n\
        r3,Roto,not a point,\n\
        ,Guadalajara,POINT (-103.3496 20.6597),\n\
        r5,Monterrey,POINT (-100.3161 25.6866),8\n\
        r6,Puebla,POINT (-98.2063 19.0414),6\n\
        r7,Mérida,POINT (-89.5926 20.9674),10\n\
        r8,Tijuana,POINT (-117.0382 32.5149),5\n";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_start_filters_by_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let service = LocationService::new(
            write(dir.path(), "mx.json", BOUNDARY),
            write(dir.path(), "arca_data.csv", CSV),
        );
        service.start().await;

        assert!(service.boundary().is_some());
        assert_eq!(service.status(), StoreStatus::Ready);

        let all = service.locations_for("admin").await.unwrap();
        let ids: Vec<&str> = all.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "row_4", "r5", "r6", "r7", "r8"]);
        assert_eq!(all[0].metric, "9");
        assert_eq!(all[1].name, "Guadalajara");
        assert_eq!(all[1].metric, "N/A");

        let user = service.locations_for("user").await.unwrap();
        assert_eq!(user.len(), 5);
        assert_eq!(user[..], all[..5]);

        assert!(service.locations_for("guest").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_boundary_degrades_to_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let service = LocationService::new(
            dir.path().join("missing.json"),
            write(dir.path(), "arca_data.csv", CSV),
        );
        service.start().await;

        assert!(service.boundary().is_none());
        let all = service.locations_for("admin").await.unwrap();
        assert_eq!(all.len(), 7);
    }

    #[tokio::test]
    async fn test_unloaded_boundary_is_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let service = LocationService::new(
            write(dir.path(), "mx.json", BOUNDARY),
            write(dir.path(), "arca_data.csv", CSV),
        );

        // No start(): the boundary was never loaded
        let report = service.rebuild().await.unwrap();
        assert_eq!(report.accepted, 7);
        assert_eq!(report.dropped_geometry, 1);
    }

    #[tokio::test]
    async fn test_missing_source_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write(dir.path(), "arca_data.csv", CSV);
        let service = LocationService::new(write(dir.path(), "mx.json", BOUNDARY), &csv_path);
        service.start().await;
        let before = service.store().snapshot();

        std::fs::remove_file(&csv_path).unwrap();
        let err = service.rebuild().await.unwrap_err();
        assert!(matches!(err, RecordSourceError::NotFound(_)));
        assert_eq!(service.status(), StoreStatus::Failed);
        assert_eq!(service.store().snapshot(), before);
    }

    #[tokio::test]
    async fn test_lazy_load_on_first_read() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("arca_data.csv");
        let service = LocationService::new(dir.path().join("mx.json"), &csv_path);
        service.start().await;
        assert!(service.locations_for("admin").await.unwrap().is_empty());

        std::fs::write(&csv_path, CSV).unwrap();
        let all = service.locations_for("super-user").await.unwrap();
        assert_eq!(all.len(), 7);
    }

    #[tokio::test]
    async fn test_concurrent_readers_share_one_reload() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(LocationService::new(
            write(dir.path(), "mx.json", BOUNDARY),
            write(dir.path(), "arca_data.csv", CSV),
        ));
        service.load_boundary().await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.locations_for("admin").await.unwrap().len() })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 6);
        }
        assert_eq!(service.store().generation(), 1);
    }
}
