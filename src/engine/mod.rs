mod error;
mod mutations;
mod occupancy;
mod queries;
mod rules;

pub use error::EngineError;
pub use occupancy::{compute_stats, group_by_room, locked_gender, sibling_of};
pub use rules::{check_discharge_floor, days_occupied, today, validate_allocation};

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::backend::BedBackend;
use crate::model::{Bed, BedEvent, WardStats};
use crate::notify::NotifyHub;
use crate::observability;

/// The bed-management core: a transient, refreshable cache of the remote
/// bed inventory plus the rule checks that gate mutations against it.
///
/// The cache is replaced wholesale on every refresh — no incremental
/// patching — so concurrent mutations from other clients become visible at
/// the next refresh, and races are resolved by the backend.
pub struct Engine {
    backend: Arc<dyn BedBackend>,
    beds: RwLock<Vec<Bed>>,
    pub notify: Arc<NotifyHub>,
}

impl Engine {
    pub fn new(backend: Arc<dyn BedBackend>, notify: Arc<NotifyHub>) -> Self {
        Self {
            backend,
            beds: RwLock::new(Vec::new()),
            notify,
        }
    }

    /// Idempotent full refetch of the bed list. Called after every
    /// successful mutation and by the background refresher.
    pub async fn refresh(&self) -> Result<WardStats, EngineError> {
        let start = Instant::now();
        let beds = self.backend.fetch_beds().await?;
        let stats = compute_stats(&beds);
        *self.beds.write().await = beds;

        metrics::counter!(observability::REFRESHES_TOTAL).increment(1);
        metrics::histogram!(observability::REFRESH_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        metrics::gauge!(observability::BEDS_TOTAL).set(stats.total as f64);
        metrics::gauge!(observability::BEDS_OCCUPIED).set(stats.occupied as f64);
        metrics::gauge!(observability::BEDS_AVAILABLE).set(stats.available as f64);
        Ok(stats)
    }

    /// Snapshot of the current cache.
    pub async fn beds(&self) -> Vec<Bed> {
        self.beds.read().await.clone()
    }

    pub(crate) async fn beds_guard(&self) -> tokio::sync::RwLockReadGuard<'_, Vec<Bed>> {
        self.beds.read().await
    }

    fn backend_handle(&self) -> Arc<dyn BedBackend> {
        self.backend.clone()
    }

    /// Refresh + notify + record metrics after a backend-confirmed mutation.
    /// Mirrors the per-op tail of every mutation in one place.
    async fn finish_op(
        &self,
        op: &'static str,
        start: Instant,
        room_no: &str,
        event: BedEvent,
    ) -> Result<(), EngineError> {
        self.refresh().await?;
        tracing::debug!(
            "{} committed for room {room_no}",
            observability::event_label(&event)
        );
        self.notify.send(room_no, &event);
        metrics::counter!(observability::OPS_TOTAL, "op" => op, "status" => "ok").increment(1);
        metrics::histogram!(observability::OP_DURATION_SECONDS, "op" => op)
            .record(start.elapsed().as_secs_f64());
        Ok(())
    }

    /// Count and pass through a mutation failure.
    fn note_failure(op: &'static str, e: EngineError) -> EngineError {
        if e.is_precondition() {
            metrics::counter!(observability::PRECONDITION_FAILURES_TOTAL, "op" => op)
                .increment(1);
        } else {
            metrics::counter!(observability::OPS_TOTAL, "op" => op, "status" => "error")
                .increment(1);
        }
        e
    }
}
