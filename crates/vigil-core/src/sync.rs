//! Per-camera synchronization: cursor derivation, fetch, persistence.
//!
//! A camera's cursor is the maximum `stop` timestamp among its stored
//! events. It is re-derived from the store at the start of every pass and
//! never cached or written directly, so a crash mid-pass simply means the
//! next pass resumes from whatever was durably persisted.
//!
//! Persistence within a page is best-effort: a failed insert is logged
//! and counted, but the remaining events in the page are still attempted.
//! Anything that was not stored stays ahead of the cursor and is
//! re-fetched on the next pass.

use std::time::Instant;

use chrono::{DateTime, Utc};
use vigil_types::{CameraName, MotionEvent};

/// Durable event storage as seen by the synchronizer.
///
/// Callers never spawn the returned futures, so no auxiliary `Send`
/// bound is needed.
#[allow(async_fn_in_trait)]
pub trait EventStore {
    /// Error the store can fail with.
    type Error: std::error::Error;

    /// The maximum `stop` among stored events for `camera`, or `None`
    /// when no events are stored.
    async fn latest_stop(
        &self,
        camera: &CameraName,
    ) -> Result<Option<DateTime<Utc>>, Self::Error>;

    /// Insert `event` unless its id is already present. Returns whether a
    /// row was inserted. Must be idempotent.
    async fn upsert(&self, event: &MotionEvent) -> Result<bool, Self::Error>;
}

/// A camera event source as seen by the synchronizer.
///
/// Callers never spawn the returned futures, so no auxiliary `Send`
/// bound is needed.
#[allow(async_fn_in_trait)]
pub trait EventSource {
    /// Error the source can fail with.
    type Error: std::error::Error;

    /// Fetch all events for `camera` occurring after `after`. The Unix
    /// epoch means "all available history".
    async fn fetch_since(
        &self,
        camera: &CameraName,
        after: DateTime<Utc>,
    ) -> Result<Vec<MotionEvent>, Self::Error>;
}

/// Errors that fail a camera's sync pass outright.
///
/// Both variants are per-camera and non-fatal to the process; other
/// cameras in the same pass still proceed.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The cursor query failed.
    #[error("querying cursor for camera {camera}: {message}")]
    Cursor {
        /// The camera whose pass failed.
        camera: CameraName,
        /// Description of the store failure.
        message: String,
    },

    /// The upstream fetch failed.
    #[error("fetching events for camera {camera}: {message}")]
    Fetch {
        /// The camera whose pass failed.
        camera: CameraName,
        /// Description of the fetch failure.
        message: String,
    },
}

/// What one camera's sync pass accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Events the source returned for this pass.
    pub fetched: usize,
    /// Events newly inserted into the store.
    pub inserted: usize,
    /// Events whose insert failed; the next pass retries them.
    pub failed: usize,
}

impl SyncReport {
    /// Whether every fetched event is now durably stored (or was already).
    pub const fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Synchronize one camera: derive the cursor, fetch newer events, persist
/// them in the order received.
///
/// # Errors
///
/// Returns [`SyncError::Cursor`] if the cursor cannot be derived and
/// [`SyncError::Fetch`] if the upstream fetch fails. Individual insert
/// failures do not error -- they are counted in the report and retried by
/// the next pass.
pub async fn sync_camera<S: EventStore, U: EventSource>(
    store: &S,
    source: &U,
    camera: &CameraName,
) -> Result<SyncReport, SyncError> {
    let started = Instant::now();

    let cursor = store
        .latest_stop(camera)
        .await
        .map_err(|e| SyncError::Cursor {
            camera: camera.clone(),
            message: e.to_string(),
        })?;
    let after = cursor.unwrap_or(DateTime::UNIX_EPOCH);
    tracing::debug!(camera = %camera, after = %after, "derived sync cursor");

    let events = source
        .fetch_since(camera, after)
        .await
        .map_err(|e| SyncError::Fetch {
            camera: camera.clone(),
            message: e.to_string(),
        })?;

    let mut inserted: usize = 0;
    let mut failed: usize = 0;
    for event in &events {
        match store.upsert(event).await {
            Ok(true) => {
                inserted = inserted.saturating_add(1);
                tracing::debug!(camera = %camera, event = %event.id, "stored motion event");
            }
            Ok(false) => {}
            Err(e) => {
                failed = failed.saturating_add(1);
                tracing::warn!(
                    camera = %camera,
                    event = %event.id,
                    error = %e,
                    "failed to store motion event, the next pass retries it"
                );
            }
        }
    }

    let report = SyncReport {
        fetched: events.len(),
        inserted,
        failed,
    };
    tracing::info!(
        camera = %camera,
        fetched = report.fetched,
        inserted = report.inserted,
        failed = report.failed,
        elapsed = ?started.elapsed(),
        "finished syncing motion events"
    );
    Ok(report)
}

/// Run one pass over all cameras, sequentially, in configured order.
///
/// Per-camera failures are logged with the camera name and flip the
/// aggregate result to `false`, but never stop the loop -- one
/// unreachable source must not block progress on the others.
pub async fn run_pass<S: EventStore, U: EventSource>(
    store: &S,
    source: &U,
    cameras: &[CameraName],
) -> bool {
    let mut all_ok = true;
    for camera in cameras {
        match sync_camera(store, source, camera).await {
            Ok(report) => {
                if !report.is_complete() {
                    all_ok = false;
                }
            }
            Err(error) => {
                tracing::error!(camera = %camera, error = %error, "camera sync failed");
                all_ok = false;
            }
        }
    }
    all_ok
}
