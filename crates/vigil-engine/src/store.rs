//! Adapter implementing the synchronizer's store seam over `PostgreSQL`.

use chrono::{DateTime, Utc};
use vigil_core::sync::EventStore;
use vigil_db::{DbError, MotionStore, PostgresPool};
use vigil_types::{CameraName, MotionEvent};

/// The durable event store backed by the shared connection pool.
pub struct PgEventStore {
    pool: PostgresPool,
}

impl PgEventStore {
    /// Create a store over an already-connected pool.
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

impl EventStore for PgEventStore {
    type Error = DbError;

    async fn latest_stop(
        &self,
        camera: &CameraName,
    ) -> Result<Option<DateTime<Utc>>, DbError> {
        MotionStore::new(self.pool.pool()).latest_stop(camera).await
    }

    async fn upsert(&self, event: &MotionEvent) -> Result<bool, DbError> {
        MotionStore::new(self.pool.pool()).upsert(event).await
    }
}
