//! Idempotent motion-event persistence and cursor queries.
//!
//! The `motion` table is append-only from this process's point of view:
//! events are inserted with `ON CONFLICT DO NOTHING` and never updated or
//! deleted, so the stored id set for a camera only ever grows. The cursor
//! query ([`MotionStore::latest_stop`]) reads the maximum `stop` for a
//! camera; absence of rows is the `None` result, not an error.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vigil_types::{CameraName, MotionEvent};

use crate::error::DbError;

/// Operations on the `motion` table.
pub struct MotionStore<'a> {
    pool: &'a PgPool,
}

impl<'a> MotionStore<'a> {
    /// Create a new store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Return the latest known `stop` timestamp for a camera.
    ///
    /// This is the camera's sync cursor: the synchronizer asks the
    /// upstream source only for events after this point. Returns
    /// `Ok(None)` when no events are stored for the camera.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn latest_stop(
        &self,
        camera: &CameraName,
    ) -> Result<Option<DateTime<Utc>>, DbError> {
        let stop = sqlx::query_scalar::<_, DateTime<Utc>>(
            r"SELECT stop FROM motion
              WHERE camera = $1
              ORDER BY stop DESC
              LIMIT 1",
        )
        .bind(camera.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(stop)
    }

    /// Insert an event if its id is not already present.
    ///
    /// Returns `true` if a row was inserted, `false` if the id already
    /// existed (for any camera -- first writer wins). Safe to call
    /// repeatedly with the same event and safe under concurrent writers.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn upsert(&self, event: &MotionEvent) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"INSERT INTO motion (id, camera, start, stop)
              VALUES ($1, $2, $3, $4)
              ON CONFLICT (id) DO NOTHING",
        )
        .bind(event.id.as_str())
        .bind(event.camera.as_str())
        .bind(event.start)
        .bind(event.stop)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Return all stored events for a camera, ordered by `start`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn events_for_camera(
        &self,
        camera: &CameraName,
    ) -> Result<Vec<MotionEventRow>, DbError> {
        let rows = sqlx::query_as::<_, MotionEventRow>(
            r"SELECT id, camera, start, stop FROM motion
              WHERE camera = $1
              ORDER BY start, id",
        )
        .bind(camera.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// A row from the `motion` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MotionEventRow {
    /// Upstream-assigned event identifier.
    pub id: String,
    /// Camera that observed the motion.
    pub camera: String,
    /// When the motion began.
    pub start: DateTime<Utc>,
    /// When the motion ended.
    pub stop: DateTime<Utc>,
}

impl From<MotionEventRow> for MotionEvent {
    fn from(row: MotionEventRow) -> Self {
        Self::new(row.id, row.camera, row.start, row.stop)
    }
}
