//! The motion event record persisted by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CameraName, EventId};

/// A single motion-detection event reported by a camera.
///
/// Events are immutable once created. The id is assigned by the upstream
/// source system; `stop >= start` is enforced at the wire boundary before
/// an event is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionEvent {
    /// Upstream-assigned event identifier.
    pub id: EventId,
    /// Camera that observed the motion.
    pub camera: CameraName,
    /// When the motion began.
    pub start: DateTime<Utc>,
    /// When the motion ended. Never earlier than `start`.
    pub stop: DateTime<Utc>,
}

impl MotionEvent {
    /// Create a new motion event.
    pub fn new(
        id: impl Into<EventId>,
        camera: impl Into<CameraName>,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            camera: camera.into(),
            start,
            stop,
        }
    }
}
