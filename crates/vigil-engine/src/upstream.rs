//! Adapter implementing the synchronizer's source seam over HTTP.

use chrono::{DateTime, Utc};
use vigil_core::sync::EventSource;
use vigil_types::{CameraName, MotionEvent};
use vigil_upstream::{UpstreamClient, UpstreamError};

/// The camera NVR API as an event source.
pub struct HttpEventSource {
    client: UpstreamClient,
}

impl HttpEventSource {
    /// Create a source over a constructed client.
    pub const fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

impl EventSource for HttpEventSource {
    type Error = UpstreamError;

    async fn fetch_since(
        &self,
        camera: &CameraName,
        after: DateTime<Utc>,
    ) -> Result<Vec<MotionEvent>, UpstreamError> {
        self.client.motion_events(camera, after).await
    }
}
