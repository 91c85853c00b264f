//! The upstream HTTP client and wire-payload decoding.
//!
//! The source exposes one endpoint per camera:
//!
//! ```text
//! GET {base_url}/api/{camera}/recordings?after={unix_seconds}
//! ```
//!
//! returning a JSON array of `{"id", "start_time", "end_time"}` objects
//! with timestamps as Unix seconds (fractional allowed). Only a 200
//! response is a success; anything else fails the fetch.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use vigil_types::{CameraName, MotionEvent};

use crate::error::UpstreamError;

/// Fixed per-request timeout so one stuck source cannot stall a pass.
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Client for the camera NVR motion-event API.
///
/// Holds one [`reqwest::Client`] shared across all cameras; each fetch is
/// stateless, so no per-camera state is kept here.
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Create a client for the given base URL.
    ///
    /// A trailing slash on the base URL is tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Request`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(UpstreamError::Request)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetch all motion events for a camera that occurred after `after`.
    ///
    /// Passing the Unix epoch means "all available history". Performs a
    /// single bounded request; no retries.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Request`] on transport failure,
    /// [`UpstreamError::Status`] on any non-200 response, and
    /// [`UpstreamError::Decode`] / [`UpstreamError::InvalidEvent`] when
    /// the payload does not decode into valid events.
    pub async fn motion_events(
        &self,
        camera: &CameraName,
        after: DateTime<Utc>,
    ) -> Result<Vec<MotionEvent>, UpstreamError> {
        let url = events_url(&self.base_url, camera);

        let response = self
            .client
            .get(&url)
            .query(&[("after", after.timestamp())])
            .send()
            .await
            .map_err(UpstreamError::Request)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(UpstreamError::Status { status });
        }

        let body = response.bytes().await.map_err(UpstreamError::Request)?;
        decode_events(camera, &body)
    }
}

/// Build the per-camera event endpoint URL.
fn events_url(base_url: &str, camera: &CameraName) -> String {
    format!("{base_url}/api/{camera}/recordings")
}

/// One event as the source serializes it.
#[derive(Debug, Deserialize)]
struct WireEvent {
    id: String,
    start_time: f64,
    end_time: f64,
}

/// Decode a response body into motion events for `camera`.
fn decode_events(camera: &CameraName, body: &[u8]) -> Result<Vec<MotionEvent>, UpstreamError> {
    let wire: Vec<WireEvent> = serde_json::from_slice(body)?;
    wire.into_iter()
        .map(|event| into_motion_event(camera, event))
        .collect()
}

/// Validate a wire event and convert it to the domain type.
fn into_motion_event(
    camera: &CameraName,
    wire: WireEvent,
) -> Result<MotionEvent, UpstreamError> {
    if wire.end_time < wire.start_time {
        return Err(UpstreamError::InvalidEvent {
            id: wire.id,
            reason: format!("end_time {} precedes start_time {}", wire.end_time, wire.start_time),
        });
    }

    let start = unix_seconds(wire.start_time).ok_or_else(|| UpstreamError::InvalidEvent {
        id: wire.id.clone(),
        reason: format!("start_time {} is out of range", wire.start_time),
    })?;
    let stop = unix_seconds(wire.end_time).ok_or_else(|| UpstreamError::InvalidEvent {
        id: wire.id.clone(),
        reason: format!("end_time {} is out of range", wire.end_time),
    })?;

    Ok(MotionEvent::new(wire.id, camera.clone(), start, stop))
}

/// Convert fractional Unix seconds to a timestamp.
///
/// The source reports fractional seconds; whole-second precision is what
/// the store keeps, so the fraction is truncated.
#[allow(clippy::cast_possible_truncation)]
fn unix_seconds(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    DateTime::from_timestamp(value.trunc() as i64, 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn camera() -> CameraName {
        CameraName::new("front-door")
    }

    #[test]
    fn events_url_shape() {
        let url = events_url("http://frigate:5000", &camera());
        assert_eq!(url, "http://frigate:5000/api/front-door/recordings");
    }

    #[test]
    fn client_strips_trailing_slash() {
        let client = UpstreamClient::new("http://frigate:5000/").unwrap();
        assert_eq!(client.base_url, "http://frigate:5000");
    }

    #[test]
    fn decode_valid_array() {
        let body = br#"[{"id":"a","start_time":100,"end_time":110}]"#;
        let events = decode_events(&camera(), body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id.as_str(), "a");
        assert_eq!(events[0].camera.as_str(), "front-door");
        assert_eq!(events[0].start.timestamp(), 100);
        assert_eq!(events[0].stop.timestamp(), 110);
    }

    #[test]
    fn decode_empty_array() {
        let events = decode_events(&camera(), b"[]").unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn decode_truncates_fractional_seconds() {
        let body = br#"[{"id":"a","start_time":100.75,"end_time":110.25}]"#;
        let events = decode_events(&camera(), body).unwrap();
        assert_eq!(events[0].start.timestamp(), 100);
        assert_eq!(events[0].stop.timestamp(), 110);
    }

    #[test]
    fn decode_rejects_non_array_body() {
        let result = decode_events(&camera(), br#"{"error":"not found"}"#);
        assert!(matches!(result, Err(UpstreamError::Decode(_))));
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let result = decode_events(&camera(), br#"[{"id":"a"}]"#);
        assert!(matches!(result, Err(UpstreamError::Decode(_))));
    }

    #[test]
    fn decode_rejects_inverted_interval() {
        let body = br#"[{"id":"a","start_time":110,"end_time":100}]"#;
        let result = decode_events(&camera(), body);
        assert!(matches!(
            result,
            Err(UpstreamError::InvalidEvent { id, .. }) if id == "a"
        ));
    }

    #[test]
    fn decode_rejects_out_of_range_timestamp() {
        let body = br#"[{"id":"a","start_time":1e30,"end_time":1e30}]"#;
        let result = decode_events(&camera(), body);
        assert!(matches!(result, Err(UpstreamError::InvalidEvent { .. })));
    }
}
