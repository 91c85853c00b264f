//! Error taxonomy for upstream fetches.

/// Errors that can occur while fetching events from a camera source.
///
/// All variants are per-camera and non-fatal to the process: a failed
/// fetch marks that camera's sync pass as failed and the scheduler backs
/// off.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The request could not be sent or the response body could not be
    /// read (connection refused, DNS failure, 30-second timeout, ...).
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The source answered with a status other than 200.
    #[error("unexpected status code: {status}")]
    Status {
        /// The status the source returned.
        status: reqwest::StatusCode,
    },

    /// The response body was not the expected JSON array shape.
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A decoded event carried values no valid event can have.
    #[error("malformed event {id}: {reason}")]
    InvalidEvent {
        /// Upstream id of the offending event.
        id: String,
        /// What was wrong with it.
        reason: String,
    },
}
