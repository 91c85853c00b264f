//! HTTP client for the camera NVR motion-event API.
//!
//! Each call performs exactly one bounded GET against a per-camera
//! endpoint and decodes the JSON response into
//! [`MotionEvent`](vigil_types::MotionEvent)s. There are no internal
//! retries -- retrying is the run scheduler's job at the pass level, which
//! keeps this client a pure read with no state between calls.
//!
//! # Modules
//!
//! - [`client`] -- the [`UpstreamClient`] and wire-payload decoding
//! - [`error`] -- the [`UpstreamError`] taxonomy

pub mod client;
pub mod error;

// Re-export primary types for convenience.
pub use client::UpstreamClient;
pub use error::UpstreamError;
