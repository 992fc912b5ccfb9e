//! Error types for telemetry ingestion.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context. The taxonomy follows the pipeline boundaries:
//!
//! - **Frame errors**: a declared message kind needs more bytes than the frame
//!   carries. The frame is discarded and listening continues; this never tears
//!   down the link or the event bus.
//! - **Recorder errors**: a session referenced by id does not exist.
//! - **Upload errors**: the remote sync endpoint rejected or aborted an upload.
//!   Local state is untouched and the operation is safe to retry.
//! - **Storage / link errors**: failures surfaced by the persistence or
//!   transport collaborators.
//!
//! ## Recovery and Retry
//!
//! Errors classify themselves for retry handling:
//!
//! ```rust
//! use dashlink::TelemetryError;
//!
//! let error = TelemetryError::upload_failed("connection reset");
//! if error.is_retryable() {
//!     println!("Can retry this operation");
//! }
//! ```

use thiserror::Error;

use crate::recorder::SessionId;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("frame too short for kind {kind:#04x}: need {needed} bytes, got {actual}")]
    FrameTooShort { kind: u8, needed: usize, actual: usize },

    #[error("session {id} not found")]
    SessionNotFound { id: SessionId },

    #[error("data point references unknown session {id}")]
    UnknownSession { id: SessionId },

    #[error("upload failed: {reason}")]
    Upload {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("storage error in {context}")]
    Storage {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("link error: {reason}")]
    Link {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// Upload and link failures are transient by contract: "failed" and "never
    /// attempted" are the same retryable state, and nothing local changed.
    /// Frame and session errors need a different frame or a different id, not
    /// a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Upload { .. } => true,
            TelemetryError::Link { .. } => true,
            TelemetryError::Storage { .. } => true,
            TelemetryError::FrameTooShort { .. } => false,
            TelemetryError::SessionNotFound { .. } => false,
            TelemetryError::UnknownSession { .. } => false,
        }
    }

    /// Helper constructor for short-frame decode errors.
    pub fn frame_too_short(kind: u8, needed: usize, actual: usize) -> Self {
        TelemetryError::FrameTooShort { kind, needed, actual }
    }

    /// Helper constructor for upload failures.
    pub fn upload_failed(reason: impl Into<String>) -> Self {
        TelemetryError::Upload { reason: reason.into(), source: None }
    }

    /// Helper constructor for upload failures with a source.
    pub fn upload_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::Upload { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for storage collaborator failures.
    pub fn storage(context: impl Into<String>) -> Self {
        TelemetryError::Storage { context: context.into(), source: None }
    }

    /// Helper constructor for transport link failures.
    pub fn link_failed(reason: impl Into<String>) -> Self {
        TelemetryError::Link { reason: reason.into(), source: None }
    }

    /// Helper constructor for transport link failures with a source.
    pub fn link_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::Link { reason: reason.into(), source: Some(source) }
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::Link { reason: err.to_string(), source: Some(Box::new(err)) }
    }
}
