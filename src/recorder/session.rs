//! Driving session and data point value types.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Store-assigned session identity. Unique and monotonic within one store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recorded driving session.
///
/// Created on session start; `end_time` is written once at stop (last call
/// wins if stop is repeated) and `is_synced` once after a complete upload.
/// Sessions are never deleted by this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivingSession {
    pub id: SessionId,
    pub start_time: SystemTime,
    /// Absent while the session is active.
    pub end_time: Option<SystemTime>,
    /// False until a full remote upload succeeds; the durable signal of sync.
    pub is_synced: bool,
}

impl DrivingSession {
    /// True while the session has not been stopped.
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }
}

/// One time-stamped telemetry sample owned by a session.
///
/// Append-only; per-session ordering is by timestamp ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivingDataPoint {
    pub session_id: SessionId,
    pub timestamp: SystemTime,
    pub speed_kmh: f32,
    pub engine_rpm: Option<u16>,
    pub fuel_percent: Option<u8>,
}
