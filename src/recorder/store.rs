//! Persistence and remote-sync collaborator boundaries.

use futures::stream::BoxStream;

use super::session::{DrivingDataPoint, DrivingSession, SessionId};
use crate::Result;

/// Trait for the session persistence engine.
///
/// The storage engine itself (embedded database, files, remote cache) lives
/// outside this core; only its query contract is consumed here. One-shot
/// queries are async and cancellable. Continuous queries are restartable,
/// indefinite streams: they emit the current state on subscription and again
/// after every underlying change, for as long as the subscriber polls.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Persist a new session and return its assigned identity.
    ///
    /// The passed session's id is a placeholder; the store assigns the real
    /// one (monotonic, unique).
    async fn insert_session(&self, session: DrivingSession) -> Result<SessionId>;

    /// Overwrite a stored session. Fails with `SessionNotFound` for ids the
    /// store has never assigned.
    async fn update_session(&self, session: &DrivingSession) -> Result<()>;

    /// Append one data point. Fails with `UnknownSession` when the owning
    /// session does not exist.
    async fn insert_data_point(&self, point: &DrivingDataPoint) -> Result<()>;

    /// Continuous query over all sessions.
    fn all_sessions(&self) -> BoxStream<'static, Vec<DrivingSession>>;

    /// Continuous query over one session's data points, timestamp ascending.
    fn data_points(&self, session: SessionId) -> BoxStream<'static, Vec<DrivingDataPoint>>;

    /// Fetch one session by id.
    async fn session_by_id(&self, id: SessionId) -> Result<Option<DrivingSession>>;

    /// Fetch one session's data points once, timestamp ascending.
    async fn data_points_once(&self, id: SessionId) -> Result<Vec<DrivingDataPoint>>;

    /// Set the synced flag on a session.
    async fn mark_session_synced(&self, id: SessionId) -> Result<()>;
}

/// Trait for the remote sync endpoint.
///
/// Timeout and retry policy belong to the implementation and its caller; the
/// recorder treats "failed" and "not attempted" as the same retryable state.
#[async_trait::async_trait]
pub trait SyncClient: Send + Sync + 'static {
    /// Upload session metadata.
    async fn upload_session(&self, session: &DrivingSession) -> Result<()>;

    /// Upload a session's data points.
    async fn upload_data_points(&self, points: &[DrivingDataPoint]) -> Result<()>;
}
