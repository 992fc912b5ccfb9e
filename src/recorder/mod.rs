//! Driving session recording and remote sync.
//!
//! A session moves `NotStarted -> Active -> Stopped -> (optionally) Synced`.
//! This module owns the lifecycle logic only; durable storage and the upload
//! endpoint are collaborators behind [`SessionStore`] and [`SyncClient`].
//! Caller policy stays out of here: nothing enforces a single active
//! session, and failed uploads are retried by the caller re-invoking
//! [`SessionRecorder::sync_session`], not by hidden backoff.

mod memory;
mod session;
mod store;
mod tap;

pub use memory::MemoryStore;
pub use session::{DrivingDataPoint, DrivingSession, SessionId};
pub use store::{SessionStore, SyncClient};
pub use tap::{RecorderTap, TapHandle};

use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

use crate::{Result, TelemetryError};

/// Session lifecycle over a store and a sync endpoint.
pub struct SessionRecorder<S, C> {
    store: Arc<S>,
    remote: Arc<C>,
}

impl<S, C> SessionRecorder<S, C>
where
    S: SessionStore,
    C: SyncClient,
{
    pub fn new(store: Arc<S>, remote: Arc<C>) -> Self {
        Self { store, remote }
    }

    /// The underlying store, for read access (continuous queries, UI).
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Start a new session now and return its assigned identity.
    ///
    /// Concurrent starts create independent sessions.
    pub async fn start_session(&self) -> Result<SessionId> {
        let session = DrivingSession {
            id: SessionId(0), // store assigns the real id
            start_time: SystemTime::now(),
            end_time: None,
            is_synced: false,
        };
        let id = self.store.insert_session(session).await?;
        info!(%id, "driving session started");
        Ok(id)
    }

    /// Append one data point to its session.
    ///
    /// Fails with [`TelemetryError::UnknownSession`] when the owning session
    /// does not exist; the existence check belongs to the store.
    pub async fn save_data_point(&self, point: DrivingDataPoint) -> Result<()> {
        self.store.insert_data_point(&point).await
    }

    /// Stop a session, stamping `end_time` with the current instant.
    ///
    /// Stopping twice is allowed: each call re-reads and re-writes
    /// `end_time`, so the last call wins.
    pub async fn stop_session(&self, id: SessionId) -> Result<DrivingSession> {
        let mut session = self
            .store
            .session_by_id(id)
            .await?
            .ok_or(TelemetryError::SessionNotFound { id })?;
        session.end_time = Some(SystemTime::now());
        self.store.update_session(&session).await?;
        info!(%id, "driving session stopped");
        Ok(session)
    }

    /// Upload a session and all its data points, then mark it synced.
    ///
    /// The synced flag is written only after both uploads complete, so an
    /// abandoned or failed call leaves the session in its previous state and
    /// the whole operation is safe to retry as-is.
    pub async fn sync_session(&self, id: SessionId) -> Result<()> {
        let session = self
            .store
            .session_by_id(id)
            .await?
            .ok_or(TelemetryError::SessionNotFound { id })?;
        let points = self.store.data_points_once(id).await?;

        debug!(%id, points = points.len(), "uploading session");
        self.remote.upload_session(&session).await?;
        self.remote.upload_data_points(&points).await?;

        self.store.mark_session_synced(id).await?;
        info!(%id, "driving session synced");
        Ok(())
    }
}
