//! Reference in-memory session store.
//!
//! Backs tests and composition-root development with the full `SessionStore`
//! contract, including the continuous queries: every mutation bumps a watch
//! revision, and each continuous stream re-reads a fresh snapshot per
//! revision. Subscribers therefore see the current state immediately and
//! again after every change, without the store holding any lock across
//! delivery.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::{RwLock, watch};
use tokio_stream::wrappers::WatchStream;

use super::session::{DrivingDataPoint, DrivingSession, SessionId};
use super::store::SessionStore;
use crate::{Result, TelemetryError};

#[derive(Debug, Default)]
struct StoreState {
    next_id: u64,
    sessions: BTreeMap<SessionId, DrivingSession>,
    points: Vec<DrivingDataPoint>,
}

/// In-memory [`SessionStore`] implementation.
#[derive(Debug)]
pub struct MemoryStore {
    state: Arc<RwLock<StoreState>>,
    revision: watch::Sender<u64>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self { state: Arc::new(RwLock::new(StoreState::default())), revision }
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r = r.wrapping_add(1));
    }

    fn sorted_points(state: &StoreState, id: SessionId) -> Vec<DrivingDataPoint> {
        let mut points: Vec<_> =
            state.points.iter().filter(|p| p.session_id == id).cloned().collect();
        points.sort_by_key(|p| p.timestamp);
        points
    }
}

#[async_trait::async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, mut session: DrivingSession) -> Result<SessionId> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = SessionId(state.next_id);
        session.id = id;
        state.sessions.insert(id, session);
        drop(state);
        self.bump();
        Ok(id)
    }

    async fn update_session(&self, session: &DrivingSession) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.sessions.contains_key(&session.id) {
            return Err(TelemetryError::SessionNotFound { id: session.id });
        }
        state.sessions.insert(session.id, session.clone());
        drop(state);
        self.bump();
        Ok(())
    }

    async fn insert_data_point(&self, point: &DrivingDataPoint) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.sessions.contains_key(&point.session_id) {
            return Err(TelemetryError::UnknownSession { id: point.session_id });
        }
        state.points.push(point.clone());
        drop(state);
        self.bump();
        Ok(())
    }

    fn all_sessions(&self) -> BoxStream<'static, Vec<DrivingSession>> {
        let state = Arc::clone(&self.state);
        WatchStream::new(self.revision.subscribe())
            .then(move |_| {
                let state = Arc::clone(&state);
                async move { state.read().await.sessions.values().cloned().collect() }
            })
            .boxed()
    }

    fn data_points(&self, session: SessionId) -> BoxStream<'static, Vec<DrivingDataPoint>> {
        let state = Arc::clone(&self.state);
        WatchStream::new(self.revision.subscribe())
            .then(move |_| {
                let state = Arc::clone(&state);
                async move { Self::sorted_points(&*state.read().await, session) }
            })
            .boxed()
    }

    async fn session_by_id(&self, id: SessionId) -> Result<Option<DrivingSession>> {
        Ok(self.state.read().await.sessions.get(&id).cloned())
    }

    async fn data_points_once(&self, id: SessionId) -> Result<Vec<DrivingDataPoint>> {
        Ok(Self::sorted_points(&*self.state.read().await, id))
    }

    async fn mark_session_synced(&self, id: SessionId) -> Result<()> {
        let mut state = self.state.write().await;
        let session =
            state.sessions.get_mut(&id).ok_or(TelemetryError::SessionNotFound { id })?;
        session.is_synced = true;
        drop(state);
        self.bump();
        Ok(())
    }
}
