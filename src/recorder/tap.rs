//! Bus-fed recording task.

use std::sync::Arc;
use std::time::SystemTime;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{DrivingDataPoint, SessionId, SessionRecorder, SessionStore, SyncClient};
use crate::bus::{EventBus, TopicStream};
use crate::car::CarStateEvent;

/// Handle for a running recording tap.
///
/// Dropping the handle stops the tap.
pub struct TapHandle {
    cancel: CancellationToken,
}

impl TapHandle {
    /// Stop recording.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TapHandle {
    fn drop(&mut self) {
        debug!("Dropping recording tap");
        self.cancel.cancel();
    }
}

/// RecorderTap turns car-state events into data points for one session.
///
/// The tap is a plain bus subscriber: it folds the latest engine and fuel
/// readings into a sample per speed event and appends it to the session. As
/// a consumer it is strictly best-effort - persistence failures are logged
/// and skipped, and a slow store costs the tap events rather than ever
/// backpressuring the publisher.
pub struct RecorderTap;

impl RecorderTap {
    /// Spawn a recording task feeding `session` from the bus's car-state topic.
    pub fn spawn<S, C>(
        recorder: Arc<SessionRecorder<S, C>>,
        bus: &EventBus,
        session: SessionId,
    ) -> TapHandle
    where
        S: SessionStore,
        C: SyncClient,
    {
        let events = bus.car_state.subscribe();
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            Self::record_task(recorder, events, session, cancel_task).await;
        });

        TapHandle { cancel }
    }

    async fn record_task<S, C>(
        recorder: Arc<SessionRecorder<S, C>>,
        mut events: TopicStream<CarStateEvent>,
        session: SessionId,
        cancel: CancellationToken,
    ) where
        S: SessionStore,
        C: SyncClient,
    {
        info!(%session, "recording tap started");
        let mut engine_rpm = None;
        let mut fuel_percent = None;
        let mut sample_count = 0u64;

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    info!(%session, "recording tap cancelled");
                    break;
                }
                event = events.next() => event,
            };

            match event {
                Some(CarStateEvent::Engine { rpm, .. }) => engine_rpm = Some(rpm),
                Some(CarStateEvent::Fuel { percent }) => fuel_percent = percent,
                Some(CarStateEvent::Speed { kmh }) => {
                    let point = DrivingDataPoint {
                        session_id: session,
                        timestamp: SystemTime::now(),
                        speed_kmh: kmh,
                        engine_rpm,
                        fuel_percent,
                    };
                    match recorder.save_data_point(point).await {
                        Ok(()) => sample_count += 1,
                        Err(e) => warn!(%session, "failed to persist data point: {}", e),
                    }
                }
                None => {
                    debug!(%session, "car-state topic closed");
                    break;
                }
            }
        }

        info!(%session, samples = sample_count, "recording tap ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::MemoryStore;
    use crate::{DrivingSession, Result, TelemetryError};

    struct NoRemote;

    #[async_trait::async_trait]
    impl SyncClient for NoRemote {
        async fn upload_session(&self, _session: &DrivingSession) -> Result<()> {
            Err(TelemetryError::upload_failed("no remote in this test"))
        }
        async fn upload_data_points(&self, _points: &[DrivingDataPoint]) -> Result<()> {
            Err(TelemetryError::upload_failed("no remote in this test"))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn tap_records_speed_samples_with_latest_context() {
        let bus = EventBus::default();
        let recorder = Arc::new(SessionRecorder::new(
            Arc::new(MemoryStore::new()),
            Arc::new(NoRemote),
        ));
        let session = recorder.start_session().await.unwrap();

        let tap = RecorderTap::spawn(Arc::clone(&recorder), &bus, session);
        // Subscription happens inside spawn, before this returns; publishes
        // below are therefore visible to the tap.
        bus.car_state.publish(CarStateEvent::Engine { rpm: 2500, coolant_c: Some(85) });
        bus.car_state.publish(CarStateEvent::Fuel { percent: Some(70) });
        bus.car_state.publish(CarStateEvent::Speed { kmh: 61.5 });

        // Wait for the sample to land
        let mut points = Vec::new();
        for _ in 0..50 {
            points = recorder.store().data_points_once(session).await.unwrap();
            if !points.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].speed_kmh, 61.5);
        assert_eq!(points[0].engine_rpm, Some(2500));
        assert_eq!(points[0].fuel_percent, Some(70));

        tap.stop();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn tap_survives_persistence_failures() {
        let bus = EventBus::default();
        let recorder = Arc::new(SessionRecorder::new(
            Arc::new(MemoryStore::new()),
            Arc::new(NoRemote),
        ));

        // Session that was never created: every save fails with UnknownSession
        let _tap = RecorderTap::spawn(Arc::clone(&recorder), &bus, SessionId(777));
        bus.car_state.publish(CarStateEvent::Speed { kmh: 10.0 });
        bus.car_state.publish(CarStateEvent::Speed { kmh: 20.0 });

        // The tap keeps consuming; nothing persisted, nothing panicked
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(bus.car_state.subscriber_count(), 1);
    }
}
