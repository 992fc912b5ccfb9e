//! Driver spawns and manages the telemetry ingest task.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::bus::EventBus;
use crate::link::{FrameLink, TransportEvent};
use crate::tpms::{TpmsDecoder, WheelId, pairing_request};
use crate::wire::RawFrame;
use crate::{Result, car, tpms};

/// Outbound requests serviced by the ingest task.
#[derive(Debug, Clone)]
pub enum LinkCommand {
    /// Build and send the pairing-request frame for one wheel.
    PairWheel(WheelId),
    /// Send pre-framed bytes as-is.
    SendRaw(Vec<u8>),
}

/// Driver construction parameters.
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Consecutive link failures tolerated before the task shuts down.
    pub max_errors: u32,
    /// Depth of the outbound command queue.
    pub command_buffer: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { max_errors: 10, command_buffer: 16 }
    }
}

/// Handles returned from spawning the driver.
pub struct DriverChannels {
    /// Queue for outbound requests (pairing, raw sends).
    pub commands: mpsc::Sender<LinkCommand>,
    /// Cancellation token for graceful shutdown.
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the telemetry ingest task.
///
/// One task owns both the link and the TPMS decoder, which makes it the
/// single writer of the four wheel slots: inbound decode is serialized by
/// construction, exactly as the slot model requires. Decoded events fan out
/// through the bus; consumers never touch the decoder.
pub struct Driver;

impl Driver {
    /// Spawn the ingest task for the given link with default configuration.
    pub fn spawn<L>(link: L, bus: Arc<EventBus>) -> DriverChannels
    where
        L: FrameLink,
    {
        Self::spawn_with(link, bus, DriverConfig::default())
    }

    /// Spawn the ingest task with explicit configuration.
    pub fn spawn_with<L>(link: L, bus: Arc<EventBus>, config: DriverConfig) -> DriverChannels
    where
        L: FrameLink,
    {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            Self::ingest_task(link, bus, command_rx, cancel_task, config).await;
        });

        DriverChannels { commands: command_tx, cancel }
    }

    /// Ingest task: reads frames, decodes, publishes, services commands.
    async fn ingest_task<L>(
        mut link: L,
        bus: Arc<EventBus>,
        mut commands: mpsc::Receiver<LinkCommand>,
        cancel: CancellationToken,
        config: DriverConfig,
    ) where
        L: FrameLink,
    {
        info!("Ingest task started");
        let mut decoder = TpmsDecoder::new();
        let mut frame_count = 0u64;
        let mut error_count = 0u32;
        let mut commands_open = true;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Ingest task cancelled");
                    break;
                }
                command = commands.recv(), if commands_open => {
                    match command {
                        Some(command) => {
                            if let Err(e) = Self::send_command(&mut link, &bus, command).await {
                                warn!("Outbound send failed: {}", e);
                            }
                        }
                        None => {
                            debug!("Command channel closed");
                            commands_open = false;
                        }
                    }
                }
                result = link.recv() => {
                    match result {
                        Ok(Some(frame)) => {
                            frame_count += 1;
                            error_count = 0;
                            trace!("Frame {}: {} bytes", frame_count, frame.len());

                            bus.transport.publish(TransportEvent::Received(frame.clone()));

                            // A malformed frame degrades to "ignored"; it must
                            // never take down the bus or the link.
                            if let Err(e) = Self::dispatch(&mut decoder, &bus, &frame) {
                                warn!("Discarding bad frame: {}", e);
                            }
                        }
                        Ok(None) => {
                            info!("Link closed after {} frames", frame_count);
                            break;
                        }
                        Err(e) => {
                            error_count += 1;
                            error!("Link error ({}/{}): {}", error_count, config.max_errors, e);

                            if error_count >= config.max_errors {
                                error!("Too many link errors, shutting down");
                                break;
                            }

                            // Exponential backoff: 50ms, 100ms, 200ms, ...
                            let backoff =
                                std::time::Duration::from_millis(50 * (1 << error_count.min(5)));
                            tokio::time::sleep(backoff).await;
                        }
                    }
                }
            }
        }

        info!("Ingest task ended (processed {} frames)", frame_count);
    }

    /// Route one inbound frame by message kind and publish what it decodes to.
    fn dispatch(decoder: &mut TpmsDecoder, bus: &EventBus, frame: &[u8]) -> Result<()> {
        match frame.first() {
            Some(&tpms::KIND_PAIRING) | Some(&tpms::KIND_TIRE) => {
                for event in decoder.decode(frame)? {
                    bus.tpms.publish(event);
                }
            }
            Some(&car::KIND_GUIDANCE) => {
                if let Some(event) = car::decode_guidance(frame)? {
                    bus.guidance.publish(event);
                }
            }
            Some(&kind) => {
                if let Some(event) = car::decode_car_state(frame)? {
                    bus.car_state.publish(event);
                } else {
                    trace!(kind, "ignoring unknown message kind");
                }
            }
            None => {
                trace!("ignoring empty frame");
            }
        }
        Ok(())
    }

    /// Encode and send one outbound command, mirroring it on the transport topic.
    async fn send_command<L>(link: &mut L, bus: &EventBus, command: LinkCommand) -> Result<()>
    where
        L: FrameLink,
    {
        let bytes = match command {
            LinkCommand::PairWheel(wheel) => {
                debug!(?wheel, "sending pairing request");
                pairing_request(wheel)
            }
            LinkCommand::SendRaw(bytes) => bytes,
        };
        link.send(&bytes).await?;
        let frame: RawFrame = bytes.into();
        bus.transport.publish(TransportEvent::Sent(frame));
        Ok(())
    }
}
