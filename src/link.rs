//! Transport boundary for the vehicle link.
//!
//! The core never opens, closes, or reconnects the serial/Bluetooth link;
//! it consumes whatever implements [`FrameLink`]. Frames arrive already
//! delimited by the link layer.

use crate::Result;
use crate::wire::RawFrame;

/// Trait for the vehicle-side frame transport.
///
/// Implementations abstract over the physical link (Bluetooth RFCOMM, serial,
/// scripted playback in tests) and handle their own timing internally.
#[async_trait::async_trait]
pub trait FrameLink: Send + 'static {
    /// Receive the next inbound frame.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - a delimited frame arrived
    /// - `Ok(None)` - the link closed (normal termination)
    /// - `Err(e)` - transient or fatal link failure
    async fn recv(&mut self) -> Result<Option<RawFrame>>;

    /// Send raw bytes out the link.
    async fn send(&mut self, frame: &[u8]) -> Result<()>;
}

/// Raw link traffic published on the transport topic.
///
/// Consumers that want decoded telemetry subscribe to the car-state or TPMS
/// topics instead; this topic exists for diagnostics and frame logging.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A frame arrived from the vehicle.
    Received(RawFrame),
    /// A frame was written to the vehicle.
    Sent(RawFrame),
}
