//! Typed Rust core for in-vehicle telemetry ingestion.
//!
//! Dashlink decodes the binary frame protocol spoken by a vehicle head unit
//! over a serial/Bluetooth link and fans the results out to independent
//! consumers.
//!
//! # Features
//!
//! - **Wire codec**: bit-field extraction, little-endian assembly, the
//!   asymmetric 16-bit text codec, and checksum framing
//! - **TPMS**: four-slot pairing state machine and tire-reading decode with
//!   sentinel-aware snapshots
//! - **Event bus**: typed broadcast topics that never block the producer
//! - **Session recorder**: start/stop/data-point lifecycle with retryable
//!   remote sync
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dashlink::{Dashlink, FrameLink, LinkCommand, TpmsEvent, WheelId};
//! use futures::StreamExt;
//!
//! # async fn demo<L: FrameLink>(bluetooth: L) -> dashlink::Result<()> {
//! let (bus, driver) = Dashlink::attach(bluetooth);
//! let mut tires = bus.tpms.subscribe();
//!
//! driver.commands.send(LinkCommand::PairWheel(WheelId::FrontLeft)).await.ok();
//!
//! while let Some(event) = tires.next().await {
//!     if let TpmsEvent::TireUpdate(snapshot) = event {
//!         println!("{:?}: {:?} bar", snapshot.wheel, snapshot.pressure_bar);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Core types and error handling
mod error;
pub mod wire;

#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;

// Decode layers
pub mod car;
pub mod tpms;

// Stream-based ingestion architecture
pub mod bus;
pub mod driver;
pub mod link;

// Session recording
pub mod recorder;

// Core exports
pub use error::{Result, TelemetryError};
pub use wire::RawFrame;

// Decode exports
pub use car::{CarStateEvent, GuidanceEvent};
pub use tpms::{PairingState, TireSnapshot, TpmsDecoder, TpmsEvent, WheelId, WheelSlot};

// Ingestion exports
pub use bus::{BusConfig, EventBus, Topic, TopicStream};
pub use driver::{Driver, DriverChannels, DriverConfig, LinkCommand};
pub use link::{FrameLink, TransportEvent};

// Recorder exports
pub use recorder::{
    DrivingDataPoint, DrivingSession, MemoryStore, RecorderTap, SessionId, SessionRecorder,
    SessionStore, SyncClient, TapHandle,
};

use std::sync::Arc;

/// Unified entry point wiring a link to a fresh event bus.
///
/// The bus is owned by the caller (the composition root) and handed to the
/// driver by handle; nothing here is global, so tests and multi-vehicle
/// setups construct as many isolated pipelines as they need.
pub struct Dashlink;

impl Dashlink {
    /// Attach a transport link to a new bus with default configuration.
    ///
    /// Returns the bus for subscribers and the driver handles for outbound
    /// commands and shutdown.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use dashlink::{Dashlink, FrameLink};
    ///
    /// # async fn demo<L: FrameLink>(link: L) {
    /// let (bus, driver) = Dashlink::attach(link);
    /// let _gauges = bus.car_state.subscribe();
    /// // ... later
    /// driver.cancel.cancel();
    /// # }
    /// ```
    pub fn attach<L: FrameLink>(link: L) -> (Arc<EventBus>, DriverChannels) {
        let bus = Arc::new(EventBus::default());
        let channels = Driver::spawn(link, Arc::clone(&bus));
        (bus, channels)
    }
}
