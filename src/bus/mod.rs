//! Typed multi-topic event bus.
//!
//! The bus decouples the ingest driver from its consumers (gauge UI, session
//! recorder, navigation trigger). Each topic is an independent broadcast
//! channel with its own event type, so an event published on one topic is
//! not representable - let alone observable - on another.
//!
//! Buses carry no global state: construct one at the composition root and
//! hand it out by `Arc`. Tests build as many isolated buses as they like.
//!
//! ```rust
//! use dashlink::{BusConfig, EventBus};
//!
//! let bus = EventBus::new(BusConfig::default());
//! let mut tires = bus.tpms.subscribe();
//! // ... hand `bus` to the driver, poll `tires.next().await` in the UI
//! ```

mod topic;

pub use topic::{Topic, TopicStream};

use crate::car::{CarStateEvent, GuidanceEvent};
use crate::link::TransportEvent;
use crate::tpms::TpmsEvent;

/// Bus construction parameters.
#[derive(Debug, Clone, Copy)]
pub struct BusConfig {
    /// Per-subscriber ring capacity of every topic. A subscriber that falls
    /// further behind than this loses the oldest events.
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

/// The event bus: four independently typed broadcast topics.
#[derive(Debug)]
pub struct EventBus {
    /// Raw link traffic (diagnostics, frame logging).
    pub transport: Topic<TransportEvent>,
    /// Structured vehicle state: speed, engine, fuel.
    pub car_state: Topic<CarStateEvent>,
    /// Tire readings and pairing completions.
    pub tpms: Topic<TpmsEvent>,
    /// Navigation guidance lifecycle.
    pub guidance: Topic<GuidanceEvent>,
}

impl EventBus {
    /// Create a bus with all four topics at the configured capacity.
    pub fn new(config: BusConfig) -> Self {
        Self {
            transport: Topic::new(config.capacity),
            car_state: Topic::new(config.capacity),
            tpms: Topic::new(config.capacity),
            guidance: Topic::new(config.capacity),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::CarStateEvent;
    use crate::tpms::{TpmsDecoder, TpmsEvent};
    use futures::StreamExt;

    #[tokio::test]
    async fn topics_are_isolated() {
        let bus = EventBus::default();
        let mut car = bus.car_state.subscribe();
        let mut tpms = bus.tpms.subscribe();

        // Both events originate from "the same inbound frame" scenario, yet
        // each is visible only on its own topic.
        bus.car_state.publish(CarStateEvent::Speed { kmh: 50.0 });
        let mut decoder = TpmsDecoder::new();
        let events = decoder.decode(&[crate::tpms::KIND_TIRE, 0, 0x25, 0x5A, 1]).unwrap();
        for event in events {
            bus.tpms.publish(event);
        }

        assert!(matches!(car.next().await, Some(CarStateEvent::Speed { .. })));
        assert!(matches!(tpms.next().await, Some(TpmsEvent::TireUpdate(_))));

        // Nothing further on either topic
        bus.guidance.publish(crate::car::GuidanceEvent::Started { destination: None });
        assert_eq!(bus.car_state.subscriber_count(), 1);
        assert_eq!(bus.tpms.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn independent_buses_do_not_interfere() {
        let a = EventBus::default();
        let b = EventBus::default();
        let mut sub_b = b.car_state.subscribe();

        a.car_state.publish(CarStateEvent::Fuel { percent: Some(10) });
        b.car_state.publish(CarStateEvent::Fuel { percent: Some(99) });

        assert_eq!(sub_b.next().await, Some(CarStateEvent::Fuel { percent: Some(99) }));
    }
}
