//! Car-state and navigation-guidance frame decode.
//!
//! These message kinds share the inbound kind-space with the TPMS kinds and
//! carry the structured telemetry that the gauge UI and the session recorder
//! consume: speed, engine, fuel, and the guidance-start marker with its
//! destination text.

use serde::{Deserialize, Serialize};

use crate::wire;
use crate::{Result, TelemetryError};

/// Message kind: vehicle speed, 16-bit LE hundredths of km/h.
pub const KIND_SPEED: u8 = 0x01;

/// Message kind: engine rpm (16-bit LE) and coolant temperature (offset-40).
pub const KIND_ENGINE: u8 = 0x02;

/// Message kind: fuel level percent; 0xFF means no reading.
pub const KIND_FUEL: u8 = 0x03;

/// Message kind: turn-by-turn guidance started, destination text follows.
pub const KIND_GUIDANCE: u8 = 0x05;

/// Structured vehicle state published on the car-state topic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CarStateEvent {
    Speed { kmh: f32 },
    Engine { rpm: u16, coolant_c: Option<i16> },
    Fuel { percent: Option<u8> },
}

/// Navigation events published on the guidance topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GuidanceEvent {
    /// Turn-by-turn guidance started; `None` when the head unit sent no
    /// destination name.
    Started { destination: Option<String> },
}

/// Decode a car-state frame. Returns `Ok(None)` for kinds this module does
/// not handle.
pub fn decode_car_state(frame: &[u8]) -> Result<Option<CarStateEvent>> {
    match *frame {
        [KIND_SPEED, b0, b1, ..] => {
            let raw = wire::assemble16_le(b0, b1);
            Ok(Some(CarStateEvent::Speed { kmh: f32::from(raw) / 100.0 }))
        }
        [KIND_SPEED, ..] => Err(TelemetryError::frame_too_short(KIND_SPEED, 3, frame.len())),
        [KIND_ENGINE, b0, b1, raw_coolant, ..] => {
            let coolant_c =
                (raw_coolant != 0xFF).then(|| i16::from(raw_coolant) - 40);
            Ok(Some(CarStateEvent::Engine { rpm: wire::assemble16_le(b0, b1), coolant_c }))
        }
        [KIND_ENGINE, ..] => Err(TelemetryError::frame_too_short(KIND_ENGINE, 4, frame.len())),
        [KIND_FUEL, raw, ..] => {
            Ok(Some(CarStateEvent::Fuel { percent: (raw != 0xFF).then_some(raw) }))
        }
        [KIND_FUEL] => Err(TelemetryError::frame_too_short(KIND_FUEL, 2, 1)),
        _ => Ok(None),
    }
}

/// Decode a guidance-start frame. The payload after the kind byte is the
/// destination name in the 16-bit big-endian text encoding; an empty or
/// absent name decodes to `None`.
pub fn decode_guidance(frame: &[u8]) -> Result<Option<GuidanceEvent>> {
    match frame {
        [KIND_GUIDANCE, ..] => {
            let destination = wire::decode_text_16be(frame, 1, frame.len());
            let destination = wire::is_non_empty(Some(&destination)).then_some(destination);
            Ok(Some(GuidanceEvent::Started { destination }))
        }
        _ => Ok(None),
    }
}
