//! TPMS frame decoder and pairing state machine.

use tracing::{debug, trace};

use super::slot::{
    PRESSURE_UNAVAILABLE, PairingState, RAW_UNAVAILABLE, STATUS_INVALID, TEMPERATURE_UNAVAILABLE,
    TireSnapshot, TpmsEvent, WheelId, WheelSlot,
};
use crate::wire;
use crate::{Result, TelemetryError};

/// Message kind: pairing status for one wheel slot.
pub const KIND_PAIRING: u8 = 0x00;

/// Message kind: tire pressure/temperature/status reading.
pub const KIND_TIRE: u8 = 0x04;

/// Outbound command byte for a pairing request.
pub const CMD_PAIR: u8 = 0x04;

// Pairing transition codes carried in the low nibble of the status byte.
const CODE_PAIRING: u8 = 0;
const CODE_PAIRED: u8 = 1;
const CODE_FAILED: u8 = 2;

/// Decoder for inbound TPMS sub-frames, owning the four wheel slots.
///
/// Exactly one execution context may decode at a time: `decode` takes
/// `&mut self`, and concurrent use of one decoder requires external
/// serialization. The ingest driver satisfies this by owning the decoder
/// inside its single task.
#[derive(Debug, Default)]
pub struct TpmsDecoder {
    slots: [WheelSlot; 4],
}

impl TpmsDecoder {
    /// Create a decoder with all four slots idle and unread.
    pub fn new() -> Self {
        Self::default()
    }

    /// All four wheel slots, in [`WheelId`] index order.
    pub fn slots(&self) -> &[WheelSlot; 4] {
        &self.slots
    }

    /// State of a single wheel slot.
    pub fn slot(&self, wheel: WheelId) -> &WheelSlot {
        &self.slots[wheel.index()]
    }

    /// Decode one inbound frame and return the events it produced.
    ///
    /// Byte 0 is the message kind; the payload follows. Unknown kinds return
    /// no events (forward compatibility). Short frames fail with
    /// [`TelemetryError::FrameTooShort`] and never read out of bounds; the
    /// caller should discard the frame and keep listening.
    pub fn decode(&mut self, frame: &[u8]) -> Result<Vec<TpmsEvent>> {
        let Some(&kind) = frame.first() else {
            return Err(TelemetryError::frame_too_short(0, 1, 0));
        };
        match kind {
            KIND_PAIRING => self.apply_pairing(&frame[1..]),
            KIND_TIRE => self.apply_reading(frame),
            other => {
                trace!(kind = other, "ignoring unknown tpms message kind");
                Ok(Vec::new())
            }
        }
    }

    /// Apply a pairing-status payload: high nibble of the status byte is the
    /// slot index, low nibble the transition code. A success message may carry
    /// four trailing bytes with the sensor identity.
    fn apply_pairing(&mut self, payload: &[u8]) -> Result<Vec<TpmsEvent>> {
        let Some(&status) = payload.first() else {
            return Err(TelemetryError::frame_too_short(KIND_PAIRING, 2, 1));
        };
        let index = wire::high_nibble(status);
        let code = wire::low_nibble(status);

        let Some(wheel) = WheelId::from_index(index) else {
            debug!(index, "ignoring pairing status for out-of-range slot");
            return Ok(Vec::new());
        };

        let slot = &mut self.slots[wheel.index()];
        match code {
            CODE_PAIRING => {
                slot.pairing = PairingState::Pairing;
                Ok(Vec::new())
            }
            CODE_PAIRED => {
                slot.pairing = PairingState::Paired;
                if let [id0, id1, id2, id3, ..] = payload[1..] {
                    slot.pairing_id = wire::assemble32_le(id0, id1, id2, id3);
                }
                debug!(?wheel, pairing_id = slot.pairing_id, "wheel paired");
                let snapshot = slot.snapshot(wheel);
                Ok(vec![TpmsEvent::PairingComplete { wheel, snapshot }])
            }
            CODE_FAILED => {
                slot.pairing = PairingState::Failed;
                debug!(?wheel, "pairing failed");
                Ok(Vec::new())
            }
            other => {
                trace!(code = other, "ignoring unknown pairing code");
                Ok(Vec::new())
            }
        }
    }

    /// Apply a tire-reading frame: `(slot, pressure, temperature, status)`
    /// payload bytes after the kind byte.
    fn apply_reading(&mut self, frame: &[u8]) -> Result<Vec<TpmsEvent>> {
        let [_, index, raw_pressure, raw_temperature, raw_status, ..] = *frame else {
            return Err(TelemetryError::frame_too_short(KIND_TIRE, 5, frame.len()));
        };

        let Some(wheel) = WheelId::from_index(index) else {
            debug!(index, "ignoring tire reading for out-of-range slot");
            return Ok(Vec::new());
        };

        let slot = &mut self.slots[wheel.index()];
        let previous_status = slot.tire_status;
        let previous_pressure = slot.pressure_bar;

        if raw_pressure != RAW_UNAVAILABLE {
            slot.pressure_bar = f32::from(wire::high_nibble(raw_pressure))
                + f32::from(wire::low_nibble(raw_pressure)) / 10.0;
            slot.tire_status = i16::from(raw_status);
        } else {
            // No pressure reading also invalidates the status, whatever the
            // sensor claims. The temperature sentinel below does not; the
            // asymmetry is part of the protocol.
            slot.pressure_bar = PRESSURE_UNAVAILABLE;
            slot.tire_status = STATUS_INVALID;
        }

        slot.temperature_c = if raw_temperature != RAW_UNAVAILABLE {
            i16::from(raw_temperature) - 40
        } else {
            TEMPERATURE_UNAVAILABLE
        };

        // Notify on a status change, and always on the first reading after
        // the slot was unknown, even if numerically unchanged.
        if slot.tire_status != previous_status || previous_pressure == PRESSURE_UNAVAILABLE {
            Ok(vec![TpmsEvent::TireUpdate(slot.snapshot(wheel))])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Build the outbound pairing-request frame for one wheel.
///
/// Payload is `{0x00, slot << 4}` wrapped in the standard envelope; for slot
/// index 1 the full frame is `[0xFF, 0x55, 0x03, 0x04, 0x00, 0x10, 0x17]`.
pub fn pairing_request(wheel: WheelId) -> Vec<u8> {
    let payload = [0x00, (wheel.index() as u8 & 0x0F) << 4];
    wire::encode_frame(CMD_PAIR, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tire_frame(slot: u8, pressure: u8, temperature: u8, status: u8) -> Vec<u8> {
        vec![KIND_TIRE, slot, pressure, temperature, status]
    }

    fn pairing_frame(slot: u8, code: u8) -> Vec<u8> {
        vec![KIND_PAIRING, (slot << 4) | (code & 0x0F)]
    }

    #[test]
    fn pairing_sequence_transitions_one_slot_only() {
        let mut decoder = TpmsDecoder::new();

        decoder.decode(&pairing_frame(2, 0)).unwrap();
        assert_eq!(decoder.slot(WheelId::RearLeft).pairing, PairingState::Pairing);

        let events = decoder.decode(&pairing_frame(2, 1)).unwrap();
        assert_eq!(decoder.slot(WheelId::RearLeft).pairing, PairingState::Paired);
        assert!(
            matches!(events.as_slice(), [TpmsEvent::PairingComplete { wheel: WheelId::RearLeft, .. }])
        );

        // The other three slots never moved
        for wheel in [WheelId::FrontLeft, WheelId::FrontRight, WheelId::RearRight] {
            assert_eq!(decoder.slot(wheel).pairing, PairingState::Idle);
        }
    }

    #[test]
    fn out_of_range_slot_index_is_ignored() {
        let mut decoder = TpmsDecoder::new();
        let events = decoder.decode(&pairing_frame(7, 1)).unwrap();
        assert!(events.is_empty());
        for wheel in WheelId::ALL {
            assert_eq!(decoder.slot(wheel).pairing, PairingState::Idle);
        }

        let events = decoder.decode(&tire_frame(9, 0x25, 0x5A, 1)).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn pairing_failure_transitions_to_failed() {
        let mut decoder = TpmsDecoder::new();
        let events = decoder.decode(&pairing_frame(0, 2)).unwrap();
        assert!(events.is_empty());
        assert_eq!(decoder.slot(WheelId::FrontLeft).pairing, PairingState::Failed);
    }

    #[test]
    fn unknown_pairing_code_is_ignored() {
        let mut decoder = TpmsDecoder::new();
        let events = decoder.decode(&pairing_frame(1, 9)).unwrap();
        assert!(events.is_empty());
        assert_eq!(decoder.slot(WheelId::FrontRight).pairing, PairingState::Idle);
    }

    #[test]
    fn paired_message_binds_sensor_identity() {
        let mut decoder = TpmsDecoder::new();
        let mut frame = pairing_frame(3, 1);
        frame.extend_from_slice(&[0x78, 0x56, 0x34, 0x12]);
        decoder.decode(&frame).unwrap();
        assert_eq!(decoder.slot(WheelId::RearRight).pairing_id, 0x1234_5678);
    }

    #[test]
    fn paired_message_without_identity_still_transitions() {
        let mut decoder = TpmsDecoder::new();
        decoder.decode(&pairing_frame(0, 1)).unwrap();
        assert_eq!(decoder.slot(WheelId::FrontLeft).pairing, PairingState::Paired);
        assert_eq!(decoder.slot(WheelId::FrontLeft).pairing_id, 0);
    }

    #[test]
    fn tire_reading_decodes_fixed_point_pressure() {
        let mut decoder = TpmsDecoder::new();
        // high nibble 2, low nibble 5 -> 2.5 bar
        let events = decoder.decode(&tire_frame(0, 0x25, 0x5A, 1)).unwrap();

        let slot = decoder.slot(WheelId::FrontLeft);
        assert_eq!(slot.pressure_bar, 2.5);
        assert_eq!(slot.temperature_c, 50); // 0x5A = 90, offset -40
        assert_eq!(slot.tire_status, 1);

        let [TpmsEvent::TireUpdate(snap)] = events.as_slice() else {
            panic!("expected one TireUpdate, got {events:?}");
        };
        assert_eq!(snap.pressure_bar, Some(2.5));
        assert_eq!(snap.temperature_c, Some(50));
        assert_eq!(snap.status, Some(1));
    }

    #[test]
    fn pressure_sentinel_forces_status_invalid() {
        let mut decoder = TpmsDecoder::new();
        decoder.decode(&tire_frame(1, 0x25, 0x5A, 1)).unwrap();

        // Sensor reports no pressure but claims status 3; status must go to -1
        decoder.decode(&tire_frame(1, 0xFF, 0x5A, 3)).unwrap();
        let slot = decoder.slot(WheelId::FrontRight);
        assert_eq!(slot.pressure_bar, PRESSURE_UNAVAILABLE);
        assert_eq!(slot.tire_status, STATUS_INVALID);
        // Temperature path is untouched by the pressure sentinel
        assert_eq!(slot.temperature_c, 50);
    }

    #[test]
    fn temperature_sentinel_does_not_touch_status() {
        let mut decoder = TpmsDecoder::new();
        decoder.decode(&tire_frame(2, 0x30, 0xFF, 2)).unwrap();
        let slot = decoder.slot(WheelId::RearLeft);
        assert_eq!(slot.pressure_bar, 3.0);
        assert_eq!(slot.temperature_c, TEMPERATURE_UNAVAILABLE);
        assert_eq!(slot.tire_status, 2);
    }

    #[test]
    fn first_reading_after_unknown_always_notifies() {
        let mut decoder = TpmsDecoder::new();

        // Fresh slot: pressure is the sentinel, so the first reading notifies
        let events = decoder.decode(&tire_frame(0, 0x20, 0x50, 0)).unwrap();
        assert_eq!(events.len(), 1);

        // Same status, real pressure already present: no notification
        let events = decoder.decode(&tire_frame(0, 0x21, 0x50, 0)).unwrap();
        assert!(events.is_empty());

        // Status change notifies
        let events = decoder.decode(&tire_frame(0, 0x21, 0x50, 1)).unwrap();
        assert_eq!(events.len(), 1);

        // Back to sentinel (notifies via status -1), then a numerically
        // unchanged real reading must notify again
        decoder.decode(&tire_frame(0, 0xFF, 0x50, 1)).unwrap();
        let events = decoder.decode(&tire_frame(0, 0x21, 0x50, 255)).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn short_frames_fail_without_reading_out_of_bounds() {
        let mut decoder = TpmsDecoder::new();

        let err = decoder.decode(&[]).unwrap_err();
        assert!(matches!(err, TelemetryError::FrameTooShort { .. }));

        let err = decoder.decode(&[KIND_PAIRING]).unwrap_err();
        assert!(matches!(err, TelemetryError::FrameTooShort { kind: KIND_PAIRING, .. }));

        let err = decoder.decode(&[KIND_TIRE, 0, 0x25]).unwrap_err();
        assert!(
            matches!(err, TelemetryError::FrameTooShort { kind: KIND_TIRE, needed: 5, actual: 3 })
        );

        // Decoder state is untouched by the bad frames
        for wheel in WheelId::ALL {
            assert_eq!(decoder.slot(wheel).pressure_bar, PRESSURE_UNAVAILABLE);
        }
    }

    #[test]
    fn unknown_message_kind_is_ignored() {
        let mut decoder = TpmsDecoder::new();
        let events = decoder.decode(&[0x7F, 1, 2, 3]).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn pairing_request_frame_is_byte_exact() {
        assert_eq!(
            pairing_request(WheelId::FrontRight),
            vec![0xFF, 0x55, 0x03, 0x04, 0x00, 0x10, 0x17]
        );
        assert_eq!(
            pairing_request(WheelId::FrontLeft),
            vec![0xFF, 0x55, 0x03, 0x04, 0x00, 0x00, 0x07]
        );
        assert_eq!(
            pairing_request(WheelId::RearRight),
            vec![0xFF, 0x55, 0x03, 0x04, 0x00, 0x30, 0x37]
        );
    }
}
