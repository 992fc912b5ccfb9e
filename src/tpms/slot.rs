//! Wheel slot model and decoded TPMS events.

use serde::{Deserialize, Serialize};

/// Raw byte value meaning "no valid reading" for pressure and temperature.
pub const RAW_UNAVAILABLE: u8 = 0xFF;

/// Slot pressure value while no reading is available.
pub const PRESSURE_UNAVAILABLE: f32 = 255.0;

/// Slot temperature value while no reading is available.
pub const TEMPERATURE_UNAVAILABLE: i16 = 255;

/// Slot status value while the status is invalid or unknown.
pub const STATUS_INVALID: i16 = -1;

/// One of the four fixed wheel positions tracked by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelId {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl WheelId {
    /// All four wheels in slot order.
    pub const ALL: [WheelId; 4] =
        [WheelId::FrontLeft, WheelId::FrontRight, WheelId::RearLeft, WheelId::RearRight];

    /// Map a protocol slot index to a wheel. Indices outside 0..4 have no
    /// wheel; the hardware should never emit them, but frames that do are
    /// dropped rather than faulted on.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(WheelId::FrontLeft),
            1 => Some(WheelId::FrontRight),
            2 => Some(WheelId::RearLeft),
            3 => Some(WheelId::RearRight),
            _ => None,
        }
    }

    /// Protocol slot index of this wheel.
    pub fn index(self) -> usize {
        match self {
            WheelId::FrontLeft => 0,
            WheelId::FrontRight => 1,
            WheelId::RearLeft => 2,
            WheelId::RearRight => 3,
        }
    }
}

/// Pairing lifecycle of one wheel slot.
///
/// A slot transitions only in response to a pairing-status message addressed
/// to its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PairingState {
    #[default]
    Idle,
    Pairing,
    Paired,
    Failed,
}

/// Mutable per-wheel state owned by the decoder.
///
/// Fields keep the wire-level sentinel values (255.0 / 255 / -1) because the
/// notification rules are defined over them; consumers get [`TireSnapshot`]s
/// with the sentinels translated away.
#[derive(Debug, Clone)]
pub struct WheelSlot {
    /// Sensor identity bound during pairing; 0 until a sensor pairs.
    pub pairing_id: u32,
    /// Pressure in bar; [`PRESSURE_UNAVAILABLE`] while no reading exists.
    pub pressure_bar: f32,
    /// Temperature in Celsius; [`TEMPERATURE_UNAVAILABLE`] while no reading exists.
    pub temperature_c: i16,
    /// Sensor status code; [`STATUS_INVALID`] while invalid or unknown.
    pub tire_status: i16,
    /// Pairing lifecycle state.
    pub pairing: PairingState,
}

impl Default for WheelSlot {
    fn default() -> Self {
        Self {
            pairing_id: 0,
            pressure_bar: PRESSURE_UNAVAILABLE,
            temperature_c: TEMPERATURE_UNAVAILABLE,
            tire_status: STATUS_INVALID,
            pairing: PairingState::Idle,
        }
    }
}

impl WheelSlot {
    /// Value snapshot for consumers, with sentinels surfaced as `None`.
    ///
    /// Snapshots do not alias the slot: later decode-path mutation is never
    /// observable through an emitted event.
    pub fn snapshot(&self, wheel: WheelId) -> TireSnapshot {
        TireSnapshot {
            wheel,
            pressure_bar: (self.pressure_bar != PRESSURE_UNAVAILABLE).then_some(self.pressure_bar),
            temperature_c: (self.temperature_c != TEMPERATURE_UNAVAILABLE)
                .then_some(self.temperature_c),
            status: u8::try_from(self.tire_status).ok(),
        }
    }
}

/// Decoded per-wheel reading emitted to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TireSnapshot {
    pub wheel: WheelId,
    /// Pressure in bar; `None` while the sensor reports no reading.
    pub pressure_bar: Option<f32>,
    /// Temperature in Celsius; `None` while the sensor reports no reading.
    pub temperature_c: Option<i16>,
    /// Sensor status code; `None` while invalid or unknown.
    pub status: Option<u8>,
}

/// Events published on the TPMS topic.
#[derive(Debug, Clone, PartialEq)]
pub enum TpmsEvent {
    /// A tire reading whose status changed, or the first real reading after
    /// the slot was unknown.
    TireUpdate(TireSnapshot),
    /// A wheel finished pairing; carries the slot's state at that moment.
    PairingComplete { wheel: WheelId, snapshot: TireSnapshot },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_index_round_trip() {
        for wheel in WheelId::ALL {
            assert_eq!(WheelId::from_index(wheel.index() as u8), Some(wheel));
        }
        assert_eq!(WheelId::from_index(4), None);
        assert_eq!(WheelId::from_index(7), None);
        assert_eq!(WheelId::from_index(255), None);
    }

    #[test]
    fn fresh_slot_is_all_sentinels() {
        let slot = WheelSlot::default();
        assert_eq!(slot.pressure_bar, PRESSURE_UNAVAILABLE);
        assert_eq!(slot.temperature_c, TEMPERATURE_UNAVAILABLE);
        assert_eq!(slot.tire_status, STATUS_INVALID);
        assert_eq!(slot.pairing, PairingState::Idle);
    }

    #[test]
    fn snapshot_translates_sentinels_to_none() {
        let slot = WheelSlot::default();
        let snap = slot.snapshot(WheelId::FrontLeft);
        assert_eq!(snap.pressure_bar, None);
        assert_eq!(snap.temperature_c, None);
        assert_eq!(snap.status, None);
    }

    #[test]
    fn snapshot_carries_real_values() {
        let slot = WheelSlot {
            pairing_id: 0xDEAD_BEEF,
            pressure_bar: 2.5,
            temperature_c: 50,
            tire_status: 1,
            pairing: PairingState::Paired,
        };
        let snap = slot.snapshot(WheelId::RearRight);
        assert_eq!(snap.wheel, WheelId::RearRight);
        assert_eq!(snap.pressure_bar, Some(2.5));
        assert_eq!(snap.temperature_c, Some(50));
        assert_eq!(snap.status, Some(1));
    }
}
