//! Tire pressure monitor decoding and pairing.
//!
//! The TPMS layer consumes inbound sub-frames from the vehicle link and
//! maintains four independent wheel slots. Two message kinds matter:
//! pairing-status updates drive a per-slot state machine
//! (`Idle -> Pairing -> Paired | Failed`), and tire readings update the
//! slot's pressure/temperature/status with 0xFF meaning "no reading".
//!
//! Decoded changes surface as [`TpmsEvent`]s carrying value snapshots;
//! [`pairing_request`] builds the outbound frame that asks the hardware to
//! pair a wheel.

mod decoder;
mod slot;

pub use decoder::{CMD_PAIR, KIND_PAIRING, KIND_TIRE, TpmsDecoder, pairing_request};
pub use slot::{
    PRESSURE_UNAVAILABLE, PairingState, RAW_UNAVAILABLE, STATUS_INVALID, TEMPERATURE_UNAVAILABLE,
    TireSnapshot, TpmsEvent, WheelId, WheelSlot,
};
