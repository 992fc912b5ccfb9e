//! Outbound frame envelope and checksum.
//!
//! Frames sent to the vehicle hardware carry a fixed envelope:
//!
//! ```text
//! [0xFF, 0x55, len+1, command, payload..., checksum]
//! ```
//!
//! where `len` is the payload length and `checksum` is the 8-bit additive sum
//! of every byte from the length field through the last payload byte. The
//! receiving hardware rejects anything that deviates from this layout.

use std::sync::Arc;

/// An immutable frame as received from or destined for the transport.
///
/// Cheap to clone into broadcast events; never mutated in place.
pub type RawFrame = Arc<[u8]>;

/// Leading synchronization bytes of every outbound frame.
pub const SYNC: [u8; 2] = [0xFF, 0x55];

/// 8-bit additive checksum: sum of all bytes, masked to 8 bits.
pub fn checksum8(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Wrap a command and payload in the outbound envelope.
///
/// The checksum covers `len+1`, the command byte, and the payload - not the
/// sync bytes.
pub fn encode_frame(command: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 5);
    frame.extend_from_slice(&SYNC);
    frame.push(payload.len() as u8 + 1);
    frame.push(command);
    frame.extend_from_slice(payload);
    let checksum = checksum8(&frame[2..]);
    frame.push(checksum);
    frame
}
