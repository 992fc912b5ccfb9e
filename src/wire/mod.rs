//! Wire-level primitives for the in-vehicle serial/Bluetooth protocol.
//!
//! Everything above this module (TPMS decode, car-state decode, outbound
//! command construction) is built from three small pieces:
//!
//! - [`bits`] - pure bit/nibble extraction and little-endian assembly, with
//!   masking that keeps signed transport bytes from sign-extending
//! - [`text`] - the 16-bit character codec, big-endian inbound and
//!   low-byte-first outbound (deliberately asymmetric; see the module docs)
//! - [`frame`] - the outbound envelope with sync bytes, length field, and
//!   additive checksum

mod bits;
mod frame;
mod text;

pub use bits::{assemble16_le, assemble32_le, bit, high_nibble, low_nibble, to_unsigned};
pub use frame::{RawFrame, SYNC, checksum8, encode_frame};
pub use text::{decode_text_16be, encode_text_16be, is_non_empty};
