//! Bit and byte accessors over a right-aligned Mode S message.
//!
//! A message is carried as `(bits: u128, length_bits: u8)`, right-aligned to
//! `length_bits` (56 or 112). All offsets below are MSB-first, bit 0 being
//! the top bit of the Downlink Format field.

/// Extract `width` bits starting at MSB-first bit offset `start`.
pub fn field(bits: u128, length_bits: u8, start: u32, width: u32) -> u64 {
    debug_assert!(start + width <= length_bits as u32);
    let shift = length_bits as u32 - start - width;
    let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
    ((bits >> shift) as u64) & mask
}

/// Byte `n` (0-indexed from the start of the message).
pub fn byte(bits: u128, length_bits: u8, n: u32) -> u8 {
    field(bits, length_bits, n * 8, 8) as u8
}

/// Render the message as a big-endian byte vector, `length_bits / 8` bytes.
pub fn to_bytes(bits: u128, length_bits: u8) -> Vec<u8> {
    let n = (length_bits / 8) as u32;
    (0..n).map(|i| byte(bits, length_bits, i)).collect()
}
