//! Variable-length unsigned integers (VInts).
//!
//! Encoding is big-endian: the most significant group comes first. The first
//! byte carries `first_byte_bits - 1` value bits plus a marker bit; each byte
//! after it carries 7 value bits plus a marker bit (0x80). The marker is set
//! only on the last byte of the sequence.
//!
//! Passing fewer than 8 bits for the first byte leaves its top bits free, which
//! node encodings use for type tags ("bit stealing"). Decoding masks those bits
//! away, so tagged and untagged bytes decode to the same value.
//!
//! ```text
//! first_byte_bits = 6, value = 300 (0b1_0010_1100)
//!
//!   byte 0: tt 0 00010      tt = free for tag bits, marker clear
//!   byte 1: 1  0101100      marker set, low 7 bits
//! ```

/// Longest possible encoding. A full 64-bit value takes 10 bytes with 8 first
/// byte bits, and 11 when the first byte carries no value bits at all.
pub const MAX_VINT_LENGTH: usize = 11;

#[inline]
fn first_byte_mask(first_byte_bits: u32) -> u8 {
    ((1u16 << first_byte_bits) - 1) as u8
}

/// Returns the number of bytes `value` occupies when encoded with
/// `first_byte_bits` bits available in the first byte.
///
/// `first_byte_bits` must be in `1..=8`.
pub fn length_for_unsigned(value: u64, first_byte_bits: u32) -> usize {
    debug_assert!((1..=8).contains(&first_byte_bits));
    let mut rest = value >> (first_byte_bits - 1);
    let mut bytes = 1;
    while rest != 0 {
        rest >>= 7;
        bytes += 1;
    }
    bytes
}

/// Encodes `value` into `buf` starting at `offset`, returning the offset just
/// past the last byte written.
///
/// Bits of the first byte above `first_byte_bits` are written as zero so the
/// caller can OR a tag into them afterwards.
///
/// # Panics
///
/// Panics if `buf` has fewer than [`length_for_unsigned`] bytes available at
/// `offset`.
pub fn unsigned_to_bytes(value: u64, first_byte_bits: u32, buf: &mut [u8], offset: usize) -> usize {
    let len = length_for_unsigned(value, first_byte_bits);
    let end = offset + len;
    if len == 1 {
        buf[offset] = (value as u8) | (1 << (first_byte_bits - 1));
        return end;
    }

    let mut rest = value;
    buf[end - 1] = (rest as u8 & 0x7F) | 0x80;
    rest >>= 7;
    for ptr in (offset + 1..end - 1).rev() {
        buf[ptr] = rest as u8 & 0x7F;
        rest >>= 7;
    }
    // Whatever remains fits in the first byte's value bits
    buf[offset] = rest as u8;
    end
}

/// Decodes a value written by [`unsigned_to_bytes`], returning it along with
/// the offset of the first byte after it.
///
/// # Panics
///
/// Panics if the encoding runs past the end of `buf`. Use
/// [`try_bytes_to_unsigned`] for untrusted input.
pub fn bytes_to_unsigned(first_byte_bits: u32, buf: &[u8], offset: usize) -> (u64, usize) {
    let first = buf[offset] & first_byte_mask(first_byte_bits);
    let marker = 1u8 << (first_byte_bits - 1);
    if first & marker != 0 {
        return (u64::from(first ^ marker), offset + 1);
    }

    let mut value = u64::from(first);
    let mut ptr = offset + 1;
    loop {
        let b = buf[ptr];
        ptr += 1;
        value = (value << 7) | u64::from(b & 0x7F);
        if b & 0x80 != 0 {
            return (value, ptr);
        }
    }
}

/// Bounds-checked form of [`bytes_to_unsigned`].
///
/// Returns `None` if the encoding is truncated or longer than
/// [`MAX_VINT_LENGTH`] bytes.
pub fn try_bytes_to_unsigned(first_byte_bits: u32, buf: &[u8], offset: usize) -> Option<(u64, usize)> {
    read_unsigned_with(first_byte_bits, offset, |ptr| buf.get(ptr).copied())
}

/// Decodes a VInt through a byte accessor, so any storage that can hand out
/// single bytes can be decoded without first being copied into a slice.
pub fn read_unsigned_with<F>(first_byte_bits: u32, offset: usize, mut byte_at: F) -> Option<(u64, usize)>
where
    F: FnMut(usize) -> Option<u8>,
{
    let first = byte_at(offset)? & first_byte_mask(first_byte_bits);
    let marker = 1u8 << (first_byte_bits - 1);
    if first & marker != 0 {
        return Some((u64::from(first ^ marker), offset + 1));
    }

    let mut value = u64::from(first);
    let mut ptr = offset + 1;
    let limit = offset + MAX_VINT_LENGTH;
    while ptr < limit {
        let b = byte_at(ptr)?;
        ptr += 1;
        value = (value << 7) | u64::from(b & 0x7F);
        if b & 0x80 != 0 {
            return Some((value, ptr));
        }
    }
    None
}
