//! Little-endian reads from BIN database buffers
//!
//! Every multi-byte integer in a BIN file is little-endian. These helpers
//! read them from a byte slice at an arbitrary (unaligned) offset and return
//! `None` instead of panicking when the value would extend past the slice.
//!
//! # Usage Pattern
//!
//! ```rust
//! use proxydb::endian::{read_u32_le, read_u128_le};
//!
//! let buffer = [0x78, 0x56, 0x34, 0x12, 0, 0, 0, 0];
//!
//! assert_eq!(read_u32_le(&buffer, 0), Some(0x12345678));
//! assert_eq!(read_u32_le(&buffer, 6), None);
//! assert_eq!(read_u128_le(&buffer, 0), None);
//! ```
//!
//! On little-endian targets `from_le_bytes` compiles to a plain unaligned
//! load; big-endian targets get a single byte-swap.

/// Read a u32 in little-endian format from `buffer` at `offset`
#[inline(always)]
pub fn read_u32_le(buffer: &[u8], offset: usize) -> Option<u32> {
    let bytes = buffer.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

/// Read a u128 in little-endian format from `buffer` at `offset`
///
/// IPv6 range bounds are stored as 16 little-endian bytes.
#[inline(always)]
pub fn read_u128_le(buffer: &[u8], offset: usize) -> Option<u128> {
    let bytes = buffer.get(offset..offset.checked_add(16)?)?;
    Some(u128::from_le_bytes(bytes.try_into().ok()?))
}
