//! Helpers for the little-endian integers used on the wire.
//!
//! Record headers and typed payloads store every multi-byte field in
//! little-endian order. Keeping the conversions here lets protocol code read
//! fields from unaligned slices without repeating bounds arithmetic.

/// Serialise a `u16` in wire byte order.
///
/// # Examples
///
/// ```
/// use packetlink::byte_order::write_wire_u16;
///
/// assert_eq!(write_wire_u16(0x1234), [0x34, 0x12]);
/// ```
#[must_use]
pub fn write_wire_u16(value: u16) -> [u8; 2] { value.to_le_bytes() }

/// Parse a wire-order `u16`.
///
/// # Examples
///
/// ```
/// use packetlink::byte_order::read_wire_u16;
///
/// assert_eq!(read_wire_u16([0x34, 0x12]), 0x1234);
/// ```
#[must_use]
pub fn read_wire_u16(bytes: [u8; 2]) -> u16 { u16::from_le_bytes(bytes) }

/// Parse a wire-order `i16`.
#[must_use]
pub fn read_wire_i16(bytes: [u8; 2]) -> i16 { i16::from_le_bytes(bytes) }

/// Parse a wire-order `u32`.
#[must_use]
pub fn read_wire_u32(bytes: [u8; 4]) -> u32 { u32::from_le_bytes(bytes) }

/// Parse a wire-order `i32`.
#[must_use]
pub fn read_wire_i32(bytes: [u8; 4]) -> i32 { i32::from_le_bytes(bytes) }

/// Read a fixed-width field at `offset`, returning `None` when `bytes` is too
/// short.
///
/// # Examples
///
/// ```
/// use packetlink::byte_order::{field, read_wire_u16};
///
/// let bytes = [0xff, 0x02, 0x01];
/// assert_eq!(field::<2>(&bytes, 1).map(read_wire_u16), Some(0x0102));
/// assert_eq!(field::<2>(&bytes, 2), None);
/// ```
#[must_use]
pub fn field<const N: usize>(bytes: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    bytes.get(offset..end)?.try_into().ok()
}
