//! Utility functions for PNG chunk operations

use byteorder::{BigEndian, ByteOrder};
use crc32fast::Hasher;

/// The fixed 8-byte PNG signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Largest chunk data length a PNG length field may declare
pub const MAX_CHUNK_LENGTH: u32 = 0x7FFF_FFFF;

/// Calculate the CRC-32 of a chunk over its type and data
pub fn chunk_crc(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    hasher.finalize()
}

/// Read a big-endian u32 from byte slice, `None` if fewer than 4 bytes remain
pub fn read_u32_be(bytes: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    bytes.get(offset..end).map(BigEndian::read_u32)
}

/// Append a big-endian u32 to a buffer
pub fn push_u32_be(out: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    BigEndian::write_u32(&mut buf, value);
    out.extend_from_slice(&buf);
}

/// Validate PNG signature
pub fn is_png_signature(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}
