#![allow(dead_code)]

use png_text::Chunk;
use png_text::png::parse_png_chunks;
use png_text::utils::{PNG_SIGNATURE, chunk_crc, push_u32_be};

pub const IHDR_1X1_GRAY: [u8; 13] = [0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0];

/// zlib stored block holding one scanline: filter byte 0, pixel 0
pub const IDAT_1X1_GRAY: [u8; 13] = [
    0x78, 0x01, 0x01, 0x02, 0x00, 0xFD, 0xFF, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01,
];

pub fn chunk_bytes(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 12);
    push_u32_be(&mut out, data.len() as u32);
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    push_u32_be(&mut out, chunk_crc(chunk_type, data));
    out
}

/// 1x1 grayscale PNG with extra chunks placed around IDAT
pub fn grayscale_1x1_with(
    before_idat: &[(&[u8; 4], Vec<u8>)],
    after_idat: &[(&[u8; 4], Vec<u8>)],
) -> Vec<u8> {
    let mut png = PNG_SIGNATURE.to_vec();
    png.extend(chunk_bytes(b"IHDR", &IHDR_1X1_GRAY));
    for (chunk_type, data) in before_idat {
        png.extend(chunk_bytes(chunk_type, data));
    }
    png.extend(chunk_bytes(b"IDAT", &IDAT_1X1_GRAY));
    for (chunk_type, data) in after_idat {
        png.extend(chunk_bytes(chunk_type, data));
    }
    png.extend(chunk_bytes(b"IEND", &[]));
    png
}

pub fn grayscale_1x1() -> Vec<u8> {
    grayscale_1x1_with(&[], &[])
}

/// Chunks that are not tEXt, in stream order
pub fn non_text_chunks(bytes: &[u8]) -> Vec<Chunk> {
    parse_png_chunks(bytes)
        .expect("valid PNG")
        .chunks
        .into_iter()
        .filter(|c| !c.is_type(b"tEXt"))
        .map(|mut c| {
            c.offset = None;
            c
        })
        .collect()
}
