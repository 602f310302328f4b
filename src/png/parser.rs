//! Low-level PNG chunk parsing over explicit byte spans

use crate::utils::{MAX_CHUNK_LENGTH, chunk_crc, is_png_signature, read_u32_be};
use crate::{PngTextError, PngTextResult};

/// PNG chunk structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub chunk_type: [u8; 4],
    pub data: Vec<u8>,
    /// CRC as read from the stream. Never trusted on serialization.
    pub crc: u32,
    /// Offset of the chunk's length field in the source stream, `None` for built chunks
    pub offset: Option<usize>,
}

impl Chunk {
    /// Build a new chunk with a freshly computed CRC
    pub fn new(chunk_type: [u8; 4], data: Vec<u8>) -> Self {
        let crc = chunk_crc(&chunk_type, &data);
        Self {
            chunk_type,
            data,
            crc,
            offset: None,
        }
    }

    /// Length of the chunk data as written to the length field
    pub fn length(&self) -> usize {
        self.data.len()
    }

    pub fn is_type(&self, chunk_type: &[u8; 4]) -> bool {
        &self.chunk_type == chunk_type
    }

    /// Chunk type as a printable string
    pub fn type_name(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).to_string()
    }
}

/// Ordered chunk sequence of a PNG stream
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPng {
    pub chunks: Vec<Chunk>,
    /// Bytes following the IEND chunk, re-appended verbatim on serialization
    pub trailer: Vec<u8>,
}

/// Parse PNG chunks from byte data, stopping after IEND
pub fn parse_png_chunks(data: &[u8]) -> PngTextResult<ParsedPng> {
    if !is_png_signature(data) {
        return Err(PngTextError::NotAPng);
    }

    let mut offset = super::PNG_SIGNATURE_LEN;
    let mut chunks = Vec::new();

    loop {
        if offset == data.len() {
            return Err(PngTextError::MissingChunk("IEND"));
        }

        let chunk = parse_chunk_at(data, offset)?;
        let chunk_end = offset + 12 + chunk.data.len();

        if chunks.is_empty() && !chunk.is_type(super::IHDR) {
            return Err(PngTextError::MissingChunk("IHDR"));
        }

        let is_end = chunk.is_type(super::IEND);
        chunks.push(chunk);
        offset = chunk_end;

        if is_end {
            break;
        }
    }

    Ok(ParsedPng {
        chunks,
        trailer: data[offset..].to_vec(),
    })
}

/// Parse the single chunk whose length field starts at `offset`
fn parse_chunk_at(data: &[u8], offset: usize) -> PngTextResult<Chunk> {
    let length = read_u32_be(data, offset).ok_or(PngTextError::TruncatedChunk { offset })?;
    if length > MAX_CHUNK_LENGTH {
        return Err(PngTextError::InvalidChunkLength { offset, length });
    }

    let type_start = offset + 4;
    let data_start = type_start + 4;
    let chunk_type: [u8; 4] = data
        .get(type_start..data_start)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(PngTextError::TruncatedChunk { offset })?;

    let data_end = data_start
        .checked_add(length as usize)
        .ok_or(PngTextError::TruncatedChunk { offset })?;
    let chunk_data = data
        .get(data_start..data_end)
        .ok_or(PngTextError::TruncatedChunk { offset })?;
    let stored = read_u32_be(data, data_end).ok_or(PngTextError::TruncatedChunk { offset })?;

    let computed = chunk_crc(&chunk_type, chunk_data);
    PngTextError::validate_png_chunk(&chunk_type, offset, stored, computed)?;

    Ok(Chunk {
        chunk_type,
        data: chunk_data.to_vec(),
        crc: stored,
        offset: Some(offset),
    })
}

/// Get all chunks of the given type, in stream order
pub fn find_chunks_of_type<'a>(
    png: &'a ParsedPng,
    chunk_type: &'a [u8; 4],
) -> impl Iterator<Item = (usize, &'a Chunk)> + 'a {
    png.chunks
        .iter()
        .enumerate()
        .filter(move |(_, c)| c.is_type(chunk_type))
}
