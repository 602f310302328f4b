//! Key/value view over PNG `tEXt` chunks
//!
//! A `tEXt` payload is `keyword | 0x00 | text`, both Latin-1, with the chunk
//! length as the only terminator. Payloads are always split from the raw
//! chunk data span, so bytes after the separator are never lost to implicit
//! NUL termination.

use std::collections::BTreeMap;

use crate::png::{self, Chunk, ParsedPng, TEXT, parse_png_chunks};
use crate::utils::MAX_CHUNK_LENGTH;
use crate::{PngTextError, PngTextResult};

/// Keyword to text mapping. Keys are unique; iteration is in key order.
pub type Metadata = BTreeMap<String, String>;

/// A single keyword/text pair carried by one `tEXt` chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub keyword: String,
    pub text: String,
}

/// A `tEXt` chunk that was passed over during extraction
#[derive(Debug)]
pub struct SkippedChunk {
    /// Position of the chunk in the stream's chunk sequence
    pub chunk_index: usize,
    pub reason: PngTextError,
}

/// Result of decoding all `tEXt` chunks of a stream
#[derive(Debug, Default)]
pub struct Extraction {
    pub metadata: Metadata,
    pub skipped: Vec<SkippedChunk>,
}

impl TextEntry {
    /// Create an entry, checking it can be written as a `tEXt` chunk
    pub fn new(keyword: impl Into<String>, text: impl Into<String>) -> PngTextResult<Self> {
        let entry = Self {
            keyword: keyword.into(),
            text: text.into(),
        };
        validate_entry(&entry.keyword, &entry.text)?;
        Ok(entry)
    }

    /// Decode a `tEXt` payload, splitting at the first NUL byte
    pub fn from_chunk_data(data: &[u8], chunk_index: usize) -> PngTextResult<Self> {
        let separator = data
            .iter()
            .position(|&b| b == 0)
            .ok_or(PngTextError::MissingSeparator { chunk_index })?;

        let keyword = decode_latin1(&data[..separator]);
        let text = decode_latin1(&data[separator + 1..]);

        if keyword.is_empty() {
            return Err(PngTextError::invalid_entry(&keyword, "keyword is empty"));
        }
        if text.is_empty() {
            return Err(PngTextError::invalid_entry(&keyword, "text is empty"));
        }

        Ok(Self { keyword, text })
    }

    /// Encode as a `tEXt` chunk payload
    pub fn to_chunk_data(&self) -> PngTextResult<Vec<u8>> {
        let mut data = encode_latin1(&self.keyword, &self.keyword)?;
        data.push(0);
        data.extend(encode_latin1(&self.text, &self.keyword)?);
        Ok(data)
    }

    pub fn to_chunk(&self) -> PngTextResult<Chunk> {
        Ok(Chunk::new(*TEXT, self.to_chunk_data()?))
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn encode_latin1(value: &str, key: &str) -> PngTextResult<Vec<u8>> {
    value
        .chars()
        .map(|c| {
            u8::try_from(c).map_err(|_| {
                PngTextError::invalid_entry(key, format!("{:?} is not a Latin-1 character", c))
            })
        })
        .collect()
}

fn validate_entry(keyword: &str, text: &str) -> PngTextResult<()> {
    if keyword.is_empty() {
        return Err(PngTextError::invalid_entry(keyword, "keyword is empty"));
    }
    if keyword.contains('\0') {
        return Err(PngTextError::invalid_entry(keyword, "keyword contains a NUL byte"));
    }
    if text.is_empty() {
        return Err(PngTextError::invalid_entry(keyword, "text is empty"));
    }
    if text.contains('\0') {
        return Err(PngTextError::invalid_entry(keyword, "text contains a NUL byte"));
    }

    // One byte per character once encoded
    let payload_len = keyword.chars().count() + 1 + text.chars().count();
    if payload_len > MAX_CHUNK_LENGTH as usize {
        return Err(PngTextError::invalid_entry(
            keyword,
            format!("payload of {} bytes exceeds the chunk length limit", payload_len),
        ));
    }

    encode_latin1(keyword, keyword)?;
    encode_latin1(text, keyword)?;
    Ok(())
}

/// Check every entry of a mapping can be written as a `tEXt` chunk
pub fn validate_metadata(metadata: &Metadata) -> PngTextResult<()> {
    metadata
        .iter()
        .try_for_each(|(keyword, text)| validate_entry(keyword, text))
}

/// Build one `tEXt` chunk per entry, in key order
pub fn encode_text_chunks(metadata: &Metadata) -> PngTextResult<Vec<Chunk>> {
    validate_metadata(metadata)?;
    metadata
        .iter()
        .map(|(keyword, text)| {
            TextEntry {
                keyword: keyword.clone(),
                text: text.clone(),
            }
            .to_chunk()
        })
        .collect()
}

/// Decode every `tEXt` chunk of a parsed stream. Later keywords win.
pub fn decode_text_chunks(png: &ParsedPng) -> Extraction {
    let mut extraction = Extraction::default();

    for (chunk_index, chunk) in png::find_chunks_of_type(png, TEXT) {
        match TextEntry::from_chunk_data(&chunk.data, chunk_index) {
            Ok(entry) => {
                extraction.metadata.insert(entry.keyword, entry.text);
            }
            Err(reason) => extraction.skipped.push(SkippedChunk {
                chunk_index,
                reason,
            }),
        }
    }

    extraction
}

/// Read the text metadata of a PNG stream, reporting skipped chunks
pub fn extract_metadata_with_warnings(bytes: &[u8]) -> PngTextResult<Extraction> {
    let parsed = parse_png_chunks(bytes)?;
    Ok(decode_text_chunks(&parsed))
}

/// Read the text metadata of a PNG stream.
///
/// Malformed individual `tEXt` chunks are skipped; only a structurally broken
/// stream is an error.
pub fn extract_metadata(bytes: &[u8]) -> PngTextResult<Metadata> {
    Ok(extract_metadata_with_warnings(bytes)?.metadata)
}

/// Replace all `tEXt` chunks of a PNG stream with `metadata`.
///
/// The mapping is validated before the stream is read. Every other chunk is
/// written back byte-identical and in the same order.
pub fn replace_metadata(bytes: &[u8], metadata: &Metadata) -> PngTextResult<Vec<u8>> {
    let text_chunks = encode_text_chunks(metadata)?;
    let parsed = parse_png_chunks(bytes)?;
    let replaced = png::replace_chunks_of_type(parsed, TEXT, text_chunks);
    Ok(png::serialize_png(&replaced))
}
