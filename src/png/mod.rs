//! PNG chunk stream: parsing, serialization and chunk substitution

pub mod parser;

use std::fs;
use std::path::Path;

use crate::text::{self, Extraction, Metadata, TextEntry};
use crate::utils::{PNG_SIGNATURE, chunk_crc, is_png_signature, push_u32_be};
use crate::{PngTextError, PngTextResult};
pub use parser::{Chunk, ParsedPng, find_chunks_of_type, parse_png_chunks};

pub const PNG_SIGNATURE_LEN: usize = PNG_SIGNATURE.len();

pub const IHDR: &[u8; 4] = b"IHDR";
pub const IDAT: &[u8; 4] = b"IDAT";
pub const IEND: &[u8; 4] = b"IEND";
pub const TEXT: &[u8; 4] = b"tEXt";

/// Serialize a chunk sequence back into a PNG byte stream.
///
/// CRCs are always recomputed from type and data; the CRC carried on each
/// chunk is ignored. Chunk data must not exceed `MAX_CHUNK_LENGTH` bytes.
pub fn serialize_png(png: &ParsedPng) -> Vec<u8> {
    let body: usize = png.chunks.iter().map(|c| c.length() + 12).sum();
    let mut out = Vec::with_capacity(PNG_SIGNATURE_LEN + body + png.trailer.len());

    out.extend_from_slice(&PNG_SIGNATURE);
    for chunk in &png.chunks {
        push_u32_be(&mut out, chunk.length() as u32);
        out.extend_from_slice(&chunk.chunk_type);
        out.extend_from_slice(&chunk.data);
        push_u32_be(&mut out, chunk_crc(&chunk.chunk_type, &chunk.data));
    }
    out.extend_from_slice(&png.trailer);

    out
}

/// Remove every chunk of `chunk_type` and put `new_chunks` in their place.
///
/// The replacements go where the first removed chunk was, or just before IEND
/// when there was none. Every other chunk keeps its relative order.
pub fn replace_chunks_of_type(
    png: ParsedPng,
    chunk_type: &[u8; 4],
    new_chunks: Vec<Chunk>,
) -> ParsedPng {
    let ParsedPng { chunks, trailer } = png;

    let mut first_removed = None;
    let mut kept = Vec::with_capacity(chunks.len() + new_chunks.len());
    for chunk in chunks {
        if chunk.is_type(chunk_type) {
            first_removed.get_or_insert(kept.len());
        } else {
            kept.push(chunk);
        }
    }

    let insert_at = first_removed.unwrap_or_else(|| {
        kept.iter()
            .rposition(|c| c.is_type(IEND))
            .unwrap_or(kept.len())
    });
    kept.splice(insert_at..insert_at, new_chunks);

    ParsedPng {
        chunks: kept,
        trailer,
    }
}

/// PNG file representation with metadata manipulation capabilities
#[derive(Debug, Clone)]
pub struct PngFile {
    raw_data: Vec<u8>,
    parsed: ParsedPng,
}

impl PngFile {
    /// Load PNG file from path
    pub fn from_file(path: &Path) -> PngTextResult<Self> {
        let raw_data = fs::read(path)?;
        Self::from_data(raw_data)
    }

    /// Create from raw data
    pub fn from_data(data: Vec<u8>) -> PngTextResult<Self> {
        if !is_png_signature(&data) {
            return Err(PngTextError::NotAPng);
        }
        let parsed = parse_png_chunks(&data)?;
        Ok(Self {
            raw_data: data,
            parsed,
        })
    }

    /// Text metadata along with any tEXt chunks that had to be skipped
    pub fn extraction(&self) -> Extraction {
        text::decode_text_chunks(&self.parsed)
    }

    pub fn metadata(&self) -> Metadata {
        self.extraction().metadata
    }

    /// Replace all text metadata with `metadata`
    pub fn set_metadata(&mut self, metadata: &Metadata) -> PngTextResult<()> {
        let text_chunks = text::encode_text_chunks(metadata)?;
        self.replace_text_chunks(text_chunks)
    }

    /// Overlay `updates` onto the existing metadata.
    ///
    /// tEXt chunks whose keyword is not in `updates` are kept verbatim, so
    /// existing values that could not be written through `set_metadata`
    /// (embedded NUL, malformed payloads) survive untouched.
    pub fn merge_metadata(&mut self, updates: &Metadata) -> PngTextResult<()> {
        let new_chunks = text::encode_text_chunks(updates)?;

        let mut text_chunks: Vec<Chunk> = find_chunks_of_type(&self.parsed, TEXT)
            .filter(|(index, chunk)| match TextEntry::from_chunk_data(&chunk.data, *index) {
                Ok(entry) => !updates.contains_key(&entry.keyword),
                Err(_) => true,
            })
            .map(|(_, chunk)| chunk.clone())
            .collect();
        text_chunks.extend(new_chunks);

        self.replace_text_chunks(text_chunks)
    }

    fn replace_text_chunks(&mut self, text_chunks: Vec<Chunk>) -> PngTextResult<()> {
        let parsed = replace_chunks_of_type(self.parsed.clone(), TEXT, text_chunks);

        self.raw_data = serialize_png(&parsed);

        // Re-parse so chunk offsets describe the new stream
        self.parsed = parse_png_chunks(&self.raw_data)?;

        Ok(())
    }

    /// Write the PNG to a file
    pub fn write_to_file(&self, path: &Path) -> PngTextResult<()> {
        fs::write(path, &self.raw_data)?;
        Ok(())
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.parsed.chunks
    }

    pub fn trailer(&self) -> &[u8] {
        &self.parsed.trailer
    }

    /// Get the raw data
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw_data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.raw_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Helper to create a minimal PNG for testing
    fn create_test_png() -> Vec<u8> {
        let mut png = PNG_SIGNATURE.to_vec();

        // IHDR chunk
        let ihdr_data = [
            0x00, 0x00, 0x00, 0x01, // width = 1
            0x00, 0x00, 0x00, 0x01, // height = 1
            0x08, // bit depth = 8
            0x00, // color type = 0 (grayscale)
            0x00, // compression = 0
            0x00, // filter = 0
            0x00, // interlace = 0
        ];
        png.extend_from_slice(&serialize_chunk(IHDR, &ihdr_data));

        // IDAT chunk: zlib stored block holding one filtered scanline
        let idat_data = [
            0x78, 0x01, 0x01, 0x02, 0x00, 0xFD, 0xFF, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01,
        ];
        png.extend_from_slice(&serialize_chunk(IDAT, &idat_data));

        png.extend_from_slice(&serialize_chunk(IEND, &[]));
        png
    }

    fn serialize_chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        push_u32_be(&mut out, data.len() as u32);
        out.extend_from_slice(chunk_type);
        out.extend_from_slice(data);
        push_u32_be(&mut out, chunk_crc(chunk_type, data));
        out
    }

    fn types(png: &ParsedPng) -> Vec<String> {
        png.chunks.iter().map(|c| c.type_name()).collect()
    }

    fn text_chunk(payload: &[u8]) -> Chunk {
        Chunk::new(*TEXT, payload.to_vec())
    }

    #[test]
    fn test_serialize_unmodified_is_identical() {
        let mut data = create_test_png();
        data.extend_from_slice(b"trailing bytes");
        let parsed = parse_png_chunks(&data).unwrap();
        assert_eq!(serialize_png(&parsed), data);
    }

    #[test]
    fn test_serialize_recomputes_crc() {
        let data = create_test_png();
        let mut parsed = parse_png_chunks(&data).unwrap();
        parsed.chunks[1].data.push(0);
        parsed.chunks[1].crc = 0;

        let out = serialize_png(&parsed);
        let reparsed = parse_png_chunks(&out).unwrap();
        assert_eq!(reparsed.chunks[1].data.len(), 14);
        assert_eq!(reparsed.chunks[1].crc, chunk_crc(IDAT, &parsed.chunks[1].data));
    }

    #[test]
    fn test_replace_inserts_before_iend() {
        let parsed = parse_png_chunks(&create_test_png()).unwrap();
        let replaced = replace_chunks_of_type(parsed, TEXT, vec![text_chunk(b"a\0b")]);
        assert_eq!(types(&replaced), ["IHDR", "IDAT", "tEXt", "IEND"]);
    }

    #[test]
    fn test_replace_at_first_removed_position() {
        let mut parsed = parse_png_chunks(&create_test_png()).unwrap();
        parsed.chunks.insert(1, text_chunk(b"old\0one"));
        parsed.chunks.insert(2, Chunk::new(*b"pHYs", vec![0; 9]));
        parsed.chunks.insert(4, text_chunk(b"old\0two"));
        assert_eq!(types(&parsed), ["IHDR", "tEXt", "pHYs", "IDAT", "tEXt", "IEND"]);

        let replaced = replace_chunks_of_type(
            parsed,
            TEXT,
            vec![text_chunk(b"new\0one"), text_chunk(b"new\0two")],
        );
        assert_eq!(types(&replaced), ["IHDR", "tEXt", "tEXt", "pHYs", "IDAT", "IEND"]);
        assert_eq!(replaced.chunks[1].data, b"new\0one");
        assert_eq!(replaced.chunks[2].data, b"new\0two");
    }

    #[test]
    fn test_replace_with_nothing_removes() {
        let mut parsed = parse_png_chunks(&create_test_png()).unwrap();
        parsed.chunks.insert(2, text_chunk(b"k\0v"));
        let replaced = replace_chunks_of_type(parsed, TEXT, Vec::new());
        assert_eq!(types(&replaced), ["IHDR", "IDAT", "IEND"]);
    }

    #[test]
    fn test_png_file_load() {
        let png_data = create_test_png();
        let file = PngFile::from_data(png_data).unwrap();
        assert_eq!(file.chunks().len(), 3); // IHDR, IDAT, IEND
        assert!(file.metadata().is_empty());
    }

    #[test]
    fn test_png_file_rejects_other_formats() {
        let result = PngFile::from_data(b"GIF89a not a png".to_vec());
        assert!(matches!(result, Err(PngTextError::NotAPng)));
    }

    #[test]
    fn test_png_file_set_and_merge() {
        let mut file = PngFile::from_data(create_test_png()).unwrap();

        let mut metadata = Metadata::new();
        metadata.insert("Author".to_string(), "Alice".to_string());
        metadata.insert("Title".to_string(), "Test".to_string());
        file.set_metadata(&metadata).unwrap();
        assert_eq!(file.metadata(), metadata);

        let mut updates = Metadata::new();
        updates.insert("Author".to_string(), "Bob".to_string());
        file.merge_metadata(&updates).unwrap();

        let merged = file.metadata();
        assert_eq!(merged.get("Author").map(String::as_str), Some("Bob"));
        assert_eq!(merged.get("Title").map(String::as_str), Some("Test"));
        assert_eq!(file.chunks().len(), 5);
    }

    #[test]
    fn test_merge_keeps_existing_chunks_that_cannot_be_rewritten() {
        let mut parsed = parse_png_chunks(&create_test_png()).unwrap();
        parsed.chunks.insert(1, text_chunk(b"Data\0a\0b"));
        parsed.chunks.insert(2, text_chunk(b"no separator"));
        parsed.chunks.insert(3, text_chunk(b"Author\0Old"));
        let mut file = PngFile::from_data(serialize_png(&parsed)).unwrap();

        let mut updates = Metadata::new();
        updates.insert("Author".to_string(), "Alice".to_string());
        file.merge_metadata(&updates).unwrap();

        let metadata = file.metadata();
        assert_eq!(metadata.get("Data").map(String::as_str), Some("a\0b"));
        assert_eq!(metadata.get("Author").map(String::as_str), Some("Alice"));

        let payloads: Vec<_> = file
            .chunks()
            .iter()
            .filter(|c| c.is_type(TEXT))
            .map(|c| c.data.clone())
            .collect();
        assert_eq!(
            payloads,
            [
                b"Data\0a\0b".to_vec(),
                b"no separator".to_vec(),
                b"Author\0Alice".to_vec()
            ]
        );
    }

    #[test]
    fn test_merge_validates_updates_first() {
        let original = create_test_png();
        let mut file = PngFile::from_data(original.clone()).unwrap();

        let mut updates = Metadata::new();
        updates.insert("k".to_string(), "a\0b".to_string());
        assert!(matches!(
            file.merge_metadata(&updates),
            Err(PngTextError::InvalidEntry { .. })
        ));
        assert_eq!(file.as_bytes(), original.as_slice());
    }

    #[test]
    fn test_png_file_invalid_update_leaves_file_untouched() {
        let original = create_test_png();
        let mut file = PngFile::from_data(original.clone()).unwrap();

        let mut metadata = Metadata::new();
        metadata.insert(String::new(), "x".to_string());
        assert!(matches!(
            file.set_metadata(&metadata),
            Err(PngTextError::InvalidEntry { .. })
        ));
        assert_eq!(file.as_bytes(), original.as_slice());
    }

    #[test]
    fn test_png_file_roundtrip_through_disk() {
        let mut input = NamedTempFile::new().unwrap();
        input.write_all(&create_test_png()).unwrap();

        let mut file = PngFile::from_file(input.path()).unwrap();
        let mut metadata = Metadata::new();
        metadata.insert("Comment".to_string(), "saved".to_string());
        file.set_metadata(&metadata).unwrap();

        let output = NamedTempFile::new().unwrap();
        file.write_to_file(output.path()).unwrap();

        let reloaded = PngFile::from_file(output.path()).unwrap();
        assert_eq!(reloaded.metadata(), metadata);
        assert_eq!(reloaded.as_bytes(), file.as_bytes());
    }
}
