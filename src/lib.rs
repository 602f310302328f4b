//! # PNG Text Metadata Tool
//!
//! This library reads and rewrites key/value text metadata stored in the
//! `tEXt` chunks of PNG files, without decoding or re-encoding pixel data.
//!
//! Every chunk other than `tEXt` is carried through byte-for-byte in its
//! original order. Text payloads are always taken from explicit-length chunk
//! data, so a value is never cut short at an interior NUL byte.
//!
//! ```
//! use png_text::{extract_metadata, replace_metadata, Metadata};
//!
//! # fn demo(png: &[u8]) -> png_text::PngTextResult<()> {
//! let mut metadata = Metadata::new();
//! metadata.insert("Author".to_string(), "Alice".to_string());
//!
//! let updated = replace_metadata(png, &metadata)?;
//! assert_eq!(extract_metadata(&updated)?, metadata);
//! # Ok(())
//! # }
//! ```
//!
//! Calls share no state. Two threads may work on the same PNG as long as
//! neither mutates a buffer the other is reading.

// Public API exports
pub mod cli;
pub mod png;
pub mod text;
pub mod utils;

pub use png::{Chunk, ParsedPng, PngFile};
pub use text::{
    Extraction, Metadata, SkippedChunk, TextEntry, extract_metadata,
    extract_metadata_with_warnings, replace_metadata, validate_metadata,
};

/// Result type alias for PNG text operations
pub type PngTextResult<T> = Result<T, PngTextError>;

/// Comprehensive error type for the PNG text tool
#[derive(Debug, thiserror::Error)]
pub enum PngTextError {
    #[error("Not a PNG: missing PNG signature")]
    NotAPng,

    #[error("Truncated chunk at offset {offset}")]
    TruncatedChunk { offset: usize },

    #[error("Invalid chunk length {length} at offset {offset}")]
    InvalidChunkLength { offset: usize, length: u32 },

    #[error(
        "CRC mismatch in chunk {chunk_type} at offset {offset}: \
         stored {stored:#010x}, computed {computed:#010x}"
    )]
    CrcMismatch {
        chunk_type: String,
        offset: usize,
        stored: u32,
        computed: u32,
    },

    #[error("Missing {0} chunk")]
    MissingChunk(&'static str),

    #[error("Invalid entry {key:?}: {reason}")]
    InvalidEntry { key: String, reason: String },

    #[error("tEXt chunk {chunk_index} has no keyword separator")]
    MissingSeparator { chunk_index: usize },

    #[error("Input file error: {0}")]
    Io(#[from] std::io::Error),
}

impl PngTextError {
    /// Validate that a PNG chunk's stored CRC matches the computed value
    pub fn validate_png_chunk(
        chunk_type: &[u8; 4],
        offset: usize,
        stored: u32,
        computed: u32,
    ) -> PngTextResult<()> {
        if stored != computed {
            Err(PngTextError::CrcMismatch {
                chunk_type: String::from_utf8_lossy(chunk_type).to_string(),
                offset,
                stored,
                computed,
            })
        } else {
            Ok(())
        }
    }

    pub(crate) fn invalid_entry(key: &str, reason: impl Into<String>) -> Self {
        PngTextError::InvalidEntry {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
