//! CLI argument parsing and output formatting

use crate::png::{Chunk, PngFile};
use crate::text::{Extraction, Metadata};

/// Parse a `KEY=VALUE` argument. The value may itself contain `=`.
pub fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {:?}", arg)),
    }
}

/// Collect `KEY=VALUE` pairs into a mapping, later pairs overriding earlier ones
pub fn pairs_to_metadata(pairs: Vec<(String, String)>) -> Metadata {
    pairs.into_iter().collect()
}

/// One `key=value` line per entry, in key order
pub fn format_metadata(metadata: &Metadata) -> Vec<String> {
    metadata
        .iter()
        .map(|(key, value)| format!("{}={}", key, value.escape_debug()))
        .collect()
}

/// Warning lines for tEXt chunks skipped during extraction
pub fn format_skipped(extraction: &Extraction) -> Vec<String> {
    extraction
        .skipped
        .iter()
        .map(|skipped| {
            format!(
                "warning: skipped chunk {}: {}",
                skipped.chunk_index, skipped.reason
            )
        })
        .collect()
}

fn describe_chunk(index: usize, chunk: &Chunk) -> String {
    let offset = chunk
        .offset
        .map(|o| format!("{:#010x}", o))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>4}  {}  offset {}  length {:>10}  crc {:#010x}",
        index,
        chunk.type_name(),
        offset,
        chunk.length(),
        chunk.crc
    )
}

/// Chunk listing of a PNG file, followed by the trailer size if any
pub fn describe_chunks(file: &PngFile) -> Vec<String> {
    let mut lines: Vec<String> = file
        .chunks()
        .iter()
        .enumerate()
        .map(|(index, chunk)| describe_chunk(index, chunk))
        .collect();

    if !file.trailer().is_empty() {
        lines.push(format!("trailer: {} bytes after IEND", file.trailer().len()));
    }
    lines
}
