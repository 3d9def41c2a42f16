use crate::config::ChunkingConfig;
use crate::determinism::span_anchor;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A bounded, overlapping slice of document text.
///
/// `char_range` is a half-open range in characters (not bytes) of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub char_range: (usize, usize),
    pub anchor_id: String,
}

/// Window boundaries for a text of `len` characters, before blank windows are dropped.
///
/// Windows advance by `max_chars - overlap`; the last window ends exactly at `len`.
pub fn plan_windows(len: usize, max_chars: usize, overlap: usize) -> CoreResult<Vec<(usize, usize)>> {
    if max_chars == 0 {
        return Err(CoreError::Config("max_chars must be > 0".to_string()));
    }
    if max_chars <= overlap {
        return Err(CoreError::Config(format!(
            "max_chars ({}) must exceed overlap ({})",
            max_chars, overlap
        )));
    }
    let step = max_chars - overlap;
    let mut windows = Vec::new();
    let mut start = 0usize;
    while start < len {
        let end = (start + max_chars).min(len);
        windows.push((start, end));
        if end == len {
            break;
        }
        start += step;
    }
    Ok(windows)
}

pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> CoreResult<Vec<Chunk>> {
    // Byte offset of every char boundary, plus the end of the text.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut dropped = 0usize;
    for (start, end) in plan_windows(char_len, max_chars, overlap)? {
        let slice = &text[bounds[start]..bounds[end]];
        if slice.trim().is_empty() {
            dropped += 1;
            continue;
        }
        chunks.push(Chunk {
            index: chunks.len(),
            text: slice.to_string(),
            char_range: (start, end),
            anchor_id: span_anchor("CHUNK", slice, start),
        });
    }
    debug!(
        chars = char_len,
        chunks = chunks.len(),
        dropped_blank = dropped,
        "chunked document"
    );
    Ok(chunks)
}

pub fn chunk_with_config(text: &str, cfg: &ChunkingConfig) -> CoreResult<Vec<Chunk>> {
    chunk_text(text, cfg.max_chars, cfg.overlap)
}
