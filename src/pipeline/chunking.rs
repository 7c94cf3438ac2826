//! Fixed-width character chunking.
//!
//! Boundaries fall every `max_chars` Unicode scalar values regardless of words or sentences, so
//! chunks concatenate back to the input exactly and the chunk count is
//! `ceil(chars / max_chars)`.

use super::types::ChunkingError;

/// Default number of characters per chunk.
pub const DEFAULT_MAX_CHARS: usize = 8000;

/// A contiguous, non-overlapping slice of the extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// 0-based position in the sequence.
    pub index: usize,
    /// Slice of the source text.
    pub text: &'a str,
}

impl Chunk<'_> {
    /// 1-based chunk number used in prompts and placeholders.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Returns an empty vector for empty input.
pub fn chunk_text(text: &str, max_chars: usize) -> Result<Vec<Chunk<'_>>, ChunkingError> {
    if max_chars == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (offset, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(Chunk {
                index: chunks.len(),
                text: &text[start..offset],
            });
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(Chunk {
            index: chunks.len(),
            text: &text[start..],
        });
    }

    Ok(chunks)
}
