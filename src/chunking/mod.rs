//! Boundary-aware chunker for large documents.
//!
//! Splits text above the configured threshold into overlapping chunks,
//! always landing on a UTF-8 char boundary and preferring a natural
//! boundary (paragraph, sentence, then whitespace) within a bounded
//! look-back window. Each chunk records its `global_start` offset so
//! that spans found within it can be remapped back onto the original
//! document coordinates.

use crate::error::{ChunkingError, Result};

/// Default chunk size in bytes (50 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 51_200;

/// Default overlap between consecutive chunks, in bytes.
pub const DEFAULT_OVERLAP: usize = 500;

/// Hard upper bound on a single chunk's size.
pub const MAX_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// A single slice of a larger document, with its offset into the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Byte offset of `text[0]` within the original document.
    pub global_start: usize,
    /// The chunk's own content.
    pub text: String,
    /// Index of this chunk within the ordered chunk sequence.
    pub index: usize,
}

impl DocumentChunk {
    /// Remaps a chunk-local half-open byte range to document-global offsets.
    #[must_use]
    pub const fn remap(&self, local_start: usize, local_end: usize) -> (usize, usize) {
        (
            self.global_start + local_start,
            self.global_start + local_end,
        )
    }
}

/// Configuration for a single chunking pass.
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    /// Target chunk size in bytes.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks, in bytes.
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkerConfig {
    fn validate(self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChunkingError::InvalidConfig {
                reason: "chunk_size must be > 0".to_string(),
            }
            .into());
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ChunkingError::ChunkTooLarge {
                size: self.chunk_size,
                max: MAX_CHUNK_SIZE,
            }
            .into());
        }
        if self.overlap >= self.chunk_size {
            return Err(ChunkingError::OverlapTooLarge {
                overlap: self.overlap,
                size: self.chunk_size,
            }
            .into());
        }
        Ok(())
    }
}

/// Splits `text` into overlapping, boundary-aware chunks.
///
/// Returns a single chunk spanning the whole document when `text` fits
/// within one `chunk_size`. Never splits a UTF-8 character.
///
/// # Errors
///
/// Returns an error if `config` is invalid (zero chunk size, overlap
/// not smaller than chunk size, or chunk size above [`MAX_CHUNK_SIZE`]).
pub fn chunk_document(text: &str, config: ChunkerConfig) -> Result<Vec<DocumentChunk>> {
    config.validate()?;

    if text.is_empty() {
        return Ok(vec![]);
    }

    if text.len() <= config.chunk_size {
        return Ok(vec![DocumentChunk {
            global_start: 0,
            text: text.to_string(),
            index: 0,
        }]);
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while start < text.len() {
        let target_end = (start + config.chunk_size).min(text.len());
        let end = if target_end >= text.len() {
            text.len()
        } else {
            find_boundary(text, start, target_end, config.chunk_size)
        };
        let end = if end <= start {
            (start + config.chunk_size).min(text.len())
        } else {
            end
        };

        chunks.push(DocumentChunk {
            global_start: start,
            text: text[start..end].to_string(),
            index,
        });

        if end >= text.len() {
            break;
        }

        let next_start = if config.overlap > 0 {
            end.saturating_sub(config.overlap)
        } else {
            end
        };
        start = if next_start <= start { end } else { next_start };
        index += 1;
    }

    Ok(chunks)
}

/// Finds a natural boundary at or before `target`, no earlier than `floor`.
///
/// Preference order: paragraph break (`"\n\n"`), sentence end (`". "`),
/// whitespace, then a hard UTF-8 char boundary.
fn find_boundary(text: &str, floor: usize, target: usize, chunk_size: usize) -> usize {
    let mut pos = target.min(text.len());
    while pos > floor && !text.is_char_boundary(pos) {
        pos -= 1;
    }

    let window = (chunk_size / 10).max(64);
    let search_start = pos.saturating_sub(window).max(floor);
    if search_start >= pos {
        return pos;
    }
    let region = &text[search_start..pos];

    if let Some(offset) = region.rfind("\n\n") {
        return search_start + offset + 2;
    }
    if let Some(offset) = region.rfind(". ") {
        return search_start + offset + 2;
    }
    if let Some(offset) = region.rfind(['\n', ' ', '\t']) {
        return search_start + offset + 1;
    }

    pos
}

/// Discards findings that are exact duplicates of a finding carried over
/// from the overlap window of the previous chunk.
///
/// Two findings are considered duplicates when `(module_id, gate_id,
/// start, end, message)` match. The earlier chunk's instance is kept;
/// returns the indices of the entries to retain, in original order.
#[must_use]
pub fn dedup_overlap_keys(keys: &[(String, String, usize, usize, String)]) -> Vec<usize> {
    let mut seen = std::collections::HashSet::new();
    let mut keep = Vec::with_capacity(keys.len());
    for (i, key) in keys.iter().enumerate() {
        if seen.insert(key.clone()) {
            keep.push(i);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_document_empty() {
        let chunks = chunk_document("", ChunkerConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunk_document_small_text_single_chunk() {
        let text = "Hello, world!";
        let chunks = chunk_document(text, ChunkerConfig::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].global_start, 0);
    }

    #[test]
    fn test_chunk_document_multi_chunk_offsets_reconstruct() {
        let text = "0123456789".repeat(2000);
        let config = ChunkerConfig {
            chunk_size: 1000,
            overlap: 50,
        };
        let chunks = chunk_document(&text, config).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            let slice = &text[chunk.global_start..chunk.global_start + chunk.text.len()];
            assert_eq!(slice, chunk.text);
        }
    }

    #[test]
    fn test_chunk_document_never_splits_char() {
        let text = "héllo wörld ".repeat(2000);
        let config = ChunkerConfig {
            chunk_size: 777,
            overlap: 10,
        };
        let chunks = chunk_document(&text, config).unwrap();
        for chunk in &chunks {
            assert!(text.is_char_boundary(chunk.global_start));
            assert!(text.is_char_boundary(chunk.global_start + chunk.text.len()));
        }
    }

    #[test]
    fn test_chunk_document_invalid_config_zero_size() {
        let config = ChunkerConfig {
            chunk_size: 0,
            overlap: 0,
        };
        assert!(chunk_document("some text", config).is_err());
    }

    #[test]
    fn test_chunk_document_overlap_too_large() {
        let config = ChunkerConfig {
            chunk_size: 10,
            overlap: 10,
        };
        assert!(chunk_document("some longer text here", config).is_err());
    }

    #[test]
    fn test_chunk_document_progresses_without_overlap() {
        let text = "a".repeat(5000);
        let config = ChunkerConfig {
            chunk_size: 500,
            overlap: 0,
        };
        let chunks = chunk_document(&text, config).unwrap();
        assert!(chunks.len() >= 5);
        let mut last_end = 0;
        for chunk in &chunks {
            assert!(chunk.global_start >= last_end);
            last_end = chunk.global_start + chunk.text.len();
        }
    }

    #[test]
    fn test_remap_applies_offset() {
        let chunk = DocumentChunk {
            global_start: 100,
            text: "hello".to_string(),
            index: 0,
        };
        assert_eq!(chunk.remap(1, 3), (101, 103));
    }

    #[test]
    fn test_dedup_overlap_keys_removes_exact_duplicate() {
        let keys = vec![
            (
                "fca_uk".to_string(),
                "risk_warning".to_string(),
                10,
                20,
                "m".to_string(),
            ),
            (
                "fca_uk".to_string(),
                "risk_warning".to_string(),
                10,
                20,
                "m".to_string(),
            ),
            (
                "gdpr_uk".to_string(),
                "lawful_basis".to_string(),
                5,
                15,
                "n".to_string(),
            ),
        ];
        let keep = dedup_overlap_keys(&keys);
        assert_eq!(keep, vec![0, 2]);
    }
}
