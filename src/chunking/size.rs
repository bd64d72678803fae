//! Fixed-size chunking with overlap and boundary snapping.
//!
//! Windows are measured in characters. Each window end is snapped back to
//! the last sentence end (`.`) or paragraph break (`\n\n`) found within a
//! small lookahead, as long as that keeps the window at least half full.

use super::traits::Chunker;
use super::{DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP, MIN_CHUNK_CHARS, SNAP_LOOKAHEAD};
use crate::core::{Chunk, ChunkMethod};
use crate::error::ConfigError;

/// Splits text into overlapping windows of roughly `chunk_size` characters.
#[derive(Debug, Clone, Copy)]
pub struct SizeChunker {
    chunk_size: usize,
    overlap: usize,
}

impl SizeChunker {
    /// Creates a size chunker.
    ///
    /// # Errors
    ///
    /// Returns an error if `chunk_size` is zero or `overlap >= chunk_size`.
    pub const fn new(chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        if chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if overlap >= chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                overlap,
                chunk_size,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Target window size in characters.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared by consecutive windows.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    /// Finds the snapped end (char index) for the window starting at
    /// `start`, or `None` when no boundary keeps the window half full.
    fn snap_end(&self, text: &str, offsets: &[usize], start: usize, naive_end: usize) -> Option<usize> {
        let total = offsets.len() - 1;
        let search_end = (naive_end + SNAP_LOOKAHEAD).min(total);
        let base = offsets[start];
        let window = &text[base..offsets[search_end]];
        let midpoint = start + self.chunk_size / 2;

        // Byte hits are always on char boundaries: both needles are ASCII.
        let to_char = |rel: usize| offsets.partition_point(|&b| b < base + rel);

        if let Some(rel) = window.rfind('.') {
            let pos = to_char(rel);
            if pos > midpoint {
                return Some(pos + 1);
            }
        }
        if let Some(rel) = window.rfind("\n\n") {
            let pos = to_char(rel);
            if pos > midpoint {
                return Some(pos + 2);
            }
        }
        None
    }
}

impl Default for SizeChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl Chunker for SizeChunker {
    fn name(&self) -> &'static str {
        "size"
    }

    fn chunk(&self, text: &str) -> Vec<Chunk> {
        // offsets[i] is the byte offset of char i; the final entry is text.len().
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut window = 0;

        while start < total {
            window += 1;
            let naive_end = start + self.chunk_size;
            let end = if naive_end < total {
                self.snap_end(text, &offsets, start, naive_end)
                    .unwrap_or(naive_end)
            } else {
                naive_end
            }
            .min(total);

            let slice = text[offsets[start]..offsets[end]].trim();
            if slice.chars().count() > MIN_CHUNK_CHARS {
                chunks.push(
                    Chunk::new(chunks.len(), slice.to_string(), window, ChunkMethod::Size)
                        .with_metadata("char_start", start)
                        .with_metadata("char_end", end),
                );
            }

            if end >= total {
                break;
            }
            let next = end.saturating_sub(self.overlap);
            start = if next > start { next } else { end };
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn span(chunk: &Chunk) -> (usize, usize) {
        let get = |k: &str| {
            chunk
                .metadata
                .get(k)
                .and_then(serde_json::Value::as_u64)
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or_else(|| unreachable!())
        };
        (get("char_start"), get("char_end"))
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(matches!(
            SizeChunker::new(0, 0),
            Err(ConfigError::ZeroChunkSize)
        ));
        assert!(matches!(
            SizeChunker::new(100, 100),
            Err(ConfigError::OverlapTooLarge { .. })
        ));
        assert!(SizeChunker::new(100, 99).is_ok());
    }

    #[test]
    fn test_empty_text() {
        let chunker = SizeChunker::new(1000, 100).unwrap_or_else(|_| unreachable!());
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn test_short_text_is_discarded() {
        let chunker = SizeChunker::new(1000, 100).unwrap_or_else(|_| unreachable!());
        assert!(chunker.chunk("too short to keep").is_empty());
    }

    #[test]
    fn test_single_window() {
        let text = "a".repeat(500);
        let chunker = SizeChunker::new(1000, 100).unwrap_or_else(|_| unreachable!());
        let chunks = chunker.chunk(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(span(&chunks[0]), (0, 500));
        assert_eq!(chunks[0].start_unit, 1);
    }

    #[test]
    fn test_windows_overlap() {
        let text = "x".repeat(2500);
        let chunker = SizeChunker::new(1000, 200).unwrap_or_else(|_| unreachable!());
        let chunks = chunker.chunk(&text);
        let spans: Vec<_> = chunks.iter().map(span).collect();
        assert_eq!(spans, vec![(0, 1000), (800, 1800), (1600, 2500)]);
        assert_eq!(chunks[2].start_unit, 3);
    }

    #[test]
    fn test_exact_fit_has_no_duplicate_tail() {
        let text = "y".repeat(1800);
        let chunker = SizeChunker::new(1000, 200).unwrap_or_else(|_| unreachable!());
        let spans: Vec<_> = chunker.chunk(&text).iter().map(span).collect();
        assert_eq!(spans, vec![(0, 1000), (800, 1800)]);
    }

    #[test]
    fn test_snaps_to_sentence_end() {
        // Sentence ends at char 899 (the '.'), inside the window past its midpoint.
        let text = format!("{}.{}", "a".repeat(899), "b".repeat(1500));
        let chunker = SizeChunker::new(1000, 100).unwrap_or_else(|_| unreachable!());
        let chunks = chunker.chunk(&text);
        assert_eq!(span(&chunks[0]), (0, 900));
        assert!(chunks[0].content.ends_with('.'));
        assert_eq!(span(&chunks[1]).0, 800);
    }

    #[test]
    fn test_snaps_into_lookahead() {
        // The period sits just past the naive end but inside the lookahead.
        let text = format!("{}.{}", "a".repeat(1050), "b".repeat(1500));
        let chunker = SizeChunker::new(1000, 100).unwrap_or_else(|_| unreachable!());
        let chunks = chunker.chunk(&text);
        assert_eq!(span(&chunks[0]), (0, 1051));
    }

    #[test]
    fn test_early_sentence_end_is_ignored() {
        let text = format!("{}.{}", "a".repeat(100), "b".repeat(2000));
        let chunker = SizeChunker::new(1000, 100).unwrap_or_else(|_| unreachable!());
        let chunks = chunker.chunk(&text);
        assert_eq!(span(&chunks[0]), (0, 1000));
    }

    #[test]
    fn test_snaps_to_paragraph_break() {
        let text = format!("{}\n\n{}", "a".repeat(700), "b".repeat(1500));
        let chunker = SizeChunker::new(1000, 100).unwrap_or_else(|_| unreachable!());
        let chunks = chunker.chunk(&text);
        assert_eq!(span(&chunks[0]), (0, 702));
    }

    #[test]
    fn test_multibyte_text_uses_char_units() {
        let text = "é".repeat(1500);
        let chunker = SizeChunker::new(1000, 100).unwrap_or_else(|_| unreachable!());
        let chunks = chunker.chunk(&text);
        assert_eq!(chunks[0].char_len(), 1000);
        assert_eq!(span(&chunks[1]), (900, 1500));
    }

    fn non_blank(chars: &[char]) -> usize {
        chars.iter().filter(|c| !c.is_whitespace()).count()
    }

    proptest! {
        #[test]
        fn prop_windows_cover_text_and_terminate(
            text in "[a-z. \n]{1,6000}",
            chunk_size in 300usize..2000,
            overlap in MIN_CHUNK_CHARS..250,
        ) {
            let chunker = SizeChunker::new(chunk_size, overlap).unwrap_or_else(|_| unreachable!());
            let chunks = chunker.chunk(&text);
            let chars: Vec<char> = text.chars().collect();
            let total = chars.len();

            let step = chunk_size - overlap;
            prop_assert!(chunks.len() <= total.div_ceil(step));

            let spans: Vec<_> = chunks.iter().map(span).collect();
            let Some((first, last)) = spans.first().zip(spans.last()) else {
                // Nothing emitted: the whole text trims to a short chunk.
                prop_assert!(non_blank(&chars) <= MIN_CHUNK_CHARS);
                return Ok(());
            };

            // Only a short, dropped window may sit outside the emitted spans.
            prop_assert!(non_blank(&chars[..first.0]) <= MIN_CHUNK_CHARS);
            prop_assert!(non_blank(&chars[last.1..]) <= MIN_CHUNK_CHARS);
            for pair in spans.windows(2) {
                prop_assert!(pair[1].0 > pair[0].0);
                prop_assert!(pair[1].0 <= pair[0].1);
                prop_assert!(pair[1].0 >= pair[0].1.saturating_sub(overlap));
            }
            for &(start, end) in &spans {
                prop_assert!(end <= total);
                prop_assert!(end - start <= chunk_size + SNAP_LOOKAHEAD);
            }
        }

        #[test]
        fn prop_letters_only_windows_overlap_exactly(
            text in "[a-z]{1,6000}",
            chunk_size in 300usize..2000,
            overlap in MIN_CHUNK_CHARS..250,
        ) {
            let chunker = SizeChunker::new(chunk_size, overlap).unwrap_or_else(|_| unreachable!());
            let chunks = chunker.chunk(&text);
            let total = text.chars().count();

            if total > MIN_CHUNK_CHARS {
                let spans: Vec<_> = chunks.iter().map(span).collect();
                prop_assert_eq!(spans.first().map(|s| s.0), Some(0));
                prop_assert_eq!(spans.last().map(|s| s.1), Some(total));
                for pair in spans.windows(2) {
                    prop_assert_eq!(pair[1].0, pair[0].1 - overlap);
                }
            } else {
                prop_assert!(chunks.is_empty());
            }
        }
    }
}
