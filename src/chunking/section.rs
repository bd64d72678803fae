//! Section-boundary chunking.
//!
//! Detects heading lines (markdown `#` headings, ALL-CAPS lines, numbered
//! and roman-numeral headers) and slices the text between consecutive
//! headings.

use std::sync::LazyLock;

use regex::Regex;

use super::MIN_CHUNK_CHARS;
use super::traits::Chunker;
use crate::core::{Chunk, ChunkMethod};

/// Heading patterns. Each match start is a section boundary.
static SECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?m)^\n?(#{1,3}\s+.+?)\n",
        r"(?m)^\n?([A-Z][A-Z\s]{5,})\n",
        r"(?m)^\n?(\d+\.\s+.+?)\n",
        r"(?m)^\n?([IVX]+\.\s+.+?)\n",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Splits text at detected section headings.
///
/// Returns no chunks when no heading is found; callers treat that as
/// "no structure" and fall back to size-based chunking.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionChunker;

impl SectionChunker {
    /// Creates a section chunker.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the sorted, deduplicated boundary offsets (bytes), including
    /// the synthetic start and end of text.
    #[must_use]
    pub fn boundaries(text: &str) -> Vec<usize> {
        let mut boundaries = vec![0];
        for pattern in SECTION_PATTERNS.iter() {
            boundaries.extend(pattern.find_iter(text).map(|m| m.start()));
        }
        boundaries.sort_unstable();
        boundaries.dedup();
        if boundaries.last() != Some(&text.len()) {
            boundaries.push(text.len());
        }
        boundaries
    }
}

impl Chunker for SectionChunker {
    fn name(&self) -> &'static str {
        "section"
    }

    fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let boundaries = Self::boundaries(text);
        if boundaries.len() <= 2 {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        for (i, window) in boundaries.windows(2).enumerate() {
            let slice = text[window[0]..window[1]].trim();
            if slice.chars().count() > MIN_CHUNK_CHARS {
                chunks.push(Chunk::new(
                    chunks.len(),
                    slice.to_string(),
                    i + 1,
                    ChunkMethod::Section,
                ));
            }
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(words: usize) -> String {
        "lorem ipsum dolor sit amet ".repeat(words)
    }

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(SECTION_PATTERNS.len(), 4);
    }

    #[test]
    fn test_no_headings_yields_nothing() {
        let text = body(50);
        assert!(SectionChunker::new().chunk(&text).is_empty());
        assert_eq!(SectionChunker::boundaries(&text), vec![0, text.len()]);
    }

    #[test]
    fn test_markdown_headings() {
        let text = format!("# Intro\n{}\n## Details\n{}\n", body(10), body(10));
        let chunks = SectionChunker::new().chunk(&text);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].content.starts_with("# Intro"));
        assert!(chunks[1].content.starts_with("## Details"));
        assert!(chunks.iter().all(|c| c.method == ChunkMethod::Section));
    }

    #[test]
    fn test_numbered_and_roman_headings() {
        let text = format!(
            "1. Scope\n{}\nII. Method\n{}\n",
            body(10),
            body(10)
        );
        let chunks = SectionChunker::new().chunk(&text);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].content.starts_with("II. Method"));
    }

    #[test]
    fn test_tiny_sections_are_discarded() {
        let text = format!("# A\nshort\n# B\n{}\n", body(10));
        let chunks = SectionChunker::new().chunk(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert!(chunks[0].content.starts_with("# B"));
        // Unit markers keep the boundary ordinal, not the emitted index.
        assert_eq!(chunks[0].start_unit, 2);
    }
}
