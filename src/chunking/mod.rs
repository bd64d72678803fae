//! Document segmentation.
//!
//! Two strategies implement [`Chunker`]: [`SectionChunker`] splits at
//! detected headings and [`SizeChunker`] emits overlapping fixed-size
//! windows. [`Segmenter`] tries sections first and falls back to size.

pub mod section;
pub mod size;
pub mod traits;

pub use section::SectionChunker;
pub use size::SizeChunker;
pub use traits::Chunker;

use tracing::debug;

use crate::core::{Chunk, Document};
use crate::error::ConfigError;

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Default overlap between consecutive windows in characters.
pub const DEFAULT_OVERLAP: usize = 500;

/// Chunks whose trimmed text is this short or shorter are dropped.
pub const MIN_CHUNK_CHARS: usize = 100;

/// How far past a window end the size chunker looks for a boundary.
pub const SNAP_LOOKAHEAD: usize = 200;

/// Section-first segmentation with size-based fallback.
///
/// Section output is accepted only when it yields more than one chunk.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    section: SectionChunker,
    size: SizeChunker,
}

impl Segmenter {
    /// Creates a segmenter with the given size-fallback parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the size parameters are invalid.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            section: SectionChunker::new(),
            size: SizeChunker::new(chunk_size, overlap)?,
        })
    }

    /// Segments a document's content.
    #[must_use]
    pub fn segment(&self, document: &Document) -> Vec<Chunk> {
        self.chunk(&document.content)
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            section: SectionChunker::new(),
            size: SizeChunker::default(),
        }
    }
}

impl Chunker for Segmenter {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }
        let sections = self.section.chunk(text);
        if sections.len() > 1 {
            debug!(chunks = sections.len(), "Segmented by sections");
            return sections;
        }
        let windows = self.size.chunk(text);
        debug!(
            chunks = windows.len(),
            chunk_size = self.size.chunk_size(),
            overlap = self.size.overlap(),
            "Segmented by size"
        );
        windows
    }
}

/// Creates a chunker by strategy name (`auto`, `section` or `size`).
///
/// # Errors
///
/// Returns an error for an unknown name or invalid size parameters.
pub fn create_chunker(
    name: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Box<dyn Chunker>, ConfigError> {
    match name {
        "auto" => Ok(Box::new(Segmenter::new(chunk_size, overlap)?)),
        "section" => Ok(Box::new(SectionChunker::new())),
        "size" => Ok(Box::new(SizeChunker::new(chunk_size, overlap)?)),
        _ => Err(ConfigError::UnknownChunker {
            name: name.to_string(),
        }),
    }
}

/// Names accepted by [`create_chunker`].
#[must_use]
pub const fn available_strategies() -> &'static [&'static str] {
    &["auto", "section", "size"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ChunkMethod;
    use test_case::test_case;

    fn paragraph() -> String {
        "The committee reviewed the findings and agreed on next steps. ".repeat(4)
    }

    #[test]
    fn test_all_caps_headings_segment_by_section() {
        let headings = [
            "INTRODUCTION",
            "BACKGROUND",
            "METHODOLOGY",
            "RESULTS",
            "DISCUSSION",
            "CONCLUSION",
        ];
        let text: String = headings
            .iter()
            .map(|h| format!("{h}\n{}\n", paragraph()))
            .collect();

        let chunks = Segmenter::default().chunk(&text);
        assert_eq!(chunks.len(), 6);
        for (chunk, heading) in chunks.iter().zip(headings) {
            assert_eq!(chunk.method, ChunkMethod::Section);
            assert!(chunk.content.starts_with(heading));
        }
    }

    #[test]
    fn test_unstructured_text_falls_back_to_size() {
        let text = "plain words without any structure ".repeat(1000);
        let segmenter = Segmenter::new(2000, 200).unwrap_or_else(|_| unreachable!());
        let chunks = segmenter.chunk(&text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.method == ChunkMethod::Size));
        assert!(chunks.iter().all(|c| c.char_len() <= 2000));
    }

    #[test]
    fn test_single_section_falls_back_to_size() {
        let text = format!("# Only heading\n{}", paragraph());
        let chunks = Segmenter::default().chunk(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].method, ChunkMethod::Size);
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new("empty", "");
        assert!(Segmenter::default().segment(&doc).is_empty());
    }

    #[test]
    fn test_indices_are_sequential() {
        let text = "sentence number one goes here. ".repeat(2000);
        let chunks = Segmenter::new(1000, 100)
            .unwrap_or_else(|_| unreachable!())
            .chunk(&text);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn test_segmenting_twice_is_identical() {
        let sections: String = ["# Alpha", "# Beta", "# Gamma"]
            .iter()
            .map(|h| format!("{h}\n{}\n", paragraph()))
            .collect();
        let windows = "no headings here, only one long run of prose. ".repeat(300);
        let segmenter = Segmenter::new(1500, 150).unwrap_or_else(|_| unreachable!());

        for content in [sections, windows] {
            let doc = Document::new("doc", content);
            let first = segmenter.segment(&doc);
            let second = segmenter.segment(&doc);
            assert!(!first.is_empty());
            assert_eq!(first.len(), second.len());
            for (a, b) in first.iter().zip(&second) {
                assert_eq!(a.content.as_bytes(), b.content.as_bytes());
                assert_eq!(a.index, b.index);
                assert_eq!(a.method, b.method);
                assert_eq!(a.metadata, b.metadata);
            }
        }
    }

    #[test_case("auto" ; "auto strategy")]
    #[test_case("section" ; "section strategy")]
    #[test_case("size" ; "size strategy")]
    fn test_create_chunker(name: &str) {
        let chunker = create_chunker(name, 1000, 100).unwrap_or_else(|_| unreachable!());
        assert_eq!(chunker.name(), name);
    }

    #[test]
    fn test_create_chunker_unknown() {
        assert!(matches!(
            create_chunker("semantic", 1000, 100),
            Err(ConfigError::UnknownChunker { .. })
        ));
        assert!(matches!(
            create_chunker("size", 100, 100),
            Err(ConfigError::OverlapTooLarge { .. })
        ));
    }
}
