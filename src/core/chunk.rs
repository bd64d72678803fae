//! Chunk representation produced by the segmenter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Strategy that produced a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkMethod {
    /// Split at detected section headings.
    Section,
    /// Fixed-size windows with overlap.
    Size,
}

impl ChunkMethod {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Size => "size",
        }
    }
}

impl std::fmt::Display for ChunkMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded, trimmed slice of document text.
///
/// `start_unit`/`end_unit` are 1-based position markers (section or window
/// ordinal), not real page numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based index in the emitted sequence.
    pub index: usize,
    /// Trimmed chunk text.
    pub content: String,
    /// First position marker covered.
    pub start_unit: usize,
    /// Last position marker covered.
    pub end_unit: usize,
    /// Strategy that produced this chunk.
    pub method: ChunkMethod,
    /// Strategy-specific metadata (`char_start`, `char_end` for size chunks).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Chunk {
    /// Creates a chunk covering a single position marker.
    #[must_use]
    pub fn new(index: usize, content: String, unit: usize, method: ChunkMethod) -> Self {
        Self {
            index,
            content,
            start_unit: unit,
            end_unit: unit,
            method,
            metadata: BTreeMap::new(),
        }
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Length of the content in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display() {
        assert_eq!(ChunkMethod::Section.to_string(), "section");
        assert_eq!(ChunkMethod::Size.to_string(), "size");
    }

    #[test]
    fn test_method_serialization() {
        let json = serde_json::to_string(&ChunkMethod::Size).unwrap_or_default();
        assert_eq!(json, "\"size\"");
    }

    #[test]
    fn test_chunk_metadata() {
        let chunk = Chunk::new(0, "text".to_string(), 1, ChunkMethod::Size)
            .with_metadata("char_start", 0)
            .with_metadata("char_end", 4);
        assert_eq!(chunk.start_unit, 1);
        assert_eq!(chunk.end_unit, 1);
        assert_eq!(chunk.metadata.get("char_end"), Some(&serde_json::json!(4)));
    }
}
