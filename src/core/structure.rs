//! Descriptive statistics about a document's layout.

use serde::{Deserialize, Serialize};

use super::chunk::ChunkMethod;

/// Structure statistics computed by [`analyze`](crate::analysis::analyze).
///
/// Purely derived; recomputed whenever needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureReport {
    /// Page-break markers plus one (never zero).
    pub page_count: usize,
    /// Whitespace-separated words.
    pub word_count: usize,
    /// Characters in the text.
    pub char_count: usize,
    /// Markdown heading lines.
    pub section_count: usize,
    /// Pipe-delimited table rows.
    pub table_count: usize,
    /// Fenced code spans.
    pub code_block_count: usize,
    /// Average words per page, truncated.
    pub avg_words_per_unit: usize,
    /// Chunking strategy hint.
    pub recommended_method: ChunkMethod,
}
