//! Chunker trait shared by all segmentation strategies.

use crate::core::Chunk;

/// A strategy that splits text into bounded chunks.
///
/// Implementations are pure: the same input always yields the same
/// chunk sequence.
pub trait Chunker: Send + Sync {
    /// Strategy name for logging and CLI selection.
    fn name(&self) -> &'static str;

    /// Splits `text` into chunks. Empty text yields no chunks.
    fn chunk(&self, text: &str) -> Vec<Chunk>;
}
