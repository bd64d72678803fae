//! Core data types for RLM-Reader.
//!
//! Documents are produced once by the extractor and never mutated; chunks
//! and structure reports are derived from them on demand.

pub mod chunk;
pub mod document;
pub mod structure;

pub use chunk::{Chunk, ChunkMethod};
pub use document::{Document, PAGE_BREAK};
pub use structure::StructureReport;
