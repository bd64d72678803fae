//! Extracted document representation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Page-break marker placed between pages of extracted text.
pub const PAGE_BREAK: char = '\x0C';

/// A document reduced to normalized text.
///
/// Created by the extractor and immutable afterwards. `content` carries
/// page headers (`--- Page N ---`) and [`PAGE_BREAK`] separators when the
/// source had pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Human-readable title (file stem or URL basename).
    pub title: String,
    /// Author, when the backend could determine one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Full normalized text.
    pub content: String,
    /// Number of pages (zero for an empty document).
    pub page_count: usize,
    /// Source metadata (`source`, `backend`, ...).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    /// Creates a document from already-joined text.
    ///
    /// The page count is derived from [`PAGE_BREAK`] markers.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let page_count = if content.is_empty() {
            0
        } else {
            content.split(PAGE_BREAK).count()
        };
        Self {
            title: title.into(),
            author: None,
            content,
            page_count,
            metadata: BTreeMap::new(),
        }
    }

    /// Creates a document from per-page text.
    ///
    /// Blank pages are skipped; each kept page gets a `--- Page N ---`
    /// header carrying its original 1-based number.
    #[must_use]
    pub fn from_pages<S: AsRef<str>>(title: impl Into<String>, pages: &[S]) -> Self {
        let parts: Vec<String> = pages
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.as_ref().trim().is_empty())
            .map(|(i, text)| format!("--- Page {} ---\n{}", i + 1, text.as_ref().trim_end()))
            .collect();
        let separator = format!("\n{PAGE_BREAK}\n");
        Self::new(title, parts.join(separator.as_str()))
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Returns `true` when the document has no text at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Length of the content in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}
