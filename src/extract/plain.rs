//! Plain-text backend for non-PDF files.

use std::path::Path;

use super::{TextBackend, is_pdf};
use crate::core::PAGE_BREAK;
use crate::error::ExtractionError;
use crate::io::read_file;

/// Reads any non-PDF file as UTF-8 text (lossy).
///
/// Form-feed characters in the file are treated as page breaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextBackend;

impl TextBackend for PlainTextBackend {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn supports(&self, path: &Path) -> bool {
        !is_pdf(path)
    }

    fn paginated(&self) -> bool {
        false
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        let text = read_file(path)?;
        Ok(text.split(PAGE_BREAK).map(str::to_string).collect())
    }
}
