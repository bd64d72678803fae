//! `pdf-extract` backend.

use std::path::Path;

use super::{TextBackend, is_pdf};
use crate::core::PAGE_BREAK;
use crate::error::ExtractionError;

/// PDF text extraction via the `pdf-extract` crate.
///
/// The crate returns one string for the whole file; pages are recovered
/// from the form-feed characters it emits between them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractBackend;

impl TextBackend for PdfExtractBackend {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn supports(&self, path: &Path) -> bool {
        is_pdf(path)
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        let bytes = std::fs::read(path)?;
        let text = ::pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            ExtractionError::Backend {
                backend: "pdf-extract",
                message: e.to_string(),
            }
        })?;
        Ok(text.split(PAGE_BREAK).map(str::to_string).collect())
    }
}
