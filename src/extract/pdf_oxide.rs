//! `pdf_oxide` backend.

use std::path::Path;

use super::{TextBackend, is_pdf};
use crate::error::ExtractionError;

/// PDF text extraction via the `pdf_oxide` crate, page by page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfOxideBackend;

fn backend_error(e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Backend {
        backend: "pdf_oxide",
        message: e.to_string(),
    }
}

impl TextBackend for PdfOxideBackend {
    fn name(&self) -> &'static str {
        "pdf_oxide"
    }

    fn supports(&self, path: &Path) -> bool {
        is_pdf(path)
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        let mut doc = ::pdf_oxide::PdfDocument::open(path).map_err(backend_error)?;
        let count = doc.page_count().map_err(backend_error)?;
        (0..count)
            .map(|i| doc.extract_text(i).map_err(backend_error))
            .collect()
    }
}
