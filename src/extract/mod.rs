//! Text extraction.
//!
//! An [`Extractor`] turns a local path or an `http(s)` URL into a
//! [`Document`]. Backends are tried in order; a backend that fails or
//! produces no text is skipped with a warning. When every backend gives
//! up, the document carries a placeholder notice instead of an error so
//! callers still get something to reason over.
//!
//! Backends:
//!
//! | Backend | Feature | Handles |
//! |---------|---------|---------|
//! | `pdf_oxide` | `pdf-oxide` | `.pdf` |
//! | `pdf-extract` | `pdf-extract` | `.pdf` |
//! | `plain` | always | everything except `.pdf` |

#[cfg(feature = "pdf-extract")]
pub mod pdf_extract;
#[cfg(feature = "pdf-oxide")]
pub mod pdf_oxide;
pub mod plain;
#[cfg(feature = "remote")]
pub mod remote;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::core::{Document, PAGE_BREAK};
use crate::error::ExtractionError;

pub use plain::PlainTextBackend;

/// Default timeout for remote fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A text extraction backend.
pub trait TextBackend: Send + Sync {
    /// Backend name, recorded in document metadata.
    fn name(&self) -> &'static str;

    /// Returns `true` if this backend should be tried for `path`.
    fn supports(&self, path: &Path) -> bool;

    /// Whether output should get `--- Page N ---` headers.
    fn paginated(&self) -> bool {
        true
    }

    /// Extracts text, one entry per page.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError>;
}

/// Returns `true` if `path` has a `.pdf` extension (any case).
#[must_use]
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Returns `true` if `source` names an `http(s)` URL.
#[must_use]
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Backend chain plus remote-fetch settings.
///
/// Backends run on the blocking thread pool when driven through
/// [`Extractor::extract`].
pub struct Extractor {
    backends: Arc<[Box<dyn TextBackend>]>,
    fetch_timeout: Duration,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("backends", &self.backend_names())
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Creates an extractor with every compiled-in backend.
    #[must_use]
    pub fn new() -> Self {
        let mut backends: Vec<Box<dyn TextBackend>> = Vec::new();
        #[cfg(feature = "pdf-oxide")]
        backends.push(Box::new(pdf_oxide::PdfOxideBackend));
        #[cfg(feature = "pdf-extract")]
        backends.push(Box::new(pdf_extract::PdfExtractBackend));
        backends.push(Box::new(PlainTextBackend));
        Self::with_backends(backends)
    }

    /// Creates an extractor with an explicit backend chain.
    #[must_use]
    pub fn with_backends(backends: Vec<Box<dyn TextBackend>>) -> Self {
        Self {
            backends: backends.into(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Sets the remote fetch timeout.
    #[must_use]
    pub const fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Names of the configured backends, in trial order.
    #[must_use]
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Extracts a local file or a URL.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::NotFound`] for a missing local file and
    /// [`ExtractionError::Fetch`] when a URL cannot be downloaded.
    pub async fn extract(&self, source: &str) -> Result<Document, ExtractionError> {
        if is_remote(source) {
            return self.extract_url(source).await;
        }
        let backends = Arc::clone(&self.backends);
        let path = PathBuf::from(source);
        tokio::task::spawn_blocking(move || extract_file_with(&backends, &path))
            .await
            .map_err(task_failed)?
    }

    /// Extracts a local file on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::NotFound`] if the path does not exist.
    pub fn extract_file(&self, path: &Path) -> Result<Document, ExtractionError> {
        extract_file_with(&self.backends, path)
    }

    #[cfg(feature = "remote")]
    async fn extract_url(&self, url: &str) -> Result<Document, ExtractionError> {
        let fetched = remote::fetch(url, self.fetch_timeout).await?;
        let title = remote::title_from_url(url);
        let backends = Arc::clone(&self.backends);
        // The temporary file is removed when `fetched` drops at the end of the task.
        let doc = tokio::task::spawn_blocking(move || extract_with_title(&backends, fetched.path(), title))
            .await
            .map_err(task_failed)?;
        Ok(doc.with_metadata("source", url))
    }

    #[cfg(not(feature = "remote"))]
    #[allow(clippy::unused_async)]
    async fn extract_url(&self, url: &str) -> Result<Document, ExtractionError> {
        Err(ExtractionError::Fetch {
            url: url.to_string(),
            message: "remote sources require the `remote` feature".to_string(),
        })
    }
}

fn task_failed(e: tokio::task::JoinError) -> ExtractionError {
    ExtractionError::Backend {
        backend: "extractor",
        message: format!("extraction task failed: {e}"),
    }
}

fn extract_file_with(backends: &[Box<dyn TextBackend>], path: &Path) -> Result<Document, ExtractionError> {
    if !path.exists() {
        return Err(ExtractionError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let title = path
        .file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
    let source = path.display().to_string();
    Ok(extract_with_title(backends, path, title).with_metadata("source", source))
}

fn extract_with_title(backends: &[Box<dyn TextBackend>], path: &Path, title: String) -> Document {
    for backend in backends.iter().filter(|b| b.supports(path)) {
        match backend.extract_pages(path) {
            Ok(pages) if pages.iter().any(|p| !p.trim().is_empty()) => {
                debug!(backend = backend.name(), pages = pages.len(), "Extracted text");
                let doc = if backend.paginated() {
                    Document::from_pages(title, &pages)
                } else {
                    Document::new(title, pages.join(PAGE_BREAK.to_string().as_str()))
                };
                return doc.with_metadata("backend", backend.name());
            }
            Ok(_) => warn!(
                backend = backend.name(),
                path = %path.display(),
                "Backend produced no text"
            ),
            Err(e) => warn!(
                backend = backend.name(),
                path = %path.display(),
                error = %e,
                "Backend failed"
            ),
        }
    }

    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
    warn!(path = %path.display(), "No backend could extract text");
    Document::new(title, placeholder_notice(&name)).with_metadata("backend", "none")
}

/// Text used in place of content when no backend could read a file.
#[must_use]
pub fn placeholder_notice(file_name: &str) -> String {
    format!(
        "[Could not extract text from {file_name}. Rebuild with the `pdf-oxide` or `pdf-extract` feature, or convert the file to text.]"
    )
}
