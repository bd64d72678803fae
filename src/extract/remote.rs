//! Remote document fetch.
//!
//! Downloads a URL into a named temporary file that is deleted when the
//! returned handle drops, on success and failure alike.

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ExtractionError;

/// Fallback extension when the URL has none.
const DEFAULT_EXTENSION: &str = "pdf";

fn fetch_error(url: &str, e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    }
}

/// Last path segment of `url`, without query string or fragment.
fn basename(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

/// File extension of the URL's basename, if any.
#[must_use]
pub fn extension_from_url(url: &str) -> Option<&str> {
    let name = basename(url);
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(char::is_alphanumeric))
}

/// Document title derived from the URL's basename.
#[must_use]
pub fn title_from_url(url: &str) -> String {
    let name = basename(url);
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    if stem.is_empty() {
        url.to_string()
    } else {
        stem.to_string()
    }
}

/// Downloads `url` into a temporary file.
///
/// # Errors
///
/// Returns [`ExtractionError::Fetch`] on network failure, timeout or a
/// non-success status.
pub async fn fetch(url: &str, timeout: Duration) -> Result<NamedTempFile, ExtractionError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| fetch_error(url, e))?;

    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| fetch_error(url, e))?;
    let bytes = response.bytes().await.map_err(|e| fetch_error(url, e))?;
    debug!(url, bytes = bytes.len(), "Fetched remote document");

    let suffix = format!(".{}", extension_from_url(url).unwrap_or(DEFAULT_EXTENSION));
    let mut file = tempfile::Builder::new()
        .prefix("rlm-reader-")
        .suffix(&suffix)
        .tempfile()?;
    file.write_all(&bytes)?;
    file.flush()?;
    Ok(file)
}
