//! File reading and UTF-8 safe truncation helpers.
//!
//! Large local documents are memory-mapped rather than read through a
//! buffered reader. All prefix helpers cut on character (or grapheme)
//! boundaries so slicing never panics on multi-byte text.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::ExtractionError;

/// Reads a file as UTF-8 text, replacing invalid sequences.
///
/// # Errors
///
/// Returns [`ExtractionError::NotFound`] if the path does not exist and
/// [`ExtractionError::Io`] on read failures.
pub fn read_file(path: &Path) -> Result<String, ExtractionError> {
    if !path.exists() {
        return Err(ExtractionError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(String::new());
    }

    // SAFETY: read-only mapping, dropped before this function returns.
    #[allow(unsafe_code)]
    let mmap = unsafe { Mmap::map(&file)? };

    Ok(String::from_utf8_lossy(&mmap).into_owned())
}

/// Finds the largest char boundary `<= max_bytes`.
#[must_use]
pub fn find_char_boundary(s: &str, max_bytes: usize) -> usize {
    if max_bytes >= s.len() {
        return s.len();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Returns the first `max_chars` characters of `s`.
#[must_use]
pub fn prefix_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Returns the first `max_graphemes` user-perceived characters of `s`.
///
/// Used for human-facing previews so combining sequences stay intact.
#[must_use]
pub fn prefix_graphemes(s: &str, max_graphemes: usize) -> &str {
    match s.grapheme_indices(true).nth(max_graphemes) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_file_missing() {
        let result = read_file(Path::new("/definitely/not/here.txt"));
        assert!(matches!(result, Err(ExtractionError::NotFound { .. })));
    }

    #[test]
    fn test_read_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| unreachable!("{e}"));
        write!(file, "hello mapped world").unwrap_or_else(|e| unreachable!("{e}"));
        let text = read_file(file.path()).unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(text, "hello mapped world");
    }

    #[test]
    fn test_read_file_empty() {
        let file = tempfile::NamedTempFile::new().unwrap_or_else(|e| unreachable!("{e}"));
        let text = read_file(file.path()).unwrap_or_else(|e| unreachable!("{e}"));
        assert!(text.is_empty());
    }

    #[test]
    fn test_find_char_boundary() {
        let s = "aé";
        assert_eq!(find_char_boundary(s, 2), 1);
        assert_eq!(find_char_boundary(s, 10), s.len());
    }

    #[test]
    fn test_prefix_chars() {
        assert_eq!(prefix_chars("héllo", 2), "hé");
        assert_eq!(prefix_chars("hi", 10), "hi");
        assert_eq!(prefix_chars("hi", 0), "");
    }

    #[test]
    fn test_prefix_graphemes_keeps_combining_marks() {
        let s = "e\u{301}tude";
        assert_eq!(prefix_graphemes(s, 1), "e\u{301}");
    }
}
