//! Output formatting for CLI commands.
//!
//! Commands render either human-readable text or JSON; the text forms of
//! the query and analysis reports are the markdown reports themselves.

use serde::Serialize;
use std::fmt::Write;

use crate::core::Chunk;
use crate::io::prefix_graphemes;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text (markdown for reports).
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// Newline-delimited JSON (one compact object per line).
    Ndjson,
}

impl OutputFormat {
    /// Parses a format name; unknown names fall back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" => Self::Ndjson,
            _ => Self::Text,
        }
    }

    /// Serializes `value` in this format's JSON flavour.
    ///
    /// Serialization failures are reported as a JSON error object rather
    /// than aborting the command.
    #[must_use]
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> String {
        let rendered = match self {
            Self::Ndjson => serde_json::to_string(value),
            Self::Text | Self::Json => serde_json::to_string_pretty(value),
        };
        match rendered {
            Ok(mut s) => {
                s.push('\n');
                s
            }
            Err(e) => format!("{}\n", serde_json::json!({ "error": e.to_string() })),
        }
    }
}

/// Formats the segmenter output as a table with optional content previews.
#[must_use]
pub fn format_chunks(title: &str, chunks: &[Chunk], preview: usize) -> String {
    if chunks.is_empty() {
        return format!("No chunks produced for: {title}\n");
    }

    let mut out = format!("Chunks for: {title} ({} total)\n\n", chunks.len());
    let _ = writeln!(
        out,
        "{:<6} {:<8} {:<10} {:>8}",
        "Index", "Method", "Units", "Chars"
    );
    out.push_str(&"-".repeat(35));
    out.push('\n');

    for chunk in chunks {
        let units = if chunk.start_unit == chunk.end_unit {
            chunk.start_unit.to_string()
        } else {
            format!("{}-{}", chunk.start_unit, chunk.end_unit)
        };
        let _ = writeln!(
            out,
            "{:<6} {:<8} {:<10} {:>8}",
            chunk.index,
            chunk.method.as_str(),
            units,
            chunk.char_len()
        );
        if preview > 0 {
            let _ = writeln!(out, "       {}", preview_line(&chunk.content, preview));
        }
    }
    out
}

/// Single-line preview of at most `max_chars` graphemes.
fn preview_line(content: &str, max_chars: usize) -> String {
    let flat: String = content
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let head = prefix_graphemes(&flat, max_chars).trim_end();
    if head.len() < flat.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}
