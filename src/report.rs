//! Human-readable and JSON reports for `process` and `analyze`.

use std::fmt::Write;

use serde::Serialize;

use crate::agent::{Completion, RlmStats};
use crate::core::{Document, StructureReport};
use crate::io::prefix_chars;

/// Notice reported when the loop ran out of iterations.
pub const NO_CONVERGENCE: &str = "RLM analysis did not converge within max iterations.";

/// Inserts `,` every three digits into a string of ASCII digits.
#[must_use]
pub fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a count with thousands separators (`1234567` → `1,234,567`).
#[must_use]
pub fn format_count(n: usize) -> String {
    group_thousands(&n.to_string())
}

/// Outcome of a `process` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryReport {
    /// Document title.
    pub title: String,
    /// The question asked.
    pub query: String,
    /// Final answer, absent when the loop did not converge.
    pub answer: Option<String>,
    /// Whether a final answer was produced.
    pub converged: bool,
    /// Loop counters.
    pub stats: RlmStats,
}

impl QueryReport {
    /// Wraps a loop result.
    #[must_use]
    pub fn new(title: impl Into<String>, query: impl Into<String>, completion: Completion) -> Self {
        Self {
            title: title.into(),
            query: query.into(),
            converged: completion.converged(),
            answer: completion.answer,
            stats: completion.stats,
        }
    }

    /// Renders the markdown report: answer (or the no-convergence notice)
    /// followed by the statistics block.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let s = &self.stats;
        let mut out = String::from("# RLM Analysis Result\n\n");
        out.push_str(self.answer.as_deref().unwrap_or(NO_CONVERGENCE));
        let _ = write!(
            out,
            "\n\n---\n## RLM Statistics\n\
             - Iterations: {}\n\
             - Root LLM calls: {}\n\
             - Sub-LLM calls: {}\n\
             - Total LLM calls: {}\n\
             - Root tokens: {}\n\
             - Sub-tokens: {}\n\
             - Total tokens: {}\n\n\
             _Token counts are estimates based on response length._\n",
            s.iterations,
            s.root_calls,
            s.sub_calls,
            s.total_calls(),
            format_count(s.root_tokens),
            format_count(s.sub_tokens),
            format_count(s.total_tokens()),
        );
        out
    }
}

/// Outcome of an `analyze` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// Document title.
    pub title: String,
    /// Extraction backend that produced the text, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Structure statistics.
    pub structure: StructureReport,
    /// Leading characters of the content.
    pub preview: String,
}

impl AnalysisReport {
    /// Builds a report with a preview of at most `preview_chars` characters.
    #[must_use]
    pub fn new(document: &Document, structure: StructureReport, preview_chars: usize) -> Self {
        Self {
            title: document.title.clone(),
            backend: document.metadata.get("backend").cloned(),
            structure,
            preview: prefix_chars(&document.content, preview_chars).to_string(),
        }
    }

    /// Renders the markdown report.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let s = &self.structure;
        format!(
            "# Document Structure Analysis\n\n\
             ## Document: {title}\n\n\
             ### Basic Statistics\n\
             - Total pages: {pages}\n\
             - Total words: {words}\n\
             - Total characters: {chars}\n\n\
             ### Content Detection\n\
             - Sections detected: {sections}\n\
             - Tables detected: {tables}\n\
             - Code blocks detected: {code}\n\n\
             ### Processing Recommendations\n\
             - Average words per page: {avg}\n\
             - Recommended chunking method: {method}\n\n\
             ### Content Preview\n\
             {preview}...\n",
            title = self.title,
            pages = s.page_count,
            words = format_count(s.word_count),
            chars = format_count(s.char_count),
            sections = s.section_count,
            tables = s.table_count,
            code = s.code_block_count,
            avg = format_count(s.avg_words_per_unit),
            method = s.recommended_method,
            preview = self.preview,
        )
    }
}
