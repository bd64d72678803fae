//! Response parser.
//!
//! Turns free-form model output into an [`Intent`]. Categories are checked
//! in a fixed priority order and the first match wins:
//!
//! 1. `FINAL("...")` → [`Intent::FinalAnswer`]
//! 2. a fenced code block tagged `python`, `py` or `repl` → [`Intent::CodeBlock`]
//! 3. one or more `llm_query("...")` calls → [`Intent::SubQueries`]
//! 4. anything else → [`Intent::Continue`]

use std::sync::LazyLock;

use regex::Regex;

/// Triple-quoted final answer, checked first.
static FINAL_TRIPLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?s)FINAL\(\s*(?:"""(.*?)"""|'''(.*?)''')\s*\)"#).ok());

/// Single-line final answer without embedded quotes.
static FINAL_SIMPLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"FINAL\(["']([^"']+)["']\)"#).ok());

/// Final answer spanning lines, tolerant of surrounding whitespace.
static FINAL_MULTILINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?s)FINAL\(\s*["'](.+?)["']\s*\)"#).ok());

static CODE_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:python|py|repl)[ \t]*\r?\n(.*?)\r?\n[ \t]*```").ok());

static SUB_QUERY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"llm_query\(["']([^"']+)["']\)"#).ok());

/// What the model asked for in one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// The model declared its answer.
    FinalAnswer(String),
    /// The model wants code run in the sandbox.
    CodeBlock(String),
    /// The model delegated sub-tasks, in text order.
    SubQueries(Vec<String>),
    /// Nothing actionable; the text continues the conversation.
    Continue(String),
}

impl Intent {
    /// Short label for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FinalAnswer(_) => "final",
            Self::CodeBlock(_) => "code",
            Self::SubQueries(_) => "sub_queries",
            Self::Continue(_) => "continue",
        }
    }
}

fn first_capture(pattern: &LazyLock<Option<Regex>>, text: &str) -> Option<String> {
    let caps = pattern.as_ref()?.captures(text)?;
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str().to_string())
}

/// Extracts the final answer, if any.
#[must_use]
pub fn extract_final_answer(text: &str) -> Option<String> {
    first_capture(&FINAL_TRIPLE, text)
        .or_else(|| first_capture(&FINAL_SIMPLE, text))
        .or_else(|| first_capture(&FINAL_MULTILINE, text))
}

/// Extracts the first executable code block, if any.
#[must_use]
pub fn extract_code(text: &str) -> Option<String> {
    first_capture(&CODE_BLOCK, text)
}

/// Extracts every delegated sub-query, in text order.
#[must_use]
pub fn extract_sub_queries(text: &str) -> Vec<String> {
    SUB_QUERY.as_ref().map_or_else(Vec::new, |re| {
        re.captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect()
    })
}

/// Parses a response into an [`Intent`].
#[must_use]
pub fn parse(text: &str) -> Intent {
    if let Some(answer) = extract_final_answer(text) {
        return Intent::FinalAnswer(answer);
    }
    if let Some(code) = extract_code(text) {
        return Intent::CodeBlock(code);
    }
    let queries = extract_sub_queries(text);
    if !queries.is_empty() {
        return Intent::SubQueries(queries);
    }
    Intent::Continue(text.to_string())
}
