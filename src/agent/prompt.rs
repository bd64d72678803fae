//! System prompts and message builders for the root loop and sub-calls.
//!
//! System prompts are loadable from markdown files so they can be tuned
//! without rebuilding; the builders frame per-iteration user messages.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::core::{Document, StructureReport};
use crate::io::prefix_chars;
use crate::report::format_count;

/// System prompt for the root reasoning loop.
pub const ROOT_SYSTEM_PROMPT: &str = r#"You are operating in a Recursive Language Model (RLM) environment designed for processing large documents.

KEY PRINCIPLES:
1. The full document content is stored externally in a REPL variable called `context`
2. You can examine the context with code: print(context[:1000]) shows the first 1000 characters
3. For complex tasks, break them into sub-tasks and use llm_query() for parallel processing
4. Use code to search, filter, and analyze the document programmatically
5. When you have your final answer, call FINAL("your answer here")

AVAILABLE FUNCTIONS:
- llm_query("prompt"): Spawn a sub-LLM to handle a sub-task (use for parallel processing)
- print(...): Output text to inspect the REPL environment
- Code blocks tagged ```python run as Starlark, a Python dialect: variables, if/elif/else,
  for loops, def, comprehensions, f-strings with plain {name} fields, slicing, the usual
  string, list and dict methods, and the built-ins len, str, int, float, bool, list, tuple,
  dict, sum, max, min, sorted, enumerate, zip, range, abs. There is no while, import, or
  file access. Strings are not iterable: use s.elems() or s.split().
- Variables holding strings, numbers, lists and dicts carry over to later code blocks.
- `chunks` holds the document pre-split into sections or windows, when available.

IMPORTANT:
- Do NOT try to load the entire context into your response at once
- Use code to filter and extract relevant portions
- Write llm_query("...") calls in your reply text, outside code blocks
- Use llm_query() to parallelize independent sub-tasks
- Always call FINAL() when done to provide your answer"#;

/// System prompt for delegated sub-calls.
pub const SUB_SYSTEM_PROMPT: &str =
    "You are a specialized sub-model assisting with document analysis.";

/// Default prompt directory under the user's home.
const DEFAULT_PROMPT_DIR: &str = ".config/rlm-reader/prompts";

/// Filename for the root prompt template.
const ROOT_FILENAME: &str = "root.md";
/// Filename for the sub-call prompt template.
const SUB_FILENAME: &str = "subcall.md";

/// System prompts used by one orchestration run.
///
/// Loaded from external template files when available, falling back to
/// compiled-in defaults.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// System prompt for root calls.
    pub root: String,
    /// System prompt for sub-calls.
    pub sub: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for `prompt_dir`:
    /// 1. Explicit `prompt_dir` argument
    /// 2. `RLM_PROMPT_DIR` environment variable
    /// 3. `~/.config/rlm-reader/prompts/`
    ///
    /// Each file is loaded independently; a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var("RLM_PROMPT_DIR").ok().map(PathBuf::from))
            .or_else(Self::default_dir);

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            root: load_file(ROOT_FILENAME, ROOT_SYSTEM_PROMPT),
            sub: load_file(SUB_FILENAME, SUB_SYSTEM_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            root: ROOT_SYSTEM_PROMPT.to_string(),
            sub: SUB_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (ROOT_FILENAME, ROOT_SYSTEM_PROMPT),
            (SUB_FILENAME, SUB_SYSTEM_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Frames a document as the externalized context: a structure header
/// followed by the full text.
#[must_use]
pub fn build_document_context(document: &Document, report: &StructureReport) -> String {
    let mut out = String::with_capacity(document.content.len() + 512);
    let _ = write!(
        out,
        "# Document: {title}\n\n\
         ## Document Structure\n\
         - Total pages: {pages}\n\
         - Total words: {words}\n\
         - Total characters: {chars}\n\
         - Sections detected: {sections}\n\
         - Tables detected: {tables}\n\
         - Code blocks: {code}\n\n\
         ## Full Content\n",
        title = document.title,
        pages = report.page_count,
        words = format_count(report.word_count),
        chars = format_count(report.char_count),
        sections = report.section_count,
        tables = report.table_count,
        code = report.code_block_count,
    );
    out.push_str(&document.content);
    out.push('\n');
    out
}

/// Builds the first root prompt: context size and preview, the query,
/// and the protocol instructions.
#[must_use]
pub fn build_initial_prompt(context: &str, query: &str, preview_chars: usize) -> String {
    format!(
        "You are operating in a Recursive Language Model (RLM) environment.\n\n\
         CONTEXT INFORMATION:\n\
         - The full document content is available in the REPL variable `context`\n\
         - Context length: {length} characters\n\
         - Context preview (first {preview_chars} chars): {preview}...\n\n\
         YOUR QUERY: {query}\n\n\
         Available functions:\n\
         - llm_query(prompt): Make a recursive sub-LLM call (for parallel processing)\n\
         - print(content): Output to REPL (will be visible to you)\n\
         - FINAL(answer): Submit your final answer and complete the task\n\
         - ```python code blocks: Starlark (Python dialect) for analysis and filtering\n\n\
         Strategy:\n\
         1. First, explore the context with code to understand its structure\n\
         2. Break down complex queries into sub-tasks\n\
         3. Use llm_query() in parallel for independent sub-tasks\n\
         4. Synthesize findings and call FINAL() with your answer\n\n\
         Begin your analysis now.",
        length = format_count(context.chars().count()),
        preview = prefix_chars(context, preview_chars),
    )
}

/// Frames sandbox output as the next root prompt, truncated to `max_len` characters.
#[must_use]
pub fn build_repl_feedback(output: &str, max_len: usize) -> String {
    format!(
        "REPL output from your code:\n{}\n\n\
         Continue your analysis. Remember to use FINAL(answer) when done.",
        prefix_chars(output, max_len)
    )
}

/// Aggregates sub-call results, labeled by position, as the next root prompt.
#[must_use]
pub fn build_sub_results<S: AsRef<str>>(results: &[S]) -> String {
    let blocks: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("Sub-query {} result:\n{}", i + 1, r.as_ref()))
        .collect();
    format!(
        "Parallel sub-LLM results:\n\n{}\n\n\
         Use these results to continue your analysis. Call FINAL(answer) when ready.",
        blocks.join("\n\n")
    )
}

/// Corrective prompt after a failed root call.
#[must_use]
pub fn build_error_prompt(error: &dyn std::fmt::Display) -> String {
    format!("Error occurred: {error}\nPlease retry or adjust your approach.")
}

/// Builds the single-shot prompt for one delegated sub-task.
#[must_use]
pub fn build_sub_prompt(context: &str, query: &str, context_chars: usize) -> String {
    format!(
        "You are a sub-LLM in a Recursive Language Model system.\n\n\
         CONTEXT SNIPPET:\n{}\n\n\
         YOUR SUB-TASK:\n{query}\n\n\
         Provide a concise, focused answer to this specific sub-task.\n\
         Do not call FINAL() or llm_query() - just answer directly.",
        prefix_chars(context, context_chars)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;

    #[test]
    fn test_initial_prompt_frames_context() {
        let context = "x".repeat(1500);
        let prompt = build_initial_prompt(&context, "what is this?", 500);
        assert!(prompt.contains("Context length: 1,500 characters"));
        assert!(prompt.contains(&format!("{}...", "x".repeat(500))));
        assert!(!prompt.contains(&"x".repeat(501)));
        assert!(prompt.contains("YOUR QUERY: what is this?"));
    }

    #[test]
    fn test_repl_feedback_truncates() {
        let prompt = build_repl_feedback("abcdef", 3);
        assert!(prompt.starts_with("REPL output from your code:\nabc\n\n"));
        assert!(prompt.contains("FINAL(answer)"));
    }

    #[test]
    fn test_sub_results_are_labeled_in_order() {
        let prompt = build_sub_results(&["first", "second"]);
        let one = prompt.find("Sub-query 1 result:\nfirst");
        let two = prompt.find("Sub-query 2 result:\nsecond");
        assert!(one.is_some() && two.is_some() && one < two);
    }

    #[test]
    fn test_sub_prompt_uses_context_prefix() {
        let prompt = build_sub_prompt("abcdefghij", "count words", 4);
        assert!(prompt.contains("CONTEXT SNIPPET:\nabcd\n"));
        assert!(!prompt.contains("abcde"));
        assert!(prompt.contains("YOUR SUB-TASK:\ncount words"));
    }

    #[test]
    fn test_document_context_header() {
        let doc = Document::new("report", "one two three\x0Cfour");
        let framed = build_document_context(&doc, &analyze(&doc.content));
        assert!(framed.starts_with("# Document: report\n\n## Document Structure\n"));
        assert!(framed.contains("- Total pages: 2\n"));
        assert!(framed.contains("- Total words: 4\n"));
        assert!(framed.contains("## Full Content\none two three"));
    }

    #[test]
    fn test_load_falls_back_per_file() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        std::fs::write(dir.path().join("root.md"), "custom root").unwrap_or_else(|_| unreachable!());
        let prompts = PromptSet::load(Some(dir.path()));
        assert_eq!(prompts.root, "custom root");
        assert_eq!(prompts.sub, SUB_SYSTEM_PROMPT);
    }

    #[test]
    fn test_write_defaults_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        std::fs::write(dir.path().join("subcall.md"), "mine").unwrap_or_else(|_| unreachable!());
        let written = PromptSet::write_defaults(dir.path()).unwrap_or_default();
        assert_eq!(written, vec![dir.path().join("root.md")]);
        let kept = std::fs::read_to_string(dir.path().join("subcall.md")).unwrap_or_default();
        assert_eq!(kept, "mine");
    }
}
