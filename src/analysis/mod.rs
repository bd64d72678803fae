//! Structure analysis.
//!
//! Computes descriptive statistics about a document's layout and a
//! chunking recommendation. The pattern scans are independent and run in
//! parallel on the rayon pool.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::{ChunkMethod, PAGE_BREAK, StructureReport};

/// Above this many headings, section-based chunking is recommended.
pub const SECTION_RECOMMENDATION_THRESHOLD: usize = 5;

static HEADING: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?m)^#{1,3}\s+").ok());
static TABLE_ROW: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\|.+\|").ok());
static CODE_BLOCK: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"```[\s\S]*?```").ok());

fn count_matches(pattern: &LazyLock<Option<Regex>>, text: &str) -> usize {
    pattern
        .as_ref()
        .map_or(0, |re| re.find_iter(text).count())
}

/// Analyzes the layout of `text`.
///
/// Never fails; empty text reports one page and zero of everything else.
#[must_use]
pub fn analyze(text: &str) -> StructureReport {
    let ((page_count, word_count, char_count), (section_count, (table_count, code_block_count))) =
        rayon::join(
            || {
                (
                    text.split(PAGE_BREAK).count(),
                    text.split_whitespace().count(),
                    text.chars().count(),
                )
            },
            || {
                rayon::join(
                    || count_matches(&HEADING, text),
                    || {
                        rayon::join(
                            || count_matches(&TABLE_ROW, text),
                            || count_matches(&CODE_BLOCK, text),
                        )
                    },
                )
            },
        );

    let page_count = page_count.max(1);
    let recommended_method = if section_count > SECTION_RECOMMENDATION_THRESHOLD {
        ChunkMethod::Section
    } else {
        ChunkMethod::Size
    };

    StructureReport {
        page_count,
        word_count,
        char_count,
        section_count,
        table_count,
        code_block_count,
        avg_words_per_unit: word_count / page_count,
        recommended_method,
    }
}
