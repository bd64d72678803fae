//! Running counters for one orchestration run.

use serde::{Deserialize, Serialize};

/// Call and token counters, mutated by the loop and read at the end.
///
/// Token figures are estimates: the character length of each response,
/// not provider-reported token counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RlmStats {
    /// Root loop iterations started (including empty and failed ones).
    pub iterations: usize,
    /// Root reasoning calls issued.
    pub root_calls: usize,
    /// Delegated sub-calls issued.
    pub sub_calls: usize,
    /// Estimated tokens in root responses.
    pub root_tokens: usize,
    /// Estimated tokens in successful sub-call responses.
    pub sub_tokens: usize,
}

impl RlmStats {
    /// Root plus sub calls.
    #[must_use]
    pub const fn total_calls(&self) -> usize {
        self.root_calls + self.sub_calls
    }

    /// Root plus sub token estimates.
    #[must_use]
    pub const fn total_tokens(&self) -> usize {
        self.root_tokens + self.sub_tokens
    }
}

/// Character-length token estimate for a response.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count()
}
