// src/checker/text.rs
// =============================================================================
// The text checker interface and the raw output it produces.
//
// A TextChecker takes the visible text of one page and returns every span it
// considers wrong, each tagged with a category label. Nothing here decides
// whether a span is worth reporting - that is the filter's job
// (see filter.rs).
//
// Two category labels have fixed meaning for the filter, so they live here
// as constants that every checker implementation maps onto.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::GuardianError;

/// Stylistic "missing period / capital letter" category. Always dropped.
pub const CAPITALIZATION_CATEGORY: &str = "sentence-boundary/capitalization";

/// Dictionary misses with suggested corrections. Cross-checked against the
/// exclusion list.
pub const SPELLING_CATEGORY: &str = "spelling-with-suggestions";

// One flagged span, exactly as the checker reported it.
//
// Fields:
//   matched_text: the literal text of the flagged span
//   category: one of the constants above, or a checker-specific label
//   source_url: the page (or file) the text came from
//   context: optional snippet around the span, for locating it by eye
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatch {
    pub matched_text: String,
    pub category: String,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl RawMatch {
    pub fn new(
        matched_text: impl Into<String>,
        category: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        RawMatch {
            matched_text: matched_text.into(),
            category: category.into(),
            source_url: source_url.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

// Anything that can proofread a block of text.
//
// Parameters:
//   text: the visible text of one page
//   source_url: stamped onto every RawMatch so findings can be grouped
//
// Returns: all flagged spans in the order the checker reported them, or
// GuardianError::CheckerUnavailable when the engine could not process the
// input. Callers treat that as a soft, per-page failure.
#[allow(async_fn_in_trait)]
pub trait TextChecker {
    async fn check(&self, text: &str, source_url: &str) -> Result<Vec<RawMatch>, GuardianError>;
}
