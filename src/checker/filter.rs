// src/checker/filter.rs
// =============================================================================
// Turns raw checker output into reportable findings.
//
// Policy, applied to each match in order:
// 1. sentence-boundary/capitalization matches are always dropped
// 2. matches covered by a structured exclusion record are dropped
// 3. spelling matches whose text is in the word list are dropped
// 4. everything else becomes a Finding, unchanged
//
// The word list is deliberately coarse: it applies on every page and in
// every context. Records are the precise tool (see exclusions.rs).
// =============================================================================

use serde::{Deserialize, Serialize};

use super::exclusions::ExclusionStore;
use super::text::{RawMatch, CAPITALIZATION_CATEGORY, SPELLING_CATEGORY};

// A RawMatch that survived filtering - the unit of output.
//
// Identical findings on one page are kept: each one is a separate
// occurrence in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub matched_text: String,
    pub category: String,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl From<RawMatch> for Finding {
    fn from(m: RawMatch) -> Self {
        Finding {
            matched_text: m.matched_text,
            category: m.category,
            source_url: m.source_url,
            context: m.context,
        }
    }
}

// Applies the suppression policy to every match, keeping the input order.
//
// Parameters:
//   matches: raw checker output for one page
//   exclusions: the store loaded at startup
//
// Returns: the matches that should be reported
pub fn filter_matches(matches: Vec<RawMatch>, exclusions: &ExclusionStore) -> Vec<Finding> {
    matches
        .into_iter()
        .filter(|m| !is_suppressed(m, exclusions))
        .map(Finding::from)
        .collect()
}

fn is_suppressed(m: &RawMatch, exclusions: &ExclusionStore) -> bool {
    if m.category == CAPITALIZATION_CATEGORY {
        return true;
    }
    if exclusions.has_record_for(m) {
        return true;
    }
    m.category == SPELLING_CATEGORY && exclusions.contains(&m.matched_text)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why take Vec<RawMatch> by value?
//    - Each surviving match is turned into a Finding without cloning
//    - into_iter() hands us owned RawMatch values to move from
//
// 2. What does impl From<RawMatch> for Finding give us?
//    - A standard conversion we can pass straight to .map(Finding::from)
//    - It also gives us .into() for free
//
// 3. Why an early return for the capitalization category?
//    - That category is never reported, no matter what the exclusion list
//      says, so there's nothing else to look up
// -----------------------------------------------------------------------------
