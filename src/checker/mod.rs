// src/checker/mod.rs
// =============================================================================
// This module contains all text checking logic.
//
// Submodules:
// - text: the TextChecker trait and the RawMatch it produces
// - languagetool: a TextChecker that talks to a LanguageTool server
// - exclusions: the curated list of accepted false positives
// - filter: turns raw matches into reportable findings
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

mod exclusions;
mod filter;
mod languagetool;
mod text;

pub use exclusions::{ExclusionRecord, ExclusionStore};
pub use filter::{filter_matches, Finding};
pub use languagetool::{LanguageToolChecker, DEFAULT_ENDPOINT};
pub use text::TextChecker;

#[cfg(test)]
pub use text::{RawMatch, CAPITALIZATION_CATEGORY, SPELLING_CATEGORY};
