// src/error.rs
// =============================================================================
// Typed errors for the failures a crawl knows how to recover from.
//
// Recovery policy:
// - PageLoad: logged with the URL, the page contributes no findings and no
//   links, the crawl moves on
// - CheckerUnavailable: same as PageLoad
// - ExclusionSourceUnreadable: logged once at startup, the run continues
//   with an empty exclusion set
// - InvalidStartUrl: fatal, reported before any page is fetched
//
// Everything else in the application layer goes through anyhow.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardianError {
    #[error("failed to load page {url}: {reason}")]
    PageLoad { url: String, reason: String },

    #[error("text checker unavailable: {reason}")]
    CheckerUnavailable { reason: String },

    #[error("cannot read exclusion source {}: {source}", path.display())]
    ExclusionSourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid start URL '{url}': {reason}")]
    InvalidStartUrl { url: String, reason: String },
}

impl GuardianError {
    pub fn page_load(url: impl Into<String>, reason: impl ToString) -> Self {
        GuardianError::PageLoad {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn checker(reason: impl ToString) -> Self {
        GuardianError::CheckerUnavailable {
            reason: reason.to_string(),
        }
    }
}
