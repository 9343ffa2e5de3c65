// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a URL
// - Scope restriction by URL prefix (never leaves the configured section)
// - Every page visited exactly once, even when pages link in cycles
// - Optional depth limit, page cap and overall deadline
// - Polite crawling with delays between requests
//
// Submodules:
// - frontier: pending URLs + visited set
// - fetcher: page session interface and its HTTP implementation
// - crawler: the loop that ties fetching, checking and filtering together
// =============================================================================

mod crawler;
mod fetcher;
mod frontier;

pub use crawler::{CrawlOptions, Crawler, Report};
pub use fetcher::HttpFetcher;

#[cfg(test)]
pub use crawler::{PageFailure, PageReport};
