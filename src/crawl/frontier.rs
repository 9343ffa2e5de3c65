// src/crawl/frontier.rs
// =============================================================================
// The crawl frontier: pending work plus every URL we've ever accepted.
//
// How it works:
// 1. seed() marks the start URL as seen and hands it back as the first item
// 2. discover_links() takes the raw hrefs of a processed page and keeps only
//    those that are non-empty, inside the scope prefix and never seen before
// 3. next() pops the oldest pending item (breadth-first)
//
// Invariant: a URL is accepted at most once. The seen-check and the insert
// are one operation (VisitedSet::insert), so there is no window in which
// two discoveries of the same URL can both get in.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use url::Url;

// A unit of work: a canonical URL and how far it is from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlItem {
    pub url: String,
    pub depth: usize, // The seed is depth 1, pages it links to are depth 2, etc.
}

// Every URL that has been enqueued or processed.
//
// Only exposes an atomic check-and-insert; there is intentionally no
// separate "contains then insert" path for callers to race on.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    /// Returns true if the URL was not present and has now been recorded.
    pub fn insert(&mut self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

#[derive(Debug)]
pub struct Frontier {
    scope: String,
    visited: VisitedSet,
    pending: VecDeque<CrawlItem>,
}

impl Frontier {
    // The scope goes through the same canonical form as every link, so a
    // scope typed as "https://host" or with raw non-ASCII path segments
    // still prefixes the serialized URLs it is compared against.
    pub fn new(scope: impl Into<String>) -> Self {
        let scope = scope.into();
        Frontier {
            scope: canonicalize(&scope).unwrap_or(scope),
            visited: VisitedSet::default(),
            pending: VecDeque::new(),
        }
    }

    // Records the start URL and returns it as the first unit of work.
    //
    // The seed is not pushed onto the pending queue; the caller processes it
    // directly. It is not scope-checked either - whatever the user asked to
    // start from gets visited.
    pub fn seed(&mut self, url: &str) -> CrawlItem {
        let url = canonicalize(url).unwrap_or_else(|| url.to_string());
        self.visited.insert(&url);
        CrawlItem { url, depth: 1 }
    }

    // Filters the links found on `parent` and queues the new ones.
    //
    // Parameters:
    //   parent: the page the links were scraped from
    //   links: raw href values (may be empty, out of scope or duplicated)
    //
    // Returns: the canonical URLs that were accepted, in input order
    pub fn discover_links<I, S>(&mut self, parent: &CrawlItem, links: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted = Vec::new();

        for link in links {
            let url = match canonicalize(link.as_ref()) {
                Some(url) => url,
                None => continue,
            };

            if !url.starts_with(&self.scope) {
                continue;
            }

            if self.visited.insert(&url) {
                self.pending.push_back(CrawlItem {
                    url: url.clone(),
                    depth: parent.depth + 1,
                });
                accepted.push(url);
            }
        }

        accepted
    }

    pub fn next(&mut self) -> Option<CrawlItem> {
        self.pending.pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn seen_len(&self) -> usize {
        self.visited.len()
    }
}

// Trims whitespace and drops the #fragment. Absolute URLs are re-serialized
// by the url crate (empty path becomes "/", host lower-cased, non-ASCII
// percent-encoded), which is the form HttpSession resolves links into.
// Anything that doesn't parse is kept as the trimmed string. Returns None
// for links that are empty after that.
fn canonicalize(link: &str) -> Option<String> {
    let link = link.trim();

    if let Ok(mut url) = Url::parse(link) {
        url.set_fragment(None);
        return Some(url.to_string());
    }

    let without_fragment = match link.find('#') {
        Some(index) => &link[..index],
        None => link,
    };

    if without_fragment.is_empty() {
        None
    } else {
        Some(without_fragment.to_string())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does VisitedSet::insert return bool?
//    - HashSet::insert already tells us whether the value was new
//    - Using that answer directly means "check" and "insert" can never drift
//      apart, even if this set is later shared between workers behind a lock
//
// 2. What is the <I, S> on discover_links?
//    - Generic parameters so callers can pass Vec<String>, &[&str], an
//      iterator, ... anything that yields string-like items
//    - AsRef<str> lets us borrow each item as &str without caring about
//      its concrete type
//
// 3. Why VecDeque again?
//    - push_back() + pop_front() gives breadth-first order
//    - Swapping to pop_back() would give depth-first; the visit-once
//      guarantee would still hold
// -----------------------------------------------------------------------------
