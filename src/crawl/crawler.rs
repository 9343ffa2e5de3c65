// src/crawl/crawler.rs
// =============================================================================
// The crawl orchestrator.
//
// One run goes INIT -> CRAWLING -> DONE:
// - INIT: seed the frontier, open the page session
// - CRAWLING: pop a URL, load it, check its text, filter the matches, record
//   the findings, queue its in-scope links; repeat until nothing is pending
//   (or a page cap / deadline says stop)
// - DONE: close the session and hand back the report
//
// Pages are processed strictly one after another over a single session.
// A page that fails to load, or whose text the checker can't handle, is
// logged and skipped: it adds no findings and no links, and the crawl goes on.
// =============================================================================

use anyhow::Result;
use log::{info, warn};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

use super::fetcher::{PageFetcher, PageSession};
use super::frontier::{CrawlItem, Frontier};
use crate::checker::{filter_matches, ExclusionStore, Finding, TextChecker};

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Only URLs starting with this prefix are followed
    pub scope: String,
    pub max_depth: Option<usize>,
    pub max_pages: Option<usize>,
    pub deadline: Option<Duration>,
    /// Pause between page loads
    pub delay: Duration,
}

impl CrawlOptions {
    pub fn new(scope: impl Into<String>) -> Self {
        CrawlOptions {
            scope: scope.into(),
            max_depth: None,
            max_pages: None,
            deadline: None,
            delay: Duration::ZERO,
        }
    }
}

// Findings for one visited page (possibly none)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub url: String,
    pub findings: Vec<Finding>,
}

// A page that was skipped because it couldn't be loaded or checked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub url: String,
    pub reason: String,
}

// Everything a crawl produced, in the order pages were processed
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub pages: Vec<PageReport>,
    pub failures: Vec<PageFailure>,
    /// The deadline expired before the frontier was empty
    pub timed_out: bool,
    /// The page cap stopped the crawl with work still pending
    pub truncated: bool,
}

impl Report {
    pub fn pages_with_findings(&self) -> impl Iterator<Item = &PageReport> {
        self.pages.iter().filter(|page| !page.findings.is_empty())
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.pages.iter().flat_map(|page| page.findings.iter())
    }

    pub fn total_findings(&self) -> usize {
        self.findings().count()
    }
}

pub struct Crawler<F, C> {
    fetcher: F,
    checker: C,
    exclusions: ExclusionStore,
    options: CrawlOptions,
}

impl<F, C> Crawler<F, C>
where
    F: PageFetcher,
    C: TextChecker,
{
    pub fn new(fetcher: F, checker: C, exclusions: ExclusionStore, options: CrawlOptions) -> Self {
        Crawler {
            fetcher,
            checker,
            exclusions,
            options,
        }
    }

    // Crawls everything reachable from start_url within the scope prefix.
    //
    // Returns: the accumulated report. Only a failure to open the page
    // session is an error; per-page problems end up in report.failures.
    pub async fn run(&self, start_url: &str) -> Result<Report> {
        let mut frontier = Frontier::new(self.options.scope.clone());
        let seed = frontier.seed(start_url);

        let mut session = self.fetcher.open().await?;
        let report = self.crawl(&mut session, &mut frontier, seed).await;
        session.close().await;

        info!(
            "Crawl finished: {} page(s) checked, {} failure(s), {} URL(s) seen",
            report.pages.len(),
            report.failures.len(),
            frontier.seen_len()
        );
        Ok(report)
    }

    async fn crawl(
        &self,
        session: &mut F::Session,
        frontier: &mut Frontier,
        seed: CrawlItem,
    ) -> Report {
        let started = Instant::now();
        let mut report = Report::default();
        let mut processed = 0usize;
        let mut current = Some(seed);

        while let Some(item) = current.take().or_else(|| frontier.next()) {
            if let Some(deadline) = self.options.deadline {
                if started.elapsed() >= deadline {
                    warn!(
                        "Deadline of {:?} reached, {} URL(s) left unchecked",
                        deadline,
                        frontier.pending_len() + 1
                    );
                    report.timed_out = true;
                    break;
                }
            }

            if let Some(max_pages) = self.options.max_pages {
                if processed >= max_pages {
                    warn!("Page limit of {} reached, stopping crawl", max_pages);
                    report.truncated = true;
                    break;
                }
            }

            // Polite crawling: small delay between requests
            if processed > 0 && !self.options.delay.is_zero() {
                tokio::time::sleep(self.options.delay).await;
            }
            processed += 1;

            info!("Checking [depth {}]: {}", item.depth, item.url);
            let links = self.process_page(session, &item, &mut report).await;

            let within_depth = self
                .options
                .max_depth
                .map_or(true, |max_depth| item.depth < max_depth);
            if within_depth {
                let accepted = frontier.discover_links(&item, links);
                log::debug!("{} new link(s) queued from {}", accepted.len(), item.url);
            }
        }

        report
    }

    // Loads, checks and filters one page, recording the outcome in report.
    //
    // Returns: the page's raw links, or nothing if the page was skipped
    async fn process_page(
        &self,
        session: &mut F::Session,
        item: &CrawlItem,
        report: &mut Report,
    ) -> Vec<String> {
        let page = match session.load(&item.url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Skipping {}: {}", item.url, e);
                report.failures.push(PageFailure {
                    url: item.url.clone(),
                    reason: e.to_string(),
                });
                return Vec::new();
            }
        };

        let matches = match self.checker.check(&page.text, &item.url).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Skipping {}: {}", item.url, e);
                report.failures.push(PageFailure {
                    url: item.url.clone(),
                    reason: e.to_string(),
                });
                return Vec::new();
            }
        };

        let raw_count = matches.len();
        let findings = filter_matches(matches, &self.exclusions);
        log::debug!(
            "{}: {} raw match(es), {} finding(s)",
            item.url,
            raw_count,
            findings.len()
        );

        report.pages.push(PageReport {
            url: item.url.clone(),
            findings,
        });
        page.links
    }
}
