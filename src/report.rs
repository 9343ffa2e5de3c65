// src/report.rs
// =============================================================================
// Output: the console report, the JSON report and the candidate file.
//
// Console format, one block per page that has findings:
//
//   https://example.test/ru/b
//     ошибка | spelling-with-suggestions
//
// followed by a summary. The candidate file holds one exclusion record per
// finding (JSON Lines), so accepted lines can be moved straight into the
// --exclusion-records file for the next run.
// =============================================================================

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::checker::{ExclusionRecord, Finding};
use crate::crawl::Report;

pub fn print_report(report: &Report, json: bool, show_context: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        serde_json::to_writer_pretty(&mut out, report)?;
        writeln!(out)?;
    } else {
        render_text(report, show_context, &mut out)?;
    }
    Ok(())
}

// Writes the human-readable report: findings grouped by page, then a summary
pub fn render_text(report: &Report, show_context: bool, out: &mut impl Write) -> io::Result<()> {
    for page in report.pages_with_findings() {
        render_page(&page.url, &page.findings, show_context, out)?;
    }

    if !report.failures.is_empty() {
        writeln!(out, "⚠️  Skipped pages:")?;
        for failure in &report.failures {
            writeln!(out, "  {} ({})", failure.url, failure.reason)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "📊 Summary:")?;
    writeln!(out, "   📄 Pages checked: {}", report.pages.len())?;
    writeln!(
        out,
        "   ❌ Pages with findings: {}",
        report.pages_with_findings().count()
    )?;
    writeln!(out, "   📝 Findings: {}", report.total_findings())?;
    writeln!(out, "   ⚠️  Skipped: {}", report.failures.len())?;

    if report.timed_out {
        writeln!(out, "   ⏱️  Deadline reached before the crawl finished")?;
    }
    if report.truncated {
        writeln!(out, "   ✂️  Page limit reached before the crawl finished")?;
    }
    Ok(())
}

pub fn render_page(
    url: &str,
    findings: &[Finding],
    show_context: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "{}", url)?;
    for finding in findings {
        writeln!(out, "  {} | {}", finding.matched_text, finding.category)?;
        if show_context {
            if let Some(context) = &finding.context {
                writeln!(out, "      ...{}...", context.trim())?;
            }
        }
    }
    writeln!(out)
}

// Saves findings as page-scoped exclusion records, one JSON object per line.
//
// Returns: how many records were written
pub fn write_candidates<'a>(
    path: &Path,
    findings: impl IntoIterator<Item = &'a Finding>,
) -> Result<usize> {
    let file = File::create(path)
        .with_context(|| format!("cannot create candidate file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    let mut written = 0;
    for finding in findings {
        let record = ExclusionRecord {
            matched_text: finding.matched_text.clone(),
            category: finding.category.clone(),
            page_url: Some(finding.source_url.clone()),
        };
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
        written += 1;
    }

    out.flush()?;
    log::info!("Wrote {} candidate(s) to {}", written, path.display());
    Ok(written)
}
