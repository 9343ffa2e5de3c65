// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - site: crawl a website section and proofread every page
// - text: proofread a single local file (handy for tuning exclusion lists)
//
// Both share the checker, exclusion and output options, which live in
// CheckArgs and are flattened into each subcommand.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::checker::DEFAULT_ENDPOINT;

#[derive(Parser, Debug)]
#[command(
    name = "spell-guardian",
    version,
    about = "Crawl a website and report spelling and grammar issues on every page",
    long_about = "spell-guardian visits every page of a site section exactly once, runs the visible \
                  text through a LanguageTool checker and reports what it finds. Known false \
                  positives can be silenced with an exclusion list, so the tool works as a \
                  regression gate in CI."
)]
pub struct Cli {
    /// Show debug diagnostics (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and check every page in scope
    ///
    /// Example: spell-guardian site https://example.com/ru --exclusions exclusion.txt
    Site {
        /// URL to start crawling from
        start_url: String,

        /// Only follow links starting with this prefix (default: the start URL)
        #[arg(long)]
        scope: Option<String>,

        /// Maximum crawl depth (1 = just the start page; unlimited by default)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Stop after checking this many pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Stop crawling after this many seconds and report what was found
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// Pause between page loads, in milliseconds
        #[arg(long, default_value_t = 100)]
        delay_ms: u64,

        #[command(flatten)]
        check: CheckArgs,
    },

    /// Check a local text file (use - for stdin)
    ///
    /// Example: spell-guardian text page.txt --exclusions exclusion.txt
    Text {
        /// File to check
        file: PathBuf,

        #[command(flatten)]
        check: CheckArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Plain word list of accepted false positives (one per line)
    #[arg(long)]
    pub exclusions: Option<PathBuf>,

    /// Structured exclusion records (JSON Lines, as written by --candidates)
    #[arg(long)]
    pub exclusion_records: Option<PathBuf>,

    /// Write every reported finding to this file as an exclusion record
    #[arg(long)]
    pub candidates: Option<PathBuf>,

    /// LanguageTool language code
    #[arg(long, default_value = "ru-RU")]
    pub language: String,

    /// LanguageTool check endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub checker_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Print the surrounding text of each finding
    #[arg(long)]
    pub context: bool,

    /// Output results in JSON format instead of text
    #[arg(long)]
    pub json: bool,
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[command(flatten)] do?
//    - It pulls every field of CheckArgs into the subcommand as if they had
//      been written there directly
//    - Both subcommands get the same flags without repeating them
//
// 2. Option<T> arguments
//    - clap treats Option fields as optional flags with no default
//    - None means "the user didn't pass it"
//
// 3. global = true
//    - --verbose can be written before or after the subcommand name
// -----------------------------------------------------------------------------
