// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (diagnostics go to stderr, the report goes to stdout)
// 3. Load exclusions and build the checker
// 4. Dispatch to the appropriate subcommand handler
// 5. Exit with proper code (0 = clean, 1 = findings reported, 2 = error)
// =============================================================================

mod checker; // src/checker/ - text checking, exclusions and filtering
mod cli; // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - website crawling logic
mod error; // src/error.rs - recoverable error types
mod report; // src/report.rs - console / JSON output and candidate files

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use url::Url;

use checker::{filter_matches, ExclusionStore, LanguageToolChecker, TextChecker};
use cli::{CheckArgs, Cli, Commands};
use crawl::{CrawlOptions, Crawler, HttpFetcher};
use error::GuardianError;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Site {
            start_url,
            scope,
            max_depth,
            max_pages,
            deadline_secs,
            delay_ms,
            check,
        } => {
            let mut options = CrawlOptions::new(scope.unwrap_or_else(|| start_url.clone()));
            options.max_depth = max_depth;
            options.max_pages = max_pages;
            options.deadline = deadline_secs.map(Duration::from_secs);
            options.delay = Duration::from_millis(delay_ms);

            handle_site_scan(&start_url, options, &check).await
        }
        Commands::Text { file, check } => handle_text_check(&file, &check).await,
    }
}

// RUST_LOG wins; otherwise our own crate logs at info (debug with -v) and
// dependencies only at warn
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,spell_guardian=debug"
    } else {
        "warn,spell_guardian=info"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn load_exclusions(check: &CheckArgs) -> ExclusionStore {
    let store = match &check.exclusions {
        Some(path) => ExclusionStore::load(path),
        None => ExclusionStore::new(),
    };

    let store = match &check.exclusion_records {
        Some(path) => store.load_records(path),
        None => store,
    };

    if store.is_empty() {
        log::info!("No exclusions loaded, every spelling match will be reported");
    } else {
        log::debug!("{} exclusion(s) active", store.len());
    }
    store
}

fn build_checker(check: &CheckArgs) -> Result<LanguageToolChecker> {
    let checker = LanguageToolChecker::new(
        check.checker_url.clone(),
        check.language.clone(),
        Duration::from_secs(check.timeout_secs),
    )?;
    Ok(checker)
}

// Handles the 'site' subcommand
async fn handle_site_scan(start_url: &str, options: CrawlOptions, check: &CheckArgs) -> Result<i32> {
    Url::parse(start_url).map_err(|e| GuardianError::InvalidStartUrl {
        url: start_url.to_string(),
        reason: e.to_string(),
    })?;

    log::info!("🔍 Scanning website: {} (scope: {})", start_url, options.scope);

    let exclusions = load_exclusions(check);
    let checker = build_checker(check)?;
    let fetcher = HttpFetcher::new(Duration::from_secs(check.timeout_secs));

    let crawler = Crawler::new(fetcher, checker, exclusions, options);
    let results = crawler.run(start_url).await?;

    report::print_report(&results, check.json, check.context)?;

    if let Some(path) = &check.candidates {
        report::write_candidates(path, results.findings())?;
    }

    Ok(if results.total_findings() > 0 { 1 } else { 0 })
}

// Handles the 'text' subcommand
async fn handle_text_check(file: &Path, check: &CheckArgs) -> Result<i32> {
    let (text, source) = read_input(file)?;

    let exclusions = load_exclusions(check);
    let checker = build_checker(check)?;

    let matches = checker.check(&text, &source).await?;
    let findings = filter_matches(matches, &exclusions);

    if check.json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else if !findings.is_empty() {
        let stdout = std::io::stdout();
        report::render_page(&source, &findings, check.context, &mut stdout.lock())?;
    } else {
        println!("✅ No findings in {}", source);
    }

    if let Some(path) = &check.candidates {
        report::write_candidates(path, &findings)?;
    }

    Ok(if findings.is_empty() { 0 } else { 1 })
}

// Reads the whole file, or stdin when the path is "-"
fn read_input(file: &Path) -> Result<(String, String)> {
    if file == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("cannot read stdin")?;
        Ok((text, "<stdin>".to_string()))
    } else {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("cannot read {}", file.display()))?;
        Ok((text, file.display().to_string()))
    }
}
