// src/checker/languagetool.rs
// =============================================================================
// A TextChecker backed by a LanguageTool server over HTTP.
//
// How it works:
// 1. Split the page text into chunks on line boundaries (the public server
//    rejects very large requests)
// 2. POST each chunk to /v2/check as a form (text + language)
// 3. Turn every returned match into a RawMatch, mapping LanguageTool's rule
//    ids onto our fixed categories
//
// LanguageTool reports offsets in UTF-16 code units, so spans are sliced
// from the UTF-16 view of the chunk, not from its bytes.
// =============================================================================

use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::text::{RawMatch, TextChecker, CAPITALIZATION_CATEGORY, SPELLING_CATEGORY};
use crate::error::GuardianError;

pub const DEFAULT_ENDPOINT: &str = "https://api.languagetool.org/v2/check";

const DEFAULT_MAX_CHUNK_CHARS: usize = 20_000;

// Chunks of one page checked at once. Kept small, the public server
// rate-limits per client.
const CONCURRENT_REQUESTS: usize = 2;

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
struct ApiMatch {
    offset: usize,
    length: usize,
    #[serde(default)]
    context: Option<ApiContext>,
    rule: ApiRule,
}

#[derive(Debug, Deserialize)]
struct ApiContext {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiRule {
    id: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    issue_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LanguageToolChecker {
    client: Client,
    endpoint: String,
    language: String,
    max_chunk_chars: usize,
}

impl LanguageToolChecker {
    pub fn new(
        endpoint: impl Into<String>,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GuardianError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GuardianError::checker)?;

        Ok(LanguageToolChecker {
            client,
            endpoint: endpoint.into(),
            language: language.into(),
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        })
    }

    async fn request(&self, chunk: &str) -> Result<CheckResponse, GuardianError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("text", chunk), ("language", self.language.as_str())])
            .send()
            .await
            .map_err(describe_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuardianError::checker(format!("HTTP {}", status.as_u16())));
        }

        response.json::<CheckResponse>().await.map_err(describe_error)
    }
}

impl TextChecker for LanguageToolChecker {
    async fn check(&self, text: &str, source_url: &str) -> Result<Vec<RawMatch>, GuardianError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let chunks = split_into_chunks(text, self.max_chunk_chars);
        log::debug!("Checking {} chunk(s) from {}", chunks.len(), source_url);

        // buffered() keeps chunk order, so matches stay in text order
        let results: Vec<Result<Vec<RawMatch>, GuardianError>> = stream::iter(chunks)
            .map(|chunk| async move {
                let response = self.request(chunk).await?;
                Ok(matches_from_response(chunk, response, source_url))
            })
            .buffered(CONCURRENT_REQUESTS)
            .collect()
            .await;

        let mut matches = Vec::new();
        for result in results {
            matches.extend(result?);
        }
        Ok(matches)
    }
}

// Converts one server response into RawMatches for the chunk it was about.
// Matches whose offsets fall outside the chunk are dropped.
fn matches_from_response(chunk: &str, response: CheckResponse, source_url: &str) -> Vec<RawMatch> {
    let units: Vec<u16> = chunk.encode_utf16().collect();

    response
        .matches
        .into_iter()
        .filter_map(|m| {
            let end = m.offset.checked_add(m.length)?;
            let span = units.get(m.offset..end).map(String::from_utf16_lossy)?;
            let raw = RawMatch::new(span, category_for(&m.rule), source_url);
            Some(match m.context {
                Some(context) => raw.with_context(context.text),
                None => raw,
            })
        })
        .collect()
}

fn category_for(rule: &ApiRule) -> String {
    if rule.issue_type.as_deref() == Some("misspelling") || rule.id.starts_with("MORFOLOGIK_RULE") {
        SPELLING_CATEGORY.to_string()
    } else if rule.id == "UPPERCASE_SENTENCE_START" || rule.id == "PUNCTUATION_PARAGRAPH_END" {
        CAPITALIZATION_CATEGORY.to_string()
    } else if rule.description.is_empty() {
        rule.id.clone()
    } else {
        rule.description.clone()
    }
}

// Splits text into slices of at most max_chars characters, cutting only
// after a newline. A single line longer than the limit stays whole.
fn split_into_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut end = 0;
    let mut chars = 0;

    for line in text.split_inclusive('\n') {
        let line_chars = line.chars().count();
        if chars > 0 && chars + line_chars > max_chars {
            chunks.push(&text[start..end]);
            start = end;
            chars = 0;
        }
        end += line.len();
        chars += line_chars;
    }

    if start < end {
        chunks.push(&text[start..end]);
    }
    chunks
}

// Short, loggable reasons for the common reqwest failure modes
fn describe_error(error: reqwest::Error) -> GuardianError {
    if error.is_timeout() {
        GuardianError::checker("request timed out")
    } else if error.is_connect() {
        GuardianError::checker("connection failed")
    } else if error.is_decode() {
        GuardianError::checker(format!("unreadable response: {}", error))
    } else {
        GuardianError::checker(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://example.test/ru";

    fn response(json: &str) -> CheckResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_spelling_match_is_sliced_and_categorized() {
        let text = "Тест ошибка";
        let resp = response(
            r#"{"matches":[{"offset":5,"length":6,
                "context":{"text":"Тест ошибка","offset":5,"length":6},
                "rule":{"id":"MORFOLOGIK_RULE_RU_RU","description":"Проверка орфографии с исправлениями","issueType":"misspelling"}}]}"#,
        );

        let matches = matches_from_response(text, resp, PAGE);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_text, "ошибка");
        assert_eq!(matches[0].category, SPELLING_CATEGORY);
        assert_eq!(matches[0].source_url, PAGE);
        assert_eq!(matches[0].context.as_deref(), Some("Тест ошибка"));
    }

    #[test]
    fn test_offsets_are_utf16_units() {
        // The emoji takes two UTF-16 units, so "teh" starts at unit 3
        let text = "😀 teh";
        let resp = response(
            r#"{"matches":[{"offset":3,"length":3,"rule":{"id":"MORFOLOGIK_RULE_EN_US","issueType":"misspelling"}}]}"#,
        );

        let matches = matches_from_response(text, resp, PAGE);
        assert_eq!(matches[0].matched_text, "teh");
    }

    #[test]
    fn test_out_of_range_match_is_dropped() {
        let resp = response(
            r#"{"matches":[{"offset":10,"length":5,"rule":{"id":"X","description":"x"}}]}"#,
        );
        assert!(matches_from_response("short", resp, PAGE).is_empty());
    }

    #[test]
    fn test_category_mapping() {
        let rule = |id: &str, description: &str, issue: Option<&str>| ApiRule {
            id: id.to_string(),
            description: description.to_string(),
            issue_type: issue.map(str::to_string),
        };

        assert_eq!(
            category_for(&rule("UPPERCASE_SENTENCE_START", "Точка или заглавная буква", None)),
            CAPITALIZATION_CATEGORY
        );
        assert_eq!(
            category_for(&rule("SOME_DICT", "", Some("misspelling"))),
            SPELLING_CATEGORY
        );
        assert_eq!(
            category_for(&rule("RU_COMPARE", "Согласование", Some("grammar"))),
            "Согласование"
        );
        assert_eq!(category_for(&rule("RU_COMPARE", "", None)), "RU_COMPARE");
    }

    #[test]
    fn test_split_into_chunks_on_lines() {
        let text = "aaaa\nbbbb\ncc\n";
        let chunks = split_into_chunks(text, 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n", "cc\n"]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_keeps_long_line_whole() {
        let text = "short\nthis line is far too long\nend";
        let chunks = split_into_chunks(text, 8);
        assert_eq!(chunks, vec!["short\n", "this line is far too long\n", "end"]);
    }

    #[tokio::test]
    async fn test_blank_text_needs_no_request() {
        // Port 9 is discard; nothing should be sent anyway
        let checker =
            LanguageToolChecker::new("http://127.0.0.1:9/v2/check", "ru-RU", Duration::from_secs(1))
                .unwrap();
        let matches = checker.check("   \n  ", PAGE).await.unwrap();
        assert!(matches.is_empty());
    }
}
