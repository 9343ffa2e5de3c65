// src/checker/exclusions.rs
// =============================================================================
// The curated list of checker output that humans have accepted as fine.
//
// Two sources feed one store:
// - a plain word list (one term per line) that suppresses spelling matches
//   anywhere on the site
// - structured records ({matched_text, category, page_url?}) in JSON Lines,
//   which suppress one kind of match, optionally on one page only
//
// Records pinned to pages win over wildcard ones: once any record for a
// given text + category names a page, only the pages it names are
// suppressed and wildcard records for that pair are ignored.
//
// Both are loaded once at startup and never change during a run. A missing
// or unreadable source is not fatal: the run just gets noisier.
// =============================================================================

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::text::RawMatch;
use crate::error::GuardianError;

// One accepted false positive, as written to and read from a records file.
//
// page_url = None means "on any page".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRecord {
    pub matched_text: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

impl ExclusionRecord {
    // Same text (ignoring case) and same category, whatever the page
    fn same_kind(&self, m: &RawMatch) -> bool {
        self.category == m.category
            && self.matched_text.to_lowercase() == m.matched_text.to_lowercase()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExclusionStore {
    words: HashSet<String>,
    records: Vec<ExclusionRecord>,
}

impl ExclusionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Loads a plain word list from disk.
    //
    // Never fails: if the file can't be read, the problem is logged and an
    // empty store comes back.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => {
                let store = Self::from_words(&content);
                info!(
                    "Loaded {} exclusion(s) from {}",
                    store.words.len(),
                    path.display()
                );
                store
            }
            Err(source) => {
                let err = GuardianError::ExclusionSourceUnreadable {
                    path: path.to_path_buf(),
                    source,
                };
                warn!("{err}; continuing without exclusions");
                Self::new()
            }
        }
    }

    // Parses one term per line: trimmed, lower-cased, blanks dropped.
    // Duplicates collapse in the set.
    pub fn from_words(content: &str) -> Self {
        let words = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_lowercase)
            .collect();

        ExclusionStore {
            words,
            records: Vec::new(),
        }
    }

    // Adds structured records from a JSON Lines file to this store.
    //
    // Malformed lines are skipped with a warning. An unreadable file leaves
    // the store unchanged.
    pub fn load_records(self, path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(source) => {
                let err = GuardianError::ExclusionSourceUnreadable {
                    path: path.to_path_buf(),
                    source,
                };
                warn!("{err}; continuing without exclusion records");
                return self;
            }
        };

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<ExclusionRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    "Skipping malformed record at {}:{}: {}",
                    path.display(),
                    index + 1,
                    e
                ),
            }
        }

        info!(
            "Loaded {} exclusion record(s) from {}",
            records.len(),
            path.display()
        );
        self.with_records(records)
    }

    pub fn with_records(mut self, records: impl IntoIterator<Item = ExclusionRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Case-insensitive membership in the word list.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// True when a structured record covers this exact match.
    pub fn has_record_for(&self, m: &RawMatch) -> bool {
        let same_kind = || self.records.iter().filter(move |record| record.same_kind(m));

        if same_kind().any(|record| record.page_url.is_some()) {
            same_kind().any(|record| record.page_url.as_deref() == Some(m.source_url.as_str()))
        } else {
            same_kind().next().is_some()
        }
    }

    pub fn len(&self) -> usize {
        self.words.len() + self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::text::SPELLING_CATEGORY;
    use std::io::Write;

    #[test]
    fn test_words_are_trimmed_lowercased_and_deduplicated() {
        let store = ExclusionStore::from_words("  Пример \n\nпример\n   \nNexign\n");
        assert_eq!(store.len(), 2);
        assert!(store.contains("пример"));
        assert!(store.contains("ПРИМЕР"));
        assert!(store.contains("nexign"));
        assert!(!store.contains("примерный"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Пример").unwrap();
        writeln!(file, "  Kubernetes  ").unwrap();

        let store = ExclusionStore::load(file.path());
        assert!(store.contains("пример"));
        assert!(store.contains("kubernetes"));
    }

    #[test]
    fn test_missing_file_gives_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExclusionStore::load(&dir.path().join("does-not-exist.txt"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_records_skip_blank_and_malformed_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"matched_text":"Nexign","category":"spelling-with-suggestions"}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(
            file,
            r#"{{"matched_text":"пример","category":"grammar","page_url":"https://example.test/ru"}}"#
        )
        .unwrap();

        let store = ExclusionStore::new().load_records(file.path());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_record_page_scope() {
        let store = ExclusionStore::new().with_records([ExclusionRecord {
            matched_text: "Nexign".to_string(),
            category: SPELLING_CATEGORY.to_string(),
            page_url: Some("https://example.test/ru".to_string()),
        }]);

        let here = RawMatch::new("nexign", SPELLING_CATEGORY, "https://example.test/ru");
        let elsewhere = RawMatch::new("nexign", SPELLING_CATEGORY, "https://example.test/ru/b");
        let other_kind = RawMatch::new("nexign", "grammar", "https://example.test/ru");

        assert!(store.has_record_for(&here));
        assert!(!store.has_record_for(&elsewhere));
        assert!(!store.has_record_for(&other_kind));
    }

    #[test]
    fn test_page_scoped_records_override_wildcard() {
        let store = ExclusionStore::new().with_records([
            ExclusionRecord {
                matched_text: "nexign".to_string(),
                category: SPELLING_CATEGORY.to_string(),
                page_url: None,
            },
            ExclusionRecord {
                matched_text: "Nexign".to_string(),
                category: SPELLING_CATEGORY.to_string(),
                page_url: Some("https://example.test/ru".to_string()),
            },
        ]);

        let pinned = RawMatch::new("nexign", SPELLING_CATEGORY, "https://example.test/ru");
        let other_page = RawMatch::new("nexign", SPELLING_CATEGORY, "https://example.test/ru/b");

        assert!(store.has_record_for(&pinned));
        assert!(!store.has_record_for(&other_page));
    }

    #[test]
    fn test_wildcard_record_matches_any_page() {
        let store = ExclusionStore::new().with_records([ExclusionRecord {
            matched_text: "nexign".to_string(),
            category: SPELLING_CATEGORY.to_string(),
            page_url: None,
        }]);

        let m = RawMatch::new("Nexign", SPELLING_CATEGORY, "https://example.test/anything");
        assert!(store.has_record_for(&m));
    }
}
