#![allow(dead_code)]

use anyhow::anyhow;
use hanyu_recap::history::RunLog;
use hanyu_recap::providers::TranslateFuture;
use hanyu_recap::{
    DocumentStore, LocalStore, Recap, RecordStore, ReviewOptions, Segmenter, SentenceRecord,
    Syllabary, TaggedWord, TranslationProvider, Translator,
};
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use time::OffsetDateTime;
use time::macros::datetime;

/// One word per character; CJK characters are nouns, everything else is
/// punctuation.
pub struct CharSegmenter;

impl Segmenter for CharSegmenter {
    fn cut(&self, text: &str) -> Vec<String> {
        text.chars().map(String::from).collect()
    }

    fn tag(&self, text: &str) -> Vec<TaggedWord> {
        text.chars()
            .map(|ch| {
                let tag = if is_han(ch) { "n" } else { "x" };
                TaggedWord::new(ch.to_string(), tag)
            })
            .collect()
    }
}

pub fn is_han(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&ch)
}

/// Hex codepoint as the "syllable", so output is predictable.
pub struct CodepointSyllabary;

impl Syllabary for CodepointSyllabary {
    fn toned(&self, ch: char) -> Option<String> {
        is_han(ch).then(|| format!("u{:x}", ch as u32))
    }
}

/// Wraps input in brackets. Texts containing `fail_all` fail on every
/// call; texts containing `fail_primary` fail unless auto-detecting.
#[derive(Default)]
pub struct Bracketing {
    pub fail_all: Option<String>,
    pub fail_primary: Option<String>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl TranslationProvider for Bracketing {
    fn name(&self) -> &'static str {
        "bracketing"
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        source_lang: &'a str,
        _target_lang: &'a str,
    ) -> TranslateFuture<'a> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), source_lang.to_string()));
            if self.fail_all.as_deref().is_some_and(|marker| text.contains(marker)) {
                return Err(anyhow!("backend unavailable"));
            }
            if source_lang != "auto"
                && self
                    .fail_primary
                    .as_deref()
                    .is_some_and(|marker| text.contains(marker))
            {
                return Err(anyhow!("unsupported source"));
            }
            Ok(format!("[{}]", text))
        })
    }
}

pub fn fixed_clock() -> OffsetDateTime {
    datetime!(2026-03-07 09:05 UTC)
}

pub struct Harness {
    pub dir: TempDir,
    pub recap: Recap<LocalStore, Bracketing>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_provider(Bracketing::default())
    }

    pub fn with_provider(provider: Bracketing) -> Self {
        Self::build(provider, Duration::ZERO)
    }

    pub fn with_section_delay(section_delay: Duration) -> Self {
        Self::build(Bracketing::default(), section_delay)
    }

    fn build(provider: Bracketing, section_delay: Duration) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalStore::new(dir.path().join("store"), "study");
        let run_log = RunLog::new(dir.path().join("state"));
        let recap = Recap::new(
            store,
            Translator::new(provider, "zh-CN", "ko"),
            Arc::new(CharSegmenter),
            Arc::new(CodepointSyllabary),
            run_log,
        )
        .with_review_options(ReviewOptions {
            section_delay,
            section: "Sheet1".to_string(),
        })
        .with_clock(fixed_clock);
        Self { dir, recap }
    }

    pub fn run_log(&self) -> RunLog {
        RunLog::new(self.dir.path().join("state"))
    }

    pub fn store(&self) -> &LocalStore {
        self.recap.store()
    }

    pub fn write_document(&self, id: &str, title: &str, lines: &[&str]) {
        let path = self.store().document_path(id).expect("document path");
        fs::create_dir_all(path.parent().expect("docs dir")).expect("create docs dir");
        let mut content = format!("# title: {}\n", title);
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        fs::write(path, content).expect("write document");
    }

    /// A record set with the given originals in `Sheet1`.
    pub async fn seed_record_set(&self, title: &str, originals: &[&str]) -> String {
        let handle = self.store().create_record_set(title).await.expect("create");
        let rows = originals
            .iter()
            .map(|original| SentenceRecord::new(format!("[{}]", original), *original, ""))
            .collect::<Vec<_>>();
        self.store()
            .write_rows(&handle.id, &handle.section, &rows)
            .await
            .expect("write rows");
        handle.id
    }

    pub async fn rows(&self, record_set_id: &str) -> Vec<SentenceRecord> {
        self.store()
            .read_rows(record_set_id, "Sheet1")
            .await
            .expect("read rows")
    }

    pub async fn document_exists(&self, id: &str) -> bool {
        self.store().fetch(id).await.is_ok()
    }
}

pub fn originals(rows: &[SentenceRecord]) -> Vec<String> {
    rows.iter().map(|row| row.original.clone()).collect()
}

pub fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}
