mod common;

use anyhow::anyhow;
use common::{Harness, originals, sorted};
use hanyu_recap::history::RunLog;
use hanyu_recap::storage::StoreFuture;
use hanyu_recap::{
    Column, Document, DocumentStore, LocalStore, Recap, RecapError, RecordSetHandle,
    RecordSetInfo, RecordStore, ReviewOptions, ReviewOutcome, SamplingMode, SentenceRecord,
    Translator,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;

fn created(outcome: ReviewOutcome) -> hanyu_recap::ReviewReport {
    match outcome {
        ReviewOutcome::Created(report) => report,
        other => panic!("expected a review set, got {:?}", other),
    }
}

#[tokio::test]
async fn all_mode_collects_every_non_review_row() {
    let harness = Harness::new();
    harness.seed_record_set("week1", &["一", "二", "三"]).await;
    harness.seed_record_set("week2", &["四", "五"]).await;
    harness.seed_record_set("review_0301", &["旧"]).await;

    let first = created(
        harness
            .recap
            .collect_review(SamplingMode::All, StdRng::seed_from_u64(1), |_| true)
            .await
            .unwrap(),
    );
    assert_eq!(first.title, "review_0307");
    assert_eq!(first.sources_scanned, 2);
    assert_eq!(first.rows, 5);
    let expected = sorted(
        ["一", "二", "三", "四", "五"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    assert_eq!(sorted(originals(&harness.rows(&first.record_set_id).await)), expected);

    // Earlier review sets are never sources, so a second run sees the same pool.
    let second = created(
        harness
            .recap
            .collect_review(SamplingMode::All, StdRng::seed_from_u64(2), |_| true)
            .await
            .unwrap(),
    );
    assert_eq!(sorted(originals(&harness.rows(&second.record_set_id).await)), expected);
}

#[tokio::test]
async fn quota_mode_caps_each_section() {
    let harness = Harness::new();
    let big = harness
        .seed_record_set("big", &["a", "b", "c", "d", "e"])
        .await;
    harness.seed_record_set("small", &["z"]).await;

    let report = created(
        harness
            .recap
            .collect_review(
                SamplingMode::PerSection(3),
                StdRng::seed_from_u64(7),
                |_| true,
            )
            .await
            .unwrap(),
    );
    let rows = harness.rows(&report.record_set_id).await;
    assert_eq!(rows.len(), 4);
    let big_rows = originals(&harness.rows(&big).await);
    let from_big = rows
        .iter()
        .filter(|row| big_rows.contains(&row.original))
        .count();
    assert_eq!(from_big, 3);
    assert!(originals(&rows).contains(&"z".to_string()));
}

#[tokio::test]
async fn declined_gate_writes_nothing() {
    let harness = Harness::new();
    harness.seed_record_set("week1", &["一"]).await;
    harness.seed_record_set("week2", &["二"]).await;

    let mut seen = None;
    let outcome = harness
        .recap
        .collect_review(SamplingMode::All, StdRng::seed_from_u64(3), |plan| {
            seen = Some(*plan);
            false
        })
        .await
        .unwrap();
    assert_eq!(outcome, ReviewOutcome::Declined);
    let plan = seen.expect("gate consulted");
    assert_eq!(plan.record_sets, 2);
    assert_eq!(plan.mode, SamplingMode::All);
    assert_eq!(harness.store().list_record_sets().await.unwrap().len(), 2);
}

#[tokio::test]
async fn empty_store_has_nothing_to_review() {
    let harness = Harness::new();
    let mut asked = false;
    let outcome = harness
        .recap
        .collect_review(SamplingMode::PerSection(3), StdRng::seed_from_u64(4), |_| {
            asked = true;
            true
        })
        .await
        .unwrap();
    assert_eq!(outcome, ReviewOutcome::NothingToReview);
    assert!(!asked);
}

#[tokio::test]
async fn blank_rows_alone_produce_no_review_set() {
    let harness = Harness::new();
    let handle = harness.store().create_record_set("blank").await.unwrap();
    harness
        .store()
        .write_rows(&handle.id, &handle.section, &[SentenceRecord::default()])
        .await
        .unwrap();

    let outcome = harness
        .recap
        .collect_review(SamplingMode::All, StdRng::seed_from_u64(5), |_| true)
        .await
        .unwrap();
    assert_eq!(outcome, ReviewOutcome::NothingToReview);
    assert_eq!(harness.store().list_record_sets().await.unwrap().len(), 1);
}

#[tokio::test]
async fn single_source_truncates_after_shuffle() {
    let harness = Harness::new();
    let id = harness
        .seed_record_set("week1", &["一", "二", "三", "四", "五"])
        .await;

    let report = created(
        harness
            .recap
            .collect_review_from_source(&id, Some(2), StdRng::seed_from_u64(6))
            .await
            .unwrap(),
    );
    assert_eq!(report.title, "review_from_sheet_0307");
    let rows = harness.rows(&report.record_set_id).await;
    assert_eq!(rows.len(), 2);
    let source = harness.rows(&id).await;
    assert!(rows.iter().all(|row| source.contains(row)));
    assert_ne!(rows[0], rows[1]);

    let everything = created(
        harness
            .recap
            .collect_review_from_source(&id, None, StdRng::seed_from_u64(6))
            .await
            .unwrap(),
    );
    assert_eq!(everything.rows, 5);
}

#[tokio::test]
async fn single_source_errors_and_empty_counts() {
    let harness = Harness::new();
    let err = harness
        .recap
        .collect_review_from_source("missing", None, StdRng::seed_from_u64(8))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RecapError>(),
        Some(RecapError::SourceUnreadable { record_set_id, .. }) if record_set_id == "missing"
    ));

    let id = harness.seed_record_set("week1", &["一"]).await;
    let outcome = harness
        .recap
        .collect_review_from_source(&id, Some(0), StdRng::seed_from_u64(8))
        .await
        .unwrap();
    assert_eq!(outcome, ReviewOutcome::NothingToReview);
}

/// Which store call fails; everything else delegates to the inner store.
#[derive(Default)]
struct Failures {
    listing: bool,
    sections_of: Option<String>,
    rows_of: Option<String>,
}

struct FlakyStore {
    inner: LocalStore,
    failures: Failures,
}

impl DocumentStore for FlakyStore {
    fn fetch<'a>(&'a self, document_id: &'a str) -> StoreFuture<'a, Document> {
        self.inner.fetch(document_id)
    }

    fn create<'a>(&'a self, title: &'a str) -> StoreFuture<'a, String> {
        self.inner.create(title)
    }
}

impl RecordStore for FlakyStore {
    fn create_record_set<'a>(&'a self, title: &'a str) -> StoreFuture<'a, RecordSetHandle> {
        self.inner.create_record_set(title)
    }

    fn write_rows<'a>(
        &'a self,
        record_set_id: &'a str,
        section: &'a str,
        rows: &'a [SentenceRecord],
    ) -> StoreFuture<'a, ()> {
        self.inner.write_rows(record_set_id, section, rows)
    }

    fn read_rows<'a>(
        &'a self,
        record_set_id: &'a str,
        section: &'a str,
    ) -> StoreFuture<'a, Vec<SentenceRecord>> {
        if self.failures.rows_of.as_deref() == Some(record_set_id) {
            return Box::pin(async { Err(anyhow!("quota exceeded")) });
        }
        self.inner.read_rows(record_set_id, section)
    }

    fn sections<'a>(&'a self, record_set_id: &'a str) -> StoreFuture<'a, Vec<String>> {
        if self.failures.sections_of.as_deref() == Some(record_set_id) {
            return Box::pin(async { Err(anyhow!("permission denied")) });
        }
        self.inner.sections(record_set_id)
    }

    fn list_record_sets(&self) -> StoreFuture<'_, Vec<RecordSetInfo>> {
        if self.failures.listing {
            return Box::pin(async { Err(anyhow!("folder unavailable")) });
        }
        self.inner.list_record_sets()
    }

    fn update_column<'a>(
        &'a self,
        record_set_id: &'a str,
        section: &'a str,
        column: Column,
        values: &'a [String],
    ) -> StoreFuture<'a, ()> {
        self.inner
            .update_column(record_set_id, section, column, values)
    }

    fn resize_columns<'a>(&'a self, record_set_id: &'a str) -> StoreFuture<'a, ()> {
        self.inner.resize_columns(record_set_id)
    }
}

fn flaky_recap(harness: &Harness, failures: Failures) -> Recap<FlakyStore, common::Bracketing> {
    let store = FlakyStore {
        inner: harness.store().clone(),
        failures,
    };
    Recap::new(
        store,
        Translator::new(common::Bracketing::default(), "zh-CN", "ko"),
        Arc::new(common::CharSegmenter),
        Arc::new(common::CodepointSyllabary),
        RunLog::new(harness.dir.path().join("state")),
    )
    .with_review_options(ReviewOptions {
        section_delay: Duration::ZERO,
        section: "Sheet1".to_string(),
    })
    .with_clock(common::fixed_clock)
}

async fn titles(harness: &Harness) -> Vec<String> {
    harness
        .store()
        .list_record_sets()
        .await
        .unwrap()
        .into_iter()
        .map(|info| info.title)
        .collect()
}

#[tokio::test]
async fn unreadable_section_is_skipped() {
    let harness = Harness::new();
    let good = harness.seed_record_set("good", &["好"]).await;
    let broken = harness.seed_record_set("broken", &["坏"]).await;
    let recap = flaky_recap(
        &harness,
        Failures {
            rows_of: Some(broken),
            ..Failures::default()
        },
    );

    let report = created(
        recap
            .collect_review(SamplingMode::All, StdRng::seed_from_u64(9), |_| true)
            .await
            .unwrap(),
    );
    assert_eq!(report.skipped_sections, 1);
    assert_eq!(report.sources_scanned, 2);
    assert_eq!(harness.rows(&report.record_set_id).await, harness.rows(&good).await);
}

#[tokio::test]
async fn record_set_without_readable_sections_is_skipped() {
    let harness = Harness::new();
    let good = harness.seed_record_set("good", &["好", "对"]).await;
    let broken = harness.seed_record_set("broken", &["坏"]).await;
    let recap = flaky_recap(
        &harness,
        Failures {
            sections_of: Some(broken),
            ..Failures::default()
        },
    );

    let report = created(
        recap
            .collect_review(SamplingMode::All, StdRng::seed_from_u64(10), |_| true)
            .await
            .unwrap(),
    );
    assert_eq!(report.skipped_sections, 1);
    assert_eq!(
        sorted(originals(&harness.rows(&report.record_set_id).await)),
        sorted(originals(&harness.rows(&good).await))
    );
}

#[tokio::test]
async fn unlistable_sources_abort_without_writing() {
    let harness = Harness::new();
    harness.seed_record_set("week1", &["一"]).await;
    let recap = flaky_recap(
        &harness,
        Failures {
            listing: true,
            ..Failures::default()
        },
    );

    let mut asked = false;
    let err = recap
        .collect_review(SamplingMode::All, StdRng::seed_from_u64(11), |_| {
            asked = true;
            true
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RecapError>(),
        Some(RecapError::SourcesUnavailable { .. })
    ));
    assert!(!asked);
    assert_eq!(titles(&harness).await, vec!["week1"]);
}

#[tokio::test(start_paused = true)]
async fn section_reads_are_paced() {
    let harness = Harness::with_section_delay(Duration::from_secs(1));
    harness.seed_record_set("week1", &["一"]).await;
    harness.seed_record_set("week2", &["二"]).await;

    let started = tokio::time::Instant::now();
    created(
        harness
            .recap
            .collect_review(SamplingMode::All, StdRng::seed_from_u64(12), |_| true)
            .await
            .unwrap(),
    );
    let elapsed = started.elapsed();
    // Two section reads, one pause between them.
    assert!(elapsed >= Duration::from_secs(1), "{:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn first_section_read_is_not_delayed() {
    let harness = Harness::with_section_delay(Duration::from_secs(1));
    harness.seed_record_set("week1", &["一", "二"]).await;

    let started = tokio::time::Instant::now();
    created(
        harness
            .recap
            .collect_review(SamplingMode::All, StdRng::seed_from_u64(13), |_| true)
            .await
            .unwrap(),
    );
    assert_eq!(started.elapsed(), Duration::ZERO);
}
