use anyhow::{Result, anyhow};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::error::RecapError;
use crate::history::{HistoryEntry, RunLog, RunMeta};
use crate::model::{Column, RecordSetHandle, SentenceRecord};
use crate::naming;
use crate::pipeline::{self, AnnotationPipeline};
use crate::providers::TranslationProvider;
use crate::records::RecordBuilder;
use crate::review::{ReviewOutcome, ReviewReport, ReviewSampler, SamplingMode, ScanPlan};
use crate::romanize::{Romanizer, Syllabary};
use crate::segmenter::Segmenter;
use crate::storage::{DocumentStore, RecordStore};
use crate::translator::Translator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationReport {
    pub document_id: String,
    pub document_title: String,
    pub record_set_id: String,
    pub record_set_title: String,
    pub sentence_count: usize,
    pub keyword_record_set_id: Option<String>,
    pub keyword_count: usize,
    pub failed_translations: usize,
}

#[derive(Debug, Clone)]
pub struct ReviewOptions {
    /// Pause between section reads during a multi-source scan.
    pub section_delay: Duration,
    /// Section read by single-source review.
    pub section: String,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            section_delay: Duration::from_secs(1),
            section: "Sheet1".to_string(),
        }
    }
}

/// The four operations, wired to a store, a translation backend and the
/// segmentation/romanization capabilities.
pub struct Recap<S, P>
where
    S: DocumentStore + RecordStore,
    P: TranslationProvider,
{
    store: S,
    translator: Translator<P>,
    segmenter: Arc<dyn Segmenter>,
    romanizer: Romanizer,
    run_log: RunLog,
    review: ReviewOptions,
    clock: fn() -> OffsetDateTime,
}

impl<S, P> Recap<S, P>
where
    S: DocumentStore + RecordStore,
    P: TranslationProvider,
{
    pub fn new(
        store: S,
        translator: Translator<P>,
        segmenter: Arc<dyn Segmenter>,
        syllabary: Arc<dyn Syllabary>,
        run_log: RunLog,
    ) -> Self {
        let romanizer = Romanizer::new(Arc::clone(&segmenter), syllabary);
        Self {
            store,
            translator,
            segmenter,
            romanizer,
            run_log,
            review: ReviewOptions::default(),
            clock: naming::now_local,
        }
    }

    pub fn with_review_options(mut self, review: ReviewOptions) -> Self {
        self.review = review;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Annotates a document into a sentence record set plus a keyword
    /// record set. Without a document id, starts a blank document and an
    /// empty record set instead.
    pub async fn run_annotation(&self, document_id: Option<&str>) -> Result<AnnotationReport> {
        let now = (self.clock)();
        let Some(document_id) = document_id.map(str::trim).filter(|id| !id.is_empty()) else {
            return self.start_blank(now).await;
        };

        let document =
            self.store
                .fetch(document_id)
                .await
                .map_err(|source| RecapError::DocumentUnreadable {
                    document_id: document_id.to_string(),
                    source,
                })?;
        info!(
            "annotating '{}' ({} paragraphs)",
            document.title,
            document.paragraphs.len()
        );

        let builder = RecordBuilder::new(&self.romanizer, &self.translator);
        let annotated = AnnotationPipeline::new(self.segmenter.as_ref(), builder)
            .annotate(&document.paragraphs)
            .await;
        if annotated.failed_translations > 0 {
            warn!(
                "{} translations unavailable; those rows need manual review",
                annotated.failed_translations
            );
        }

        let title = naming::annotation_title(&document.title, now);
        let sentence_set = self.persist(&title, &annotated.sentences).await?;
        let keyword_set = self
            .persist(&naming::keyword_title(&title), &annotated.keywords)
            .await?;

        self.run_log.write_meta(&RunMeta {
            document_id: document.id.clone(),
            record_set_id: sentence_set.id.clone(),
            document_title: document.title.clone(),
            record_set_title: title.clone(),
        })?;
        self.run_log.append(&HistoryEntry {
            timestamp: naming::timestamp(now),
            document_title: document.title.clone(),
            record_set_title: title.clone(),
            sentence_count: annotated.sentences.len(),
        })?;
        info!(
            "wrote {} sentences to {} and {} keywords to {}",
            annotated.sentences.len(),
            title,
            annotated.keywords.len(),
            keyword_set.title
        );

        Ok(AnnotationReport {
            document_id: document.id,
            document_title: document.title,
            record_set_id: sentence_set.id,
            record_set_title: title,
            sentence_count: annotated.sentences.len(),
            keyword_record_set_id: Some(keyword_set.id),
            keyword_count: annotated.keywords.len(),
            failed_translations: annotated.failed_translations,
        })
    }

    async fn start_blank(&self, now: OffsetDateTime) -> Result<AnnotationReport> {
        let document_title = naming::blank_document_title(now);
        let document_id = self.store.create(&document_title).await?;
        let title = naming::blank_annotation_title(now);
        let handle = self.persist(&title, &[]).await?;

        self.run_log.write_meta(&RunMeta {
            document_id: document_id.clone(),
            record_set_id: handle.id.clone(),
            document_title: document_title.clone(),
            record_set_title: title.clone(),
        })?;
        self.run_log.append(&HistoryEntry {
            timestamp: naming::timestamp(now),
            document_title: document_title.clone(),
            record_set_title: title.clone(),
            sentence_count: 0,
        })?;
        info!("created blank document {} and record set {}", document_id, title);

        Ok(AnnotationReport {
            document_id,
            document_title,
            record_set_id: handle.id,
            record_set_title: title,
            sentence_count: 0,
            keyword_record_set_id: None,
            keyword_count: 0,
            failed_translations: 0,
        })
    }

    /// Recomputes the pinyin column from the `back` column. Row order and
    /// translations are left alone.
    pub async fn regenerate_romanization(&self, record_set_id: &str) -> Result<usize> {
        let unreadable = |source| RecapError::SourceUnreadable {
            record_set_id: record_set_id.to_string(),
            source,
        };
        let sections = self.store.sections(record_set_id).await.map_err(unreadable)?;
        let section = sections
            .first()
            .ok_or_else(|| anyhow!("record set '{}' has no sections", record_set_id))?;
        let rows = self
            .store
            .read_rows(record_set_id, section)
            .await
            .map_err(unreadable)?;

        let values = pipeline::regenerate_romanization(&self.romanizer, &rows);
        self.store
            .update_column(record_set_id, section, Column::Pinyin, &values)
            .await?;
        info!("regenerated pinyin for {} rows in {}", values.len(), record_set_id);
        Ok(values.len())
    }

    /// Samples every non-review record set into a dated review set. The
    /// gate sees the plan before any section is read.
    pub async fn collect_review<R, F>(
        &self,
        mode: SamplingMode,
        rng: R,
        confirm: F,
    ) -> Result<ReviewOutcome>
    where
        R: Rng,
        F: FnOnce(&ScanPlan) -> bool,
    {
        let now = (self.clock)();
        let candidates = self
            .store
            .list_record_sets()
            .await
            .map_err(|source| RecapError::SourcesUnavailable { source })?
            .into_iter()
            .filter(|info| !naming::is_review_title(&info.title))
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            info!("no record sets to review");
            return Ok(ReviewOutcome::NothingToReview);
        }

        let plan = ScanPlan {
            record_sets: candidates.len(),
            mode,
        };
        if !confirm(&plan) {
            info!("review scan declined");
            return Ok(ReviewOutcome::Declined);
        }

        let mut sampler = ReviewSampler::new(rng);
        let mut pool = Vec::new();
        let mut skipped_sections = 0usize;
        let mut first_read = true;
        for candidate in &candidates {
            let sections = match self.store.sections(&candidate.id).await {
                Ok(sections) => sections,
                Err(err) => {
                    warn!("skipping record set {} ({}): {:#}", candidate.id, candidate.title, err);
                    skipped_sections += 1;
                    continue;
                }
            };
            for section in sections {
                if !first_read && !self.review.section_delay.is_zero() {
                    tokio::time::sleep(self.review.section_delay).await;
                }
                first_read = false;
                match self.store.read_rows(&candidate.id, &section).await {
                    Ok(rows) => pool.extend(sampler.collect_section(rows, mode)),
                    Err(err) => {
                        warn!(
                            "skipping section {}!{} ({}): {:#}",
                            candidate.id, section, candidate.title, err
                        );
                        skipped_sections += 1;
                    }
                }
            }
        }

        let rows = sampler.finish(pool, None);
        if rows.is_empty() {
            info!("nothing to review after filtering");
            return Ok(ReviewOutcome::NothingToReview);
        }
        let title = naming::review_title(now);
        let handle = self.persist(&title, &rows).await?;
        info!("review set {} has {} rows", title, rows.len());
        Ok(ReviewOutcome::Created(ReviewReport {
            record_set_id: handle.id,
            title,
            rows: rows.len(),
            sources_scanned: candidates.len(),
            skipped_sections,
        }))
    }

    /// Shuffles one record set's review section, optionally keeping only the
    /// first `count` rows.
    pub async fn collect_review_from_source<R: Rng>(
        &self,
        record_set_id: &str,
        count: Option<usize>,
        rng: R,
    ) -> Result<ReviewOutcome> {
        let now = (self.clock)();
        let rows = self
            .store
            .read_rows(record_set_id, &self.review.section)
            .await
            .map_err(|source| RecapError::SourceUnreadable {
                record_set_id: record_set_id.to_string(),
                source,
            })?;

        let rows = ReviewSampler::new(rng).finish(rows, count);
        if rows.is_empty() {
            info!("record set {} has nothing to review", record_set_id);
            return Ok(ReviewOutcome::NothingToReview);
        }
        let title = naming::source_review_title(now);
        let handle = self.persist(&title, &rows).await?;
        info!("review set {} has {} rows", title, rows.len());
        Ok(ReviewOutcome::Created(ReviewReport {
            record_set_id: handle.id,
            title,
            rows: rows.len(),
            sources_scanned: 1,
            skipped_sections: 0,
        }))
    }

    async fn persist(&self, title: &str, rows: &[SentenceRecord]) -> Result<RecordSetHandle> {
        let handle = self.store.create_record_set(title).await?;
        if !rows.is_empty() {
            self.store.write_rows(&handle.id, &handle.section, rows).await?;
        }
        self.store.resize_columns(&handle.id).await?;
        Ok(handle)
    }
}
