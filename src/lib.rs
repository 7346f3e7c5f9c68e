use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use std::sync::Arc;

pub mod error;
pub mod history;
pub mod keywords;
pub mod logging;
pub mod model;
pub mod naming;
pub mod normalize;
pub mod paths;
pub mod pipeline;
pub mod providers;
mod recap;
pub mod records;
pub mod review;
pub mod romanize;
pub mod segmenter;
pub mod settings;
pub mod storage;
#[cfg(test)]
mod test_util;
pub mod translations;
mod translator;

pub use error::RecapError;
pub use model::{Column, Document, Paragraph, RecordSetHandle, RecordSetInfo, SentenceRecord};
pub use providers::{ProviderImpl, ProviderKind, TranslationProvider};
pub use recap::{AnnotationReport, Recap, ReviewOptions};
pub use review::{ReviewOutcome, ReviewReport, SamplingMode, ScanPlan};
pub use romanize::{PinyinSyllabary, Romanizer, Syllabary};
pub use segmenter::{JiebaSegmenter, Segmenter, TaggedWord};
pub use storage::{DocumentStore, LocalStore, RecordStore};
pub use translator::{Resolution, Translator};

#[derive(Debug, Clone)]
pub struct Config {
    pub settings_path: Option<String>,
    pub key: Option<String>,
    pub model: Option<String>,
    /// Gate for multi-source review scans. Ignored when `assume_yes` is set.
    pub confirm: fn(&ScanPlan) -> bool,
    pub assume_yes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Annotate { document_id: Option<String> },
    RegeneratePinyin { record_set_id: String },
    ReviewAll,
    /// `None` takes the configured per-section quota.
    ReviewCount { per_section: Option<usize> },
    ReviewFrom {
        record_set_id: String,
        count: Option<usize>,
    },
    ShowHistories,
}

pub async fn run(config: Config, command: Command) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;
    let run_log = history::RunLog::new(paths::base_dir());
    let confirm = |plan: &ScanPlan| config.assume_yes || (config.confirm)(plan);

    match command {
        Command::Annotate { document_id } => {
            let recap = build_recap(&config, &settings, run_log)?;
            let report = recap.run_annotation(document_id.as_deref()).await?;
            Ok(format_annotation(&report))
        }
        Command::RegeneratePinyin { record_set_id } => {
            let recap = build_recap(&config, &settings, run_log)?;
            let rows = recap.regenerate_romanization(&record_set_id).await?;
            Ok(format!("regenerated pinyin for {} rows in {}", rows, record_set_id))
        }
        Command::ReviewAll => {
            let recap = build_recap(&config, &settings, run_log)?;
            let outcome = recap
                .collect_review(SamplingMode::All, StdRng::from_entropy(), confirm)
                .await?;
            Ok(format_review(&outcome))
        }
        Command::ReviewCount { per_section } => {
            let recap = build_recap(&config, &settings, run_log)?;
            let quota = per_section.unwrap_or(settings.per_section_quota);
            let outcome = recap
                .collect_review(
                    SamplingMode::PerSection(quota),
                    StdRng::from_entropy(),
                    confirm,
                )
                .await?;
            Ok(format_review(&outcome))
        }
        Command::ReviewFrom {
            record_set_id,
            count,
        } => {
            let recap = build_recap(&config, &settings, run_log)?;
            let outcome = recap
                .collect_review_from_source(&record_set_id, count, StdRng::from_entropy())
                .await?;
            Ok(format_review(&outcome))
        }
        Command::ShowHistories => {
            let entries = run_log.recent(settings.history_limit)?;
            let last = run_log.read_meta()?;
            Ok(format_histories(&entries, last.as_ref()))
        }
    }
}

fn build_recap(
    config: &Config,
    settings: &settings::Settings,
    run_log: history::RunLog,
) -> Result<Recap<LocalStore, ProviderImpl>> {
    let kind = providers::provider_from_name(&settings.provider)?;
    let model = config.model.clone().or_else(|| settings.model.clone());
    let provider = providers::build_provider(kind, config.key.clone(), model, settings.timeout)
        .with_context(|| format!("failed to set up the {} provider", kind.as_str()))?;
    let translator = Translator::new(provider, &settings.source_lang, &settings.target_lang);

    let store = LocalStore::new(settings.workbook_root(), &settings.folder);
    let segmenter: Arc<dyn Segmenter> = Arc::new(JiebaSegmenter::new());
    Ok(Recap::new(
        store,
        translator,
        segmenter,
        Arc::new(PinyinSyllabary),
        run_log,
    )
    .with_review_options(ReviewOptions {
        section_delay: settings.section_delay,
        section: settings.review_section.clone(),
    }))
}

fn format_annotation(report: &AnnotationReport) -> String {
    let mut lines = vec![
        format!("document: {} ({})", report.document_title, report.document_id),
        format!(
            "record set: {} ({}), {} sentences",
            report.record_set_title, report.record_set_id, report.sentence_count
        ),
    ];
    if let Some(id) = &report.keyword_record_set_id {
        lines.push(format!("keywords: {} ({})", report.keyword_count, id));
    }
    if report.failed_translations > 0 {
        lines.push(format!(
            "translations unavailable: {}",
            report.failed_translations
        ));
    }
    lines.join("\n")
}

fn format_review(outcome: &ReviewOutcome) -> String {
    match outcome {
        ReviewOutcome::Created(report) => {
            let mut output = format!(
                "review set: {} ({}), {} rows from {} record sets",
                report.title, report.record_set_id, report.rows, report.sources_scanned
            );
            if report.skipped_sections > 0 {
                output.push_str(&format!("\nskipped sections: {}", report.skipped_sections));
            }
            output
        }
        ReviewOutcome::NothingToReview => "nothing to review".to_string(),
        ReviewOutcome::Declined => "review cancelled".to_string(),
    }
}

fn format_histories(entries: &[history::HistoryEntry], last: Option<&history::RunMeta>) -> String {
    if entries.is_empty() && last.is_none() {
        return "no histories".to_string();
    }
    let mut lines = entries
        .iter()
        .map(|entry| {
            format!(
                "{}  {} -> {} ({} sentences)",
                entry.timestamp, entry.document_title, entry.record_set_title, entry.sentence_count
            )
        })
        .collect::<Vec<_>>();
    if let Some(meta) = last {
        lines.push(format!(
            "last run: document {} -> record set {}",
            meta.document_id, meta.record_set_id
        ));
    }
    lines.join("\n")
}
