use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::model::SentenceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    /// Every row of every section.
    All,
    /// At most `k` rows per section, drawn without replacement.
    PerSection(usize),
}

impl SamplingMode {
    pub fn describe(&self) -> String {
        match self {
            SamplingMode::All => "all rows".to_string(),
            SamplingMode::PerSection(quota) => format!("{} rows per section", quota),
        }
    }
}

/// Shown to the confirmation gate before a multi-source scan starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPlan {
    pub record_sets: usize,
    pub mode: SamplingMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewReport {
    pub record_set_id: String,
    pub title: String,
    pub rows: usize,
    pub sources_scanned: usize,
    pub skipped_sections: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    Created(ReviewReport),
    NothingToReview,
    Declined,
}

/// Sampling and shuffling over an injected random source.
#[derive(Debug)]
pub struct ReviewSampler<R: Rng> {
    rng: R,
}

impl<R: Rng> ReviewSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Rows one section contributes. Blank rows never count toward a quota.
    pub fn collect_section(
        &mut self,
        rows: Vec<SentenceRecord>,
        mode: SamplingMode,
    ) -> Vec<SentenceRecord> {
        let rows = drop_blank(rows);
        match mode {
            SamplingMode::All => rows,
            SamplingMode::PerSection(quota) => rows
                .choose_multiple(&mut self.rng, quota)
                .cloned()
                .collect(),
        }
    }

    /// Filters blanks, shuffles the whole pool once, then keeps at most
    /// `limit` rows.
    pub fn finish(
        &mut self,
        pool: Vec<SentenceRecord>,
        limit: Option<usize>,
    ) -> Vec<SentenceRecord> {
        let mut pool = drop_blank(pool);
        pool.shuffle(&mut self.rng);
        if let Some(limit) = limit {
            pool.truncate(limit);
        }
        pool
    }
}

fn drop_blank(rows: Vec<SentenceRecord>) -> Vec<SentenceRecord> {
    rows.into_iter().filter(|row| !row.is_blank()).collect()
}
