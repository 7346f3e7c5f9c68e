use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const META_FILE_NAME: &str = "meta.json";
const HISTORY_FILE_NAME: &str = "history.log";

/// What the last annotation run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMeta {
    pub document_id: String,
    pub record_set_id: String,
    pub document_title: String,
    pub record_set_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub document_title: String,
    pub record_set_title: String,
    pub sentence_count: usize,
}

impl HistoryEntry {
    fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            flatten(&self.timestamp),
            flatten(&self.document_title),
            flatten(&self.record_set_title),
            self.sentence_count
        )
    }

    fn from_line(line: &str) -> Option<Self> {
        let mut parts = line.split('\t');
        let timestamp = parts.next()?.to_string();
        let document_title = parts.next()?.to_string();
        let record_set_title = parts.next()?.to_string();
        let sentence_count = parts.next()?.trim().parse().ok()?;
        Some(Self {
            timestamp,
            document_title,
            record_set_title,
            sentence_count,
        })
    }
}

/// Run metadata (overwritten per run) and an append-only run history.
#[derive(Debug, Clone)]
pub struct RunLog {
    dir: PathBuf,
}

impl RunLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE_NAME)
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE_NAME)
    }

    pub fn write_meta(&self, meta: &RunMeta) -> Result<()> {
        let path = self.meta_path();
        ensure_parent(&path)?;
        let content = serde_json::to_string_pretty(meta)?;
        fs::write(&path, content)
            .with_context(|| format!("failed to write run meta: {}", path.display()))
    }

    pub fn read_meta(&self) -> Result<Option<RunMeta>> {
        let path = self.meta_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).with_context(|| "failed to read run meta")?;
        let meta = serde_json::from_str(&content).with_context(|| "failed to parse run meta")?;
        Ok(Some(meta))
    }

    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let path = self.history_path();
        ensure_parent(&path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open history: {}", path.display()))?;
        writeln!(file, "{}", entry.to_line())
            .with_context(|| format!("failed to append history: {}", path.display()))
    }

    /// The newest `limit` entries, oldest first. Malformed lines are skipped.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let path = self.history_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).with_context(|| "failed to read history")?;
        let entries: Vec<HistoryEntry> = content
            .lines()
            .filter_map(HistoryEntry::from_line)
            .collect();
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.into_iter().skip(skip).collect())
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory: {}", dir.display()))?;
    }
    Ok(())
}

fn flatten(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
