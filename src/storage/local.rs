use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use super::{DocumentStore, RecordStore, StoreFuture};
use crate::model::{
    Column, Document, HEADER, Paragraph, RecordSetHandle, RecordSetInfo, SentenceRecord,
};
use crate::naming;

const DOCS_DIR: &str = "docs";
const TITLE_HEADER: &str = "# title:";
const DEFAULT_SECTION: &str = "Sheet1";
const COLUMN_WIDTH_PX: u32 = 250;

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Documents as text files and record sets as JSON workbooks under one
/// directory.
///
/// ```text
/// <root>/docs/<id>.txt          one paragraph per line, optional "# title:" first line
/// <root>/<folder>/<id>.json     workbook with named sections of rows
/// ```
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    folder: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Workbook {
    id: String,
    title: String,
    created_at: String,
    #[serde(default)]
    column_width: Option<u32>,
    sections: Vec<WorkbookSection>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WorkbookSection {
    name: String,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

impl Workbook {
    fn section_mut(&mut self, name: &str) -> Result<&mut WorkbookSection> {
        let id = self.id.clone();
        self.sections
            .iter_mut()
            .find(|section| section.name == name)
            .ok_or_else(|| anyhow!("section '{}' not found in record set {}", name, id))
    }

    fn section(&self, name: &str) -> Result<&WorkbookSection> {
        self.sections
            .iter()
            .find(|section| section.name == name)
            .ok_or_else(|| anyhow!("section '{}' not found in record set {}", name, self.id))
    }
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, folder: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            folder: folder.into(),
        }
    }

    pub fn document_path(&self, document_id: &str) -> Result<PathBuf> {
        validate_id(document_id)?;
        Ok(self.root.join(DOCS_DIR).join(format!("{}.txt", document_id)))
    }

    fn folder_dir(&self) -> PathBuf {
        self.root.join(&self.folder)
    }

    fn workbook_path(&self, record_set_id: &str) -> Result<PathBuf> {
        validate_id(record_set_id)?;
        Ok(self.folder_dir().join(format!("{}.json", record_set_id)))
    }

    fn load_workbook(&self, record_set_id: &str) -> Result<Workbook> {
        let path = self.workbook_path(record_set_id)?;
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read record set: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse record set: {}", path.display()))
    }

    fn save_workbook(&self, workbook: &Workbook) -> Result<()> {
        let path = self.workbook_path(&workbook.id)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create folder: {}", dir.display()))?;
        }
        let content = serde_json::to_string_pretty(workbook)?;
        fs::write(&path, content)
            .with_context(|| format!("failed to write record set: {}", path.display()))
    }

    fn read_document(&self, document_id: &str) -> Result<Document> {
        let path = self.document_path(document_id)?;
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read document: {}", path.display()))?;
        Ok(parse_document(document_id, &content))
    }

    fn create_document(&self, title: &str) -> Result<String> {
        let id = new_id(title);
        let path = self.document_path(&id)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create docs dir: {}", dir.display()))?;
        }
        fs::write(&path, format!("{} {}\n", TITLE_HEADER, title))
            .with_context(|| format!("failed to write document: {}", path.display()))?;
        debug!("created document {} ({})", id, title);
        Ok(id)
    }

    fn create_workbook(&self, title: &str) -> Result<RecordSetHandle> {
        let id = new_id(title);
        let workbook = Workbook {
            id: id.clone(),
            title: title.to_string(),
            created_at: naming::timestamp(naming::now_local()),
            column_width: None,
            sections: vec![WorkbookSection {
                name: DEFAULT_SECTION.to_string(),
                rows: vec![HEADER.iter().map(|cell| cell.to_string()).collect()],
            }],
        };
        self.save_workbook(&workbook)?;
        debug!("created record set {} ({})", id, title);
        Ok(RecordSetHandle {
            id,
            title: title.to_string(),
            section: DEFAULT_SECTION.to_string(),
        })
    }

    fn replace_rows(
        &self,
        record_set_id: &str,
        section: &str,
        rows: &[SentenceRecord],
    ) -> Result<()> {
        let mut workbook = self.load_workbook(record_set_id)?;
        let target = workbook.section_mut(section)?;
        target.rows.truncate(1);
        if target.rows.is_empty() {
            target.rows.push(HEADER.iter().map(|cell| cell.to_string()).collect());
        }
        target.rows.extend(rows.iter().map(SentenceRecord::to_row));
        self.save_workbook(&workbook)
    }

    fn data_rows(&self, record_set_id: &str, section: &str) -> Result<Vec<SentenceRecord>> {
        let workbook = self.load_workbook(record_set_id)?;
        let source = workbook.section(section)?;
        Ok(source
            .rows
            .iter()
            .skip(1)
            .map(|row| SentenceRecord::from_row(row))
            .collect())
    }

    fn section_names(&self, record_set_id: &str) -> Result<Vec<String>> {
        let workbook = self.load_workbook(record_set_id)?;
        Ok(workbook
            .sections
            .into_iter()
            .map(|section| section.name)
            .collect())
    }

    fn list(&self) -> Result<Vec<RecordSetInfo>> {
        let dir = self.folder_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("failed to list folder: {}", dir.display()))?;

        let mut found = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("failed to list folder: {}", dir.display()))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|content| {
                    serde_json::from_str::<Workbook>(&content).map_err(anyhow::Error::from)
                });
            match parsed {
                Ok(workbook) => found.push((workbook.created_at, workbook.id, workbook.title)),
                Err(err) => warn!("skipping unreadable record set {}: {:#}", path.display(), err),
            }
        }
        found.sort();
        Ok(found
            .into_iter()
            .map(|(_, id, title)| RecordSetInfo { id, title })
            .collect())
    }

    fn overwrite_column(
        &self,
        record_set_id: &str,
        section: &str,
        column: Column,
        values: &[String],
    ) -> Result<()> {
        let mut workbook = self.load_workbook(record_set_id)?;
        let target = workbook.section_mut(section)?;
        for (offset, value) in values.iter().enumerate() {
            let index = offset + 1;
            while target.rows.len() <= index {
                target.rows.push(Vec::new());
            }
            let row = &mut target.rows[index];
            while row.len() <= column.index() {
                row.push(String::new());
            }
            row[column.index()] = value.clone();
        }
        debug!(
            "updated {} rows of column '{}' in {}!{}",
            values.len(),
            column.as_str(),
            record_set_id,
            section
        );
        self.save_workbook(&workbook)
    }

    fn set_column_width(&self, record_set_id: &str) -> Result<()> {
        let mut workbook = self.load_workbook(record_set_id)?;
        workbook.column_width = Some(COLUMN_WIDTH_PX);
        self.save_workbook(&workbook)
    }
}

impl DocumentStore for LocalStore {
    fn fetch<'a>(&'a self, document_id: &'a str) -> StoreFuture<'a, Document> {
        Box::pin(async move { self.read_document(document_id) })
    }

    fn create<'a>(&'a self, title: &'a str) -> StoreFuture<'a, String> {
        Box::pin(async move { self.create_document(title) })
    }
}

impl RecordStore for LocalStore {
    fn create_record_set<'a>(&'a self, title: &'a str) -> StoreFuture<'a, RecordSetHandle> {
        Box::pin(async move { self.create_workbook(title) })
    }

    fn write_rows<'a>(
        &'a self,
        record_set_id: &'a str,
        section: &'a str,
        rows: &'a [SentenceRecord],
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.replace_rows(record_set_id, section, rows) })
    }

    fn read_rows<'a>(
        &'a self,
        record_set_id: &'a str,
        section: &'a str,
    ) -> StoreFuture<'a, Vec<SentenceRecord>> {
        Box::pin(async move { self.data_rows(record_set_id, section) })
    }

    fn sections<'a>(&'a self, record_set_id: &'a str) -> StoreFuture<'a, Vec<String>> {
        Box::pin(async move { self.section_names(record_set_id) })
    }

    fn list_record_sets(&self) -> StoreFuture<'_, Vec<RecordSetInfo>> {
        Box::pin(async move { self.list() })
    }

    fn update_column<'a>(
        &'a self,
        record_set_id: &'a str,
        section: &'a str,
        column: Column,
        values: &'a [String],
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.overwrite_column(record_set_id, section, column, values) })
    }

    fn resize_columns<'a>(&'a self, record_set_id: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.set_column_width(record_set_id) })
    }
}

fn parse_document(document_id: &str, content: &str) -> Document {
    let mut lines = content.lines().peekable();
    let title = match lines
        .peek()
        .and_then(|line| line.strip_prefix(TITLE_HEADER))
    {
        Some(title) => {
            let title = title.trim().to_string();
            lines.next();
            title
        }
        None => document_id.to_string(),
    };
    let paragraphs = lines.map(Paragraph::from_text).collect();
    Document {
        id: document_id.to_string(),
        title,
        paragraphs,
    }
}

fn validate_id(id: &str) -> Result<()> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("id is empty"));
    }
    if trimmed != id || id.contains(['/', '\\']) || id.starts_with('.') {
        return Err(anyhow!("invalid id '{}'", id));
    }
    Ok(())
}

fn new_id(title: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let seed = format!("{}:{}:{}", title, nanos, counter);
    format!("{:x}", md5::compute(seed.as_bytes()))
}
