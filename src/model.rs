use serde::{Deserialize, Serialize};

/// Header row written at the top of every record set.
pub const HEADER: [&str; 3] = ["front", "back", "pinyin"];

/// One paragraph of a source document, kept as the runs the document
/// store handed back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub runs: Vec<String>,
}

impl Paragraph {
    pub fn new(runs: Vec<String>) -> Self {
        Self { runs }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![text.into()],
        }
    }

    pub fn text(&self) -> String {
        self.runs.concat()
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
}

/// A `(translation, original, romanization)` row. Keyword entries use the
/// same shape with a single vocabulary word in `original`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub translation: String,
    pub original: String,
    pub romanization: String,
}

impl SentenceRecord {
    pub fn new(
        translation: impl Into<String>,
        original: impl Into<String>,
        romanization: impl Into<String>,
    ) -> Self {
        Self {
            translation: translation.into(),
            original: original.into(),
            romanization: romanization.into(),
        }
    }

    /// Reads a stored row; missing trailing cells become empty strings and
    /// cells past the third are ignored.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |index: usize| row.get(index).cloned().unwrap_or_default();
        Self {
            translation: cell(Column::Front.index()),
            original: cell(Column::Back.index()),
            romanization: cell(Column::Pinyin.index()),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.translation.clone(),
            self.original.clone(),
            self.romanization.clone(),
        ]
    }

    pub fn is_blank(&self) -> bool {
        self.translation.trim().is_empty()
            && self.original.trim().is_empty()
            && self.romanization.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Front,
    Back,
    Pinyin,
}

impl Column {
    pub fn index(self) -> usize {
        match self {
            Column::Front => 0,
            Column::Back => 1,
            Column::Pinyin => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        HEADER[self.index()]
    }
}

/// Where a freshly created record set lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSetHandle {
    pub id: String,
    pub title: String,
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetInfo {
    pub id: String,
    pub title: String,
}
