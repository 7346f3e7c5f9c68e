use tracing::debug;

use crate::keywords;
use crate::model::{Paragraph, SentenceRecord};
use crate::normalize;
use crate::providers::TranslationProvider;
use crate::records::RecordBuilder;
use crate::romanize::Romanizer;
use crate::segmenter::Segmenter;

#[derive(Debug, Clone, Default)]
pub struct Annotated {
    pub sentences: Vec<SentenceRecord>,
    pub keywords: Vec<SentenceRecord>,
    pub failed_translations: usize,
}

/// Cleans paragraphs into sentence rows (source order) and derives the
/// keyword rows (codepoint order).
pub struct AnnotationPipeline<'a, P: TranslationProvider> {
    segmenter: &'a dyn Segmenter,
    builder: RecordBuilder<'a, P>,
}

impl<'a, P: TranslationProvider> AnnotationPipeline<'a, P> {
    pub fn new(segmenter: &'a dyn Segmenter, builder: RecordBuilder<'a, P>) -> Self {
        Self { segmenter, builder }
    }

    pub async fn annotate(&self, paragraphs: &[Paragraph]) -> Annotated {
        let cleaned = normalize::clean_paragraphs(paragraphs);
        debug!(
            "{} of {} paragraphs kept after cleaning",
            cleaned.len(),
            paragraphs.len()
        );
        let (sentences, sentence_failures) = self.builder.build_all(&cleaned).await;
        let (keywords, keyword_failures) =
            keywords::build_keyword_entries(self.segmenter, &self.builder, &cleaned).await;
        Annotated {
            sentences,
            keywords,
            failed_translations: sentence_failures + keyword_failures,
        }
    }
}

/// Fresh romanization for every row, in row order. Translations are not
/// consulted.
pub fn regenerate_romanization(romanizer: &Romanizer, rows: &[SentenceRecord]) -> Vec<String> {
    rows.iter()
        .map(|row| romanizer.romanize(&row.original))
        .collect()
}
