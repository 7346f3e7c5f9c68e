use crate::model::SentenceRecord;
use crate::providers::TranslationProvider;
use crate::romanize::Romanizer;
use crate::translator::Translator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRecord {
    pub record: SentenceRecord,
    pub translation_failed: bool,
}

/// Turns a cleaned sentence (or a single vocabulary word) into a row.
pub struct RecordBuilder<'a, P: TranslationProvider> {
    romanizer: &'a Romanizer,
    translator: &'a Translator<P>,
}

impl<'a, P: TranslationProvider> RecordBuilder<'a, P> {
    pub fn new(romanizer: &'a Romanizer, translator: &'a Translator<P>) -> Self {
        Self {
            romanizer,
            translator,
        }
    }

    pub async fn build(&self, original: &str) -> BuiltRecord {
        let romanization = self.romanizer.romanize(original);
        let resolution = self.translator.resolve(original).await;
        let translation_failed = resolution.is_unavailable();
        BuiltRecord {
            record: SentenceRecord::new(resolution.into_text(), original, romanization),
            translation_failed,
        }
    }

    /// Builds rows in input order and counts the translations that fell
    /// through the fallback ladder.
    pub async fn build_all(&self, originals: &[String]) -> (Vec<SentenceRecord>, usize) {
        let mut records = Vec::with_capacity(originals.len());
        let mut failed = 0usize;
        for original in originals {
            let built = self.build(original).await;
            if built.translation_failed {
                failed += 1;
            }
            records.push(built.record);
        }
        (records, failed)
    }
}
