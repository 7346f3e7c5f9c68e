use pinyin::ToPinyin;
use std::sync::Arc;

use crate::segmenter::Segmenter;

/// Maps a single character to its toned syllable.
pub trait Syllabary: Send + Sync {
    fn toned(&self, ch: char) -> Option<String>;
}

/// Diacritic-toned readings from the `pinyin` tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinSyllabary;

impl Syllabary for PinyinSyllabary {
    fn toned(&self, ch: char) -> Option<String> {
        ch.to_pinyin().map(|pinyin| pinyin.with_tone().to_string())
    }
}

/// Word-spaced pinyin for a sentence. Pure: the same input always yields
/// the same output.
#[derive(Clone)]
pub struct Romanizer {
    segmenter: Arc<dyn Segmenter>,
    syllabary: Arc<dyn Syllabary>,
}

impl Romanizer {
    pub fn new(segmenter: Arc<dyn Segmenter>, syllabary: Arc<dyn Syllabary>) -> Self {
        Self {
            segmenter,
            syllabary,
        }
    }

    pub fn romanize(&self, text: &str) -> String {
        self.segmenter
            .cut(text)
            .iter()
            .filter(|word| !word.trim().is_empty())
            .map(|word| self.romanize_word(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn romanize_word(&self, word: &str) -> String {
        let mut out = String::new();
        for ch in word.chars() {
            match self.syllabary.toned(ch) {
                Some(syllable) => out.push_str(&syllable),
                None => out.push(ch),
            }
        }
        out
    }
}

impl std::fmt::Debug for Romanizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Romanizer").finish_non_exhaustive()
    }
}
