use std::collections::BTreeSet;

use crate::model::SentenceRecord;
use crate::providers::TranslationProvider;
use crate::records::RecordBuilder;
use crate::segmenter::Segmenter;

pub const KEYWORD_PREFIX: &str = "Keywords_";

/// Distinct noun- and verb-family words across all sentences, in codepoint
/// order.
pub fn extract_vocabulary(segmenter: &dyn Segmenter, sentences: &[String]) -> Vec<String> {
    let mut words = BTreeSet::new();
    for sentence in sentences {
        for tagged in segmenter.tag(sentence) {
            if tagged.is_noun() || tagged.is_verb() {
                words.insert(tagged.word);
            }
        }
    }
    words.into_iter().collect()
}

/// Vocabulary rows, romanized and translated exactly like sentences.
pub async fn build_keyword_entries<P: TranslationProvider>(
    segmenter: &dyn Segmenter,
    builder: &RecordBuilder<'_, P>,
    sentences: &[String],
) -> (Vec<SentenceRecord>, usize) {
    let vocabulary = extract_vocabulary(segmenter, sentences);
    builder.build_all(&vocabulary).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::TaggedWord;

    /// Splits on characters and tags from a fixed table.
    struct CharTagger;

    impl Segmenter for CharTagger {
        fn cut(&self, text: &str) -> Vec<String> {
            text.chars().map(|ch| ch.to_string()).collect()
        }

        fn tag(&self, text: &str) -> Vec<TaggedWord> {
            text.chars()
                .map(|ch| {
                    let tag = match ch {
                        '我' | '猫' => "n",
                        '爱' => "v",
                        _ => "x",
                    };
                    TaggedWord::new(ch.to_string(), tag)
                })
                .collect()
        }
    }

    fn sentences(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn vocabulary_is_deduplicated_and_sorted() {
        let words = extract_vocabulary(&CharTagger, &sentences(&["我爱猫", "猫爱我"]));
        assert_eq!(words, vec!["我", "爱", "猫"]);
        let mut sorted = words.clone();
        sorted.sort();
        assert_eq!(words, sorted);
    }

    #[test]
    fn other_tags_are_ignored() {
        let words = extract_vocabulary(&CharTagger, &sentences(&["很好吧"]));
        assert!(words.is_empty());
    }
}
