use jieba_rs::Jieba;

/// A word together with its part-of-speech tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedWord {
    pub word: String,
    pub tag: String,
}

impl TaggedWord {
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }

    pub fn is_noun(&self) -> bool {
        self.tag.starts_with('n')
    }

    pub fn is_verb(&self) -> bool {
        self.tag.starts_with('v')
    }
}

/// Word segmentation for unspaced text.
pub trait Segmenter: Send + Sync {
    fn cut(&self, text: &str) -> Vec<String>;
    fn tag(&self, text: &str) -> Vec<TaggedWord>;
}

/// HMM stays on for unknown words in both cutting and tagging.
const HMM: bool = true;

pub struct JiebaSegmenter {
    jieba: Jieba,
}

impl JiebaSegmenter {
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
        }
    }
}

impl Default for JiebaSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JiebaSegmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiebaSegmenter")
            .field("hmm", &HMM)
            .finish_non_exhaustive()
    }
}

impl Segmenter for JiebaSegmenter {
    fn cut(&self, text: &str) -> Vec<String> {
        self.jieba
            .cut(text, HMM)
            .into_iter()
            .map(|word| word.to_string())
            .collect()
    }

    fn tag(&self, text: &str) -> Vec<TaggedWord> {
        self.jieba
            .tag(text, HMM)
            .into_iter()
            .map(|tag| TaggedWord::new(tag.word, tag.tag))
            .collect()
    }
}
