use regex::Regex;
use std::sync::OnceLock;

use crate::model::Paragraph;

const COMMENT_MARKERS: [&str; 2] = ["#", "//"];

fn parenthesized() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(.*?\)").expect("static pattern"))
}

/// Strips annotator notes in parentheses and trims the result. Returns
/// `None` for empty text and comment lines.
pub fn clean_sentence(raw: &str) -> Option<String> {
    let stripped = parenthesized().replace_all(raw, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return None;
    }
    if COMMENT_MARKERS
        .iter()
        .any(|marker| trimmed.starts_with(marker))
    {
        return None;
    }
    Some(trimmed.to_string())
}

/// Cleans every paragraph in document order, dropping rejected ones.
pub fn clean_paragraphs(paragraphs: &[Paragraph]) -> Vec<String> {
    paragraphs
        .iter()
        .filter_map(|paragraph| clean_sentence(&paragraph.text()))
        .collect()
}
