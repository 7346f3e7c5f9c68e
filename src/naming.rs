use time::OffsetDateTime;
use time::macros::format_description;

use crate::keywords::KEYWORD_PREFIX;

pub const REVIEW_PREFIX: &str = "review_";

pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn month_day(at: OffsetDateTime) -> String {
    format!("{:02}{:02}", u8::from(at.month()), at.day())
}

fn hour_minute(at: OffsetDateTime) -> String {
    format!("{:02}:{:02}", at.hour(), at.minute())
}

/// Replaces path separators and spaces so the title can be embedded in a
/// generated name.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|ch| match ch {
            '/' | '\\' => '-',
            ' ' => '_',
            other => other,
        })
        .collect()
}

pub fn annotation_title(document_title: &str, at: OffsetDateTime) -> String {
    format!(
        "Chinese_{}_from_{}-{}",
        month_day(at),
        sanitize_title(document_title),
        hour_minute(at)
    )
}

pub fn keyword_title(annotation_title: &str) -> String {
    format!("{}{}", KEYWORD_PREFIX, annotation_title)
}

/// Title for the empty record set created alongside a fresh document.
pub fn blank_annotation_title(at: OffsetDateTime) -> String {
    format!("Chinese_{}", month_day(at))
}

pub fn blank_document_title(at: OffsetDateTime) -> String {
    format!("{:02}/{:02}", u8::from(at.month()), at.day())
}

pub fn review_title(at: OffsetDateTime) -> String {
    format!("{}{}", REVIEW_PREFIX, month_day(at))
}

pub fn source_review_title(at: OffsetDateTime) -> String {
    format!("{}from_sheet_{}", REVIEW_PREFIX, month_day(at))
}

pub fn is_review_title(title: &str) -> bool {
    title.starts_with(REVIEW_PREFIX)
}

pub fn timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    at.format(&format)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}
