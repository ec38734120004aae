use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CancelToken, Result};
use crate::page_map::{FullText, PageTextMap};

/// Flavor of a flatly detected section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionType {
    Subtopic,
    Exercise,
    Chapter,
    Summary,
    Other,
}

impl SectionType {
    pub fn label(&self) -> &'static str {
        match self {
            SectionType::Subtopic => "SUBTOPIC",
            SectionType::Exercise => "EXERCISE",
            SectionType::Chapter => "CHAPTER",
            SectionType::Summary => "SUMMARY",
            SectionType::Other => "OTHER",
        }
    }
}

/// A heading-like region detected anywhere in the document, independent of
/// the chapter/topic hierarchy. `end_page` is a fixed-window approximation
/// (start + 4, clamped), not a structural boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    pub id: String,
    pub title: String,
    pub section_type: SectionType,
    pub start_page: u32,
    pub end_page: u32,
    /// Displayable "start-end" string.
    pub page_range: String,
    /// Whitespace-collapsed preview of the matched span, at most 150 chars.
    pub preview: String,
    /// Selection flag owned by downstream UI; round-trips through serde.
    #[serde(default)]
    pub selected: bool,
}

impl ContentSection {
    pub fn create_id(section_type: SectionType, index: usize) -> String {
        format!("{}_{}", section_type.label(), index)
    }
}

/// Pages covered past a detected heading when approximating its end page.
const SECTION_PAGE_WINDOW: u32 = 4;
const PREVIEW_MAX_CHARS: usize = 150;
const TITLE_MAX_CHARS: usize = 100;
/// Hard cap on how far past a heading the preview span may reach.
const SPAN_SCAN_LIMIT: usize = 300;

lazy_static! {
    // Heading patterns anchor on the heading token plus its same-line title;
    // the span past the heading is resolved separately by `span_end` (the
    // regex crate has no lookahead, so terminators become an explicit
    // boundary scan).
    static ref SUBTOPIC_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(\d+\.\d+(?:\.\d+)?)[ \t]+([^\s\n][^\n]*)").unwrap(),
        Regex::new(r"(?i)\b(sub\s*-?\s*topic|subsection)\s*:?\s*([^\s\n][^\n]*)").unwrap(),
    ];
    static ref EXERCISE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(exercises?\s*\d+)").unwrap(),
        Regex::new(r"(?i)\b(exercises?)\b").unwrap(),
        Regex::new(r"(?i)\b(problems?\s+\d+|questions?\s+\d+)").unwrap(),
        Regex::new(r"(?i)\b(practice\s+problems?|practice\s+questions?)").unwrap(),
    ];
    /// Where a heading's span ends: blank line, the next exercise/chapter
    /// keyword, or a following numeric heading.
    static ref SPAN_BOUNDARY: Regex =
        Regex::new(r"(?i)\n\s*\n|\bexercise\b|\bchapter\b|\d+\.\d+").unwrap();
    /// Terminator words trimmed off a same-line title.
    static ref TITLE_BREAK: Regex =
        Regex::new(r"(?i)\b(?:exercise|chapter)\b|\s\d+\.\d+").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Scan the whole document for subtopic- and exercise-shaped headings.
///
/// Never fails: a document with no detectable sections yields an empty list.
/// Within each pattern family, sections sharing a start page are deduplicated
/// (first occurrence wins); a subtopic and an exercise may still share one.
pub fn detect_sections(page_map: &PageTextMap) -> Vec<ContentSection> {
    detect_sections_with_cancel(page_map, &CancelToken::new()).unwrap_or_default()
}

/// Same as `detect_sections` with a cancellation check between pattern
/// families.
pub fn detect_sections_with_cancel(
    page_map: &PageTextMap,
    cancel: &CancelToken,
) -> Result<Vec<ContentSection>> {
    if page_map.is_empty() {
        return Ok(Vec::new());
    }
    let full = page_map.full_text();

    cancel.check()?;
    let mut sections = collect_family(&SUBTOPIC_PATTERNS, SectionType::Subtopic, &full);
    cancel.check()?;
    sections.extend(collect_family(&EXERCISE_PATTERNS, SectionType::Exercise, &full));

    sections.sort_by_key(|s| s.start_page);
    Ok(sections)
}

/// Run one pattern family over the full text, deduplicating by start page.
fn collect_family(patterns: &[Regex], section_type: SectionType, full: &FullText) -> Vec<ContentSection> {
    let max_page = full.max_page();
    let mut sections = Vec::new();
    let mut seq = 0;

    for pattern in patterns {
        for caps in pattern.captures_iter(&full.text) {
            let m = caps.get(0).expect("capture 0 always present");

            let title = match caps.get(2) {
                Some(t) => format!("{} {}", caps[1].trim(), trim_title(t.as_str())),
                None => caps[1].trim().to_string(),
            };
            let title: String = title.chars().take(TITLE_MAX_CHARS).collect();

            let start_page = full.page_at(m.start());
            let end_page = (start_page + SECTION_PAGE_WINDOW).min(max_page);

            sections.push(ContentSection {
                id: ContentSection::create_id(section_type, seq),
                title: title.trim_end().to_string(),
                section_type,
                start_page,
                end_page,
                page_range: format!("{start_page}-{end_page}"),
                preview: build_preview(&full.text, m.start(), m.end()),
                selected: false,
            });
            seq += 1;
        }
    }

    dedup_by_start_page(sections)
}

/// Cut a same-line title at the first terminator word or trailing numeric
/// heading.
fn trim_title(raw: &str) -> &str {
    match TITLE_BREAK.find(raw) {
        Some(m) => raw[..m.start()].trim_end(),
        None => raw.trim_end(),
    }
}

/// Collapse whitespace over the heading's span and truncate for display.
fn build_preview(full_text: &str, match_start: usize, match_end: usize) -> String {
    let end = span_end(full_text, match_end);
    let cleaned = WHITESPACE_RUN
        .replace_all(full_text[match_start..end].trim(), " ")
        .to_string();
    if cleaned.chars().count() > PREVIEW_MAX_CHARS {
        let truncated: String = cleaned.chars().take(PREVIEW_MAX_CHARS).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}

/// Find where a heading's span ends: the earliest boundary after the match,
/// capped at a fixed distance.
fn span_end(full_text: &str, from: usize) -> usize {
    let cap = ceil_char_boundary(full_text, (from + SPAN_SCAN_LIMIT).min(full_text.len()));
    match SPAN_BOUNDARY.find(&full_text[from..cap]) {
        Some(m) => from + m.start(),
        None => cap,
    }
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// First occurrence per start page wins, preserving collection order.
fn dedup_by_start_page(sections: Vec<ContentSection>) -> Vec<ContentSection> {
    let mut seen = HashSet::new();
    sections
        .into_iter()
        .filter(|s| seen.insert(s.start_page))
        .collect()
}
