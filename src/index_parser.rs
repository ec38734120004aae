use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, CancelToken, Result};
use crate::page_map::PageTextMap;

/// Leaf of the recovered hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTopic {
    pub name: String,
    pub start_page: u32,
    pub end_page: u32,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub start_page: u32,
    pub end_page: u32,
    pub order: u32,
    pub subtopics: Vec<SubTopic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub name: String,
    pub number: u32,
    pub start_page: u32,
    pub end_page: u32,
    pub order: u32,
    pub topics: Vec<Topic>,
}

/// Hierarchical table of contents recovered from a document's early pages.
/// Immutable after construction; re-parsing produces a fresh value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIndex {
    pub document_id: String,
    pub chapters: Vec<Chapter>,
    pub total_pages: u32,
}

/// How many leading pages are scanned for a contents-like page.
const INDEX_SCAN_PAGES: u32 = 10;

/// Keywords that make a page look like a table of contents.
const INDEX_KEYWORDS: &[&str] = &[
    "contents", "index", "chapter", "unit", "syllabus", "chapter 1", "chapter 2", "1.", "2.",
    "unit 1", "unit 2",
];

/// What a single index line was recognized as, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineMatch {
    Chapter { name: String, page: u32 },
    Topic { name: String, page: u32 },
    SubTopic { name: String, page: u32 },
    PageOnly(u32),
}

/// Which entity is currently accepting children/continuation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    NoneOpen,
    InChapter(usize),
    InTopic(usize, usize),
}

lazy_static! {
    // The chapter head requires whitespace after "N." / "N:" so that "N.N"
    // topic lines can never match it (the regex crate has no lookahead, so
    // the patterns are kept disjoint by construction).
    static ref CHAPTER_RE: Regex =
        Regex::new(r"(?i)^(?:chapter|unit)?\s*(\d+)[.:]\s+(.+?)(?:\s+(\d+))?$").unwrap();
    static ref TOPIC_RE: Regex =
        Regex::new(r"(?i)^(\d+\.\d+|[a-z]\)|[ivx]+\))\s+(.+?)(?:\s+(\d+))?$").unwrap();
    static ref SUBTOPIC_RE: Regex =
        Regex::new(r"^(\d+\.\d+\.\d+)\s+(.+?)(?:\s+(\d+))?$").unwrap();
    static ref PAGE_ONLY_RE: Regex = Regex::new(r"^(\d+)$").unwrap();
    static ref LINE_ENDS_WITH_NUMBER: Regex = Regex::new(r"(?m)\d+\s*$").unwrap();
}

/// Parse the table of contents from the first `min(10, total)` pages of a
/// document into a `DocumentIndex`.
///
/// Fails only with `IndexNotFound` when no page in the scanned prefix looks
/// like a contents page; callers can then fall back to `detect_sections`.
pub fn parse_index(page_map: &PageTextMap, document_id: &str) -> Result<DocumentIndex> {
    parse_index_with_cancel(page_map, document_id, &CancelToken::new())
}

/// Same as `parse_index` with a cooperative cancellation check between pages.
pub fn parse_index_with_cancel(
    page_map: &PageTextMap,
    document_id: &str,
    cancel: &CancelToken,
) -> Result<DocumentIndex> {
    let total_pages = page_map.total_pages();
    let mut index_text = String::new();

    for (page, text) in page_map.iter() {
        cancel.check()?;
        if page > INDEX_SCAN_PAGES {
            break;
        }
        if is_index_page(text) {
            index_text.push_str(text);
            index_text.push('\n');
        }
    }

    if index_text.is_empty() {
        return Err(AnalysisError::IndexNotFound(format!(
            "no contents-like page in the first {} pages",
            total_pages.min(INDEX_SCAN_PAGES)
        )));
    }

    let chapters = parse_chapters(&index_text, total_pages);
    log::debug!(
        "parsed index for {}: {} chapters over {} pages",
        document_id,
        chapters.len(),
        total_pages
    );

    Ok(DocumentIndex {
        document_id: document_id.to_string(),
        chapters,
        total_pages,
    })
}

/// Heuristic: a page is contents-like when it mentions one of the index
/// keywords and also carries page-number evidence (the word "page" or a line
/// ending in a bare number).
fn is_index_page(text: &str) -> bool {
    let lower = text.to_lowercase();
    let has_keyword = INDEX_KEYWORDS.iter().any(|k| lower.contains(k));
    has_keyword && (lower.contains("page") || LINE_ENDS_WITH_NUMBER.is_match(text))
}

/// Line-scan the concatenated index text and build the chapter hierarchy.
fn parse_chapters(index_text: &str, total_pages: u32) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = Vec::new();
    let mut cursor = Cursor::NoneOpen;

    for line in index_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        cursor = apply_line(cursor, line, &mut chapters);
    }

    backfill_end_pages(&mut chapters, total_pages);
    chapters
}

/// Classify one trimmed line against the pattern table, in priority order.
fn classify_line(line: &str) -> Option<LineMatch> {
    if let Some(caps) = CHAPTER_RE.captures(line) {
        return Some(LineMatch::Chapter {
            name: caps[2].trim().to_string(),
            page: parse_page(caps.get(3).map(|m| m.as_str())),
        });
    }
    if let Some(caps) = TOPIC_RE.captures(line) {
        return Some(LineMatch::Topic {
            name: caps[2].trim().to_string(),
            page: parse_page(caps.get(3).map(|m| m.as_str())),
        });
    }
    if let Some(caps) = SUBTOPIC_RE.captures(line) {
        return Some(LineMatch::SubTopic {
            name: caps[2].trim().to_string(),
            page: parse_page(caps.get(3).map(|m| m.as_str())),
        });
    }
    if let Some(caps) = PAGE_ONLY_RE.captures(line) {
        return Some(LineMatch::PageOnly(parse_page(Some(&caps[1]))));
    }
    None
}

/// Malformed or absent numeric page fields default to 0.
fn parse_page(field: Option<&str>) -> u32 {
    field.and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// Advance the cursor state by one line, appending to `chapters` as entities
/// open. Orphan topic/subtopic lines (no open parent) are dropped, never
/// re-attached one level up.
fn apply_line(cursor: Cursor, line: &str, chapters: &mut Vec<Chapter>) -> Cursor {
    match classify_line(line) {
        Some(LineMatch::Chapter { name, page }) => {
            // Chapter numbers are sequential in encounter order, independent
            // of the digits printed on the line.
            let number = chapters.len() as u32 + 1;
            chapters.push(Chapter {
                name,
                number,
                start_page: page,
                end_page: page,
                order: number,
                topics: Vec::new(),
            });
            Cursor::InChapter(chapters.len() - 1)
        }
        Some(LineMatch::Topic { name, page }) => match cursor {
            Cursor::NoneOpen => {
                log::debug!("dropping topic line with no open chapter: {line:?}");
                cursor
            }
            Cursor::InChapter(c) | Cursor::InTopic(c, _) => {
                let chapter = &mut chapters[c];
                let order = chapter.topics.len() as u32 + 1;
                chapter.topics.push(Topic {
                    name,
                    start_page: page,
                    end_page: page,
                    order,
                    subtopics: Vec::new(),
                });
                Cursor::InTopic(c, chapter.topics.len() - 1)
            }
        },
        Some(LineMatch::SubTopic { name, page }) => match cursor {
            Cursor::InTopic(c, t) => {
                let topic = &mut chapters[c].topics[t];
                let order = topic.subtopics.len() as u32 + 1;
                topic.subtopics.push(SubTopic {
                    name,
                    start_page: page,
                    end_page: page,
                    order,
                });
                cursor
            }
            // Observed source behavior: a subtopic with no open topic is
            // discarded rather than attached to the chapter.
            Cursor::NoneOpen | Cursor::InChapter(_) => {
                log::debug!("dropping subtopic line with no open topic: {line:?}");
                cursor
            }
        },
        Some(LineMatch::PageOnly(page)) => {
            apply_continuation_page(cursor, page, chapters);
            cursor
        }
        None => cursor,
    }
}

/// A bare trailing page number closes the innermost open entity that is still
/// sitting at its own start page.
fn apply_continuation_page(cursor: Cursor, page: u32, chapters: &mut [Chapter]) {
    match cursor {
        Cursor::NoneOpen => {}
        Cursor::InTopic(c, t) => {
            let topic = &mut chapters[c].topics[t];
            if topic.end_page == topic.start_page && page > topic.start_page {
                topic.end_page = page;
                return;
            }
            let chapter = &mut chapters[c];
            if chapter.end_page == chapter.start_page && page > chapter.start_page {
                chapter.end_page = page;
            }
        }
        Cursor::InChapter(c) => {
            let chapter = &mut chapters[c];
            if chapter.end_page == chapter.start_page && page > chapter.start_page {
                chapter.end_page = page;
            }
        }
    }
}

/// Close every chapter at (next chapter's start - 1), the last at the total
/// page count, flooring so an end page is never below its own start. The same
/// rule is applied to topics within each chapter.
fn backfill_end_pages(chapters: &mut [Chapter], total_pages: u32) {
    let count = chapters.len();
    for i in 0..count {
        let end = if i + 1 < count {
            chapters[i + 1].start_page.saturating_sub(1)
        } else {
            total_pages
        };
        chapters[i].end_page = end.max(chapters[i].start_page);

        let chapter_end = chapters[i].end_page;
        let topic_count = chapters[i].topics.len();
        for t in 0..topic_count {
            let topic_end = if t + 1 < topic_count {
                chapters[i].topics[t + 1].start_page.saturating_sub(1)
            } else {
                chapter_end
            };
            let topic = &mut chapters[i].topics[t];
            topic.end_page = topic_end.max(topic.start_page);
        }
    }
}
