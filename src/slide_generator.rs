use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, CancelToken, Result};
use crate::slide_template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlideType {
    Title,
    Content,
    BulletPoints,
    Summary,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub number: u32,
    pub title: String,
    pub content: String,
    pub slide_type: SlideType,
    pub bullet_points: Option<Vec<String>>,
    pub order: u32,
}

/// An ordered slide sequence. All mutation goes through `insert_slide` /
/// `remove_slide` / `move_slide`, each of which renumbers, so `number` and
/// `order` stay contiguous from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideDeck {
    pub title: String,
    pub subject: String,
    pub chapter: String,
    pub slides: Vec<Slide>,
}

impl SlideDeck {
    /// Insert at `index` (clamped to the deck length) and renumber.
    pub fn insert_slide(&mut self, index: usize, slide: Slide) {
        let index = index.min(self.slides.len());
        self.slides.insert(index, slide);
        self.renumber();
    }

    /// Remove the slide at `index`, if any, and renumber.
    pub fn remove_slide(&mut self, index: usize) -> Option<Slide> {
        if index >= self.slides.len() {
            return None;
        }
        let removed = self.slides.remove(index);
        self.renumber();
        Some(removed)
    }

    /// Move a slide from one position to another; returns false when either
    /// index is out of bounds.
    pub fn move_slide(&mut self, from: usize, to: usize) -> bool {
        if from >= self.slides.len() || to >= self.slides.len() {
            return false;
        }
        let slide = self.slides.remove(from);
        self.slides.insert(to, slide);
        self.renumber();
        true
    }

    /// Render the deck to its self-contained markup document.
    pub fn to_html(&self) -> String {
        slide_template::render_deck(self)
    }

    fn renumber(&mut self) {
        for (i, slide) in self.slides.iter_mut().enumerate() {
            slide.number = i as u32 + 1;
            slide.order = i as u32 + 1;
        }
    }
}

/// Paragraphs at or below this length are skipped as filler.
const MIN_PARAGRAPH_CHARS: usize = 50;
/// Paragraphs above this length are split into sentence chunks.
const LONG_PARAGRAPH_CHARS: usize = 500;
const SENTENCES_PER_SLIDE: usize = 3;
const MAX_BULLET_POINTS: usize = 10;
const SUMMARY_MAX_POINTS: usize = 5;
const SUMMARY_SENTENCE_MIN_CHARS: usize = 30;
const SUMMARY_SENTENCE_MAX_CHARS: usize = 150;

/// Sentences carrying one of these words are summary material.
const IMPORTANCE_KEYWORDS: &[&str] = &[
    "important", "significant", "key", "main", "primary", "essential",
];

lazy_static! {
    static ref PARAGRAPH_SPLIT: Regex = Regex::new(r"\n\n+").unwrap();
    static ref SENTENCE_SPLIT: Regex = Regex::new(r"[.!?]+").unwrap();
    static ref BULLET_LINE: Regex = Regex::new(r"(?m)^\s*[-*•]\s+(.+)$").unwrap();
    static ref NUMBERED_LINE: Regex = Regex::new(r"(?m)^\s*\d+[.)]\s+(.+)$").unwrap();
}

/// Segment text into a TITLE / CONTENT / SUMMARY slide sequence and render
/// it. Returns the markup document and the structured deck; rendering is a
/// pure function of the inputs, so identical inputs give identical bytes.
pub fn generate_slides(
    text: &str,
    title: &str,
    subject: &str,
    chapter: &str,
) -> Result<(String, SlideDeck)> {
    generate_slides_with_cancel(text, title, subject, chapter, &CancelToken::new())
}

/// Same as `generate_slides` with a cancellation check between paragraphs.
pub fn generate_slides_with_cancel(
    text: &str,
    title: &str,
    subject: &str,
    chapter: &str,
    cancel: &CancelToken,
) -> Result<(String, SlideDeck)> {
    if text.trim().is_empty() {
        return Err(AnalysisError::Generation(
            "cannot generate slides from empty text".to_string(),
        ));
    }

    let mut slides = Vec::new();
    slides.push(Slide {
        number: 0,
        title: title.to_string(),
        content: String::new(),
        slide_type: SlideType::Title,
        bullet_points: None,
        order: 0,
    });

    let paragraphs: Vec<&str> = PARAGRAPH_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|p| p.len() > MIN_PARAGRAPH_CHARS)
        .collect();

    for (index, paragraph) in paragraphs.iter().enumerate() {
        cancel.check()?;
        let section_title = format!("Section {}", index + 1);

        if paragraph.len() > LONG_PARAGRAPH_CHARS {
            let sentences: Vec<&str> = SENTENCE_SPLIT
                .split(paragraph)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            for chunk in sentences.chunks(SENTENCES_PER_SLIDE) {
                slides.push(Slide {
                    number: 0,
                    title: section_title.clone(),
                    content: format!("{}.", chunk.join(". ")),
                    slide_type: SlideType::Content,
                    bullet_points: None,
                    order: 0,
                });
            }
        } else {
            let bullets = extract_bullet_points(paragraph);
            if bullets.is_empty() {
                slides.push(Slide {
                    number: 0,
                    title: section_title,
                    content: paragraph.to_string(),
                    slide_type: SlideType::Content,
                    bullet_points: None,
                    order: 0,
                });
            } else {
                slides.push(Slide {
                    number: 0,
                    title: section_title,
                    content: String::new(),
                    slide_type: SlideType::BulletPoints,
                    bullet_points: Some(bullets),
                    order: 0,
                });
            }
        }
    }

    slides.push(Slide {
        number: 0,
        title: "Summary".to_string(),
        content: format!("Key points from {chapter}"),
        slide_type: SlideType::Summary,
        bullet_points: Some(extract_key_points(text)),
        order: 0,
    });

    let mut deck = SlideDeck {
        title: title.to_string(),
        subject: subject.to_string(),
        chapter: chapter.to_string(),
        slides,
    };
    deck.renumber();

    let html = deck.to_html();
    Ok((html, deck))
}

/// Pull `- * •` bullets and `N.`/`N)` numbered lines out of a paragraph.
fn extract_bullet_points(paragraph: &str) -> Vec<String> {
    let mut bullets = Vec::new();
    for caps in BULLET_LINE.captures_iter(paragraph) {
        bullets.push(caps[1].trim().to_string());
    }
    for caps in NUMBERED_LINE.captures_iter(paragraph) {
        bullets.push(caps[1].trim().to_string());
    }
    bullets.truncate(MAX_BULLET_POINTS);
    bullets
}

/// Sentences of middling length that mention an importance keyword, capped.
fn extract_key_points(text: &str) -> Vec<String> {
    SENTENCE_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|s| {
            s.len() > SUMMARY_SENTENCE_MIN_CHARS && s.len() < SUMMARY_SENTENCE_MAX_CHARS
        })
        .filter(|s| {
            let lower = s.to_lowercase();
            IMPORTANCE_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .take(SUMMARY_MAX_POINTS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_paragraph() -> String {
        // 9 sentences, > 500 chars, one paragraph
        (1..=9)
            .map(|i| format!("Sentence number {i} talks at length about conservation of energy"))
            .collect::<Vec<_>>()
            .join(". ")
            + "."
    }

    fn sample_slide(title: &str) -> Slide {
        Slide {
            number: 0,
            title: title.to_string(),
            content: String::new(),
            slide_type: SlideType::Content,
            bullet_points: None,
            order: 0,
        }
    }

    #[test]
    fn test_long_paragraph_chunked_into_three_content_slides() {
        let text = long_paragraph();
        assert!(text.len() > LONG_PARAGRAPH_CHARS);

        let (_, deck) = generate_slides(&text, "Energy", "Physics", "Work and Energy").unwrap();
        assert_eq!(deck.slides.len(), 5);

        assert_eq!(deck.slides[0].slide_type, SlideType::Title);
        for slide in &deck.slides[1..4] {
            assert_eq!(slide.slide_type, SlideType::Content);
            assert_eq!(slide.title, "Section 1");
        }
        assert_eq!(deck.slides[4].slide_type, SlideType::Summary);

        let numbers: Vec<u32> = deck.slides.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        let orders: Vec<u32> = deck.slides.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_short_paragraphs_are_skipped() {
        let text = "too short\n\nThis paragraph is comfortably longer than fifty characters in total.";
        let (_, deck) = generate_slides(text, "T", "S", "C").unwrap();
        // title + one content + summary
        assert_eq!(deck.slides.len(), 3);
    }

    #[test]
    fn test_bullet_paragraph_becomes_bullet_slide() {
        let text = "- energy cannot be created\n- energy cannot be destroyed\n- it only changes form";
        let (_, deck) = generate_slides(text, "T", "S", "C").unwrap();

        let bullets = deck
            .slides
            .iter()
            .find(|s| s.slide_type == SlideType::BulletPoints)
            .expect("bullet slide present");
        assert!(bullets.content.is_empty());
        assert_eq!(bullets.bullet_points.as_ref().unwrap().len(), 3);
        assert_eq!(bullets.bullet_points.as_ref().unwrap()[0], "energy cannot be created");
    }

    #[test]
    fn test_numbered_lines_count_as_bullets() {
        let text = "1. first law of motion applies\n2) second law of motion applies here too";
        let bullets = extract_bullet_points(text);
        assert_eq!(bullets.len(), 2);
    }

    #[test]
    fn test_summary_collects_importance_sentences() {
        let text = "The key idea is that energy is always conserved overall. \
            Plain filler sentence without any marker words inside it. \
            It is important to track where the energy goes each time.";
        let (_, deck) = generate_slides(text, "T", "S", "Energy").unwrap();

        let summary = deck.slides.last().unwrap();
        assert_eq!(summary.slide_type, SlideType::Summary);
        assert_eq!(summary.content, "Key points from Energy");
        let points = summary.bullet_points.as_ref().unwrap();
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| {
            let lower = p.to_lowercase();
            lower.contains("key") || lower.contains("important")
        }));
    }

    #[test]
    fn test_summary_slide_present_even_without_key_points() {
        let text = "A perfectly ordinary paragraph that never uses any marker words at all, \
            but is long enough to produce one content slide.";
        let (_, deck) = generate_slides(text, "T", "S", "C").unwrap();
        let summary = deck.slides.last().unwrap();
        assert_eq!(summary.slide_type, SlideType::Summary);
        assert!(summary.bullet_points.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_empty_text_is_generation_error() {
        assert!(matches!(
            generate_slides("", "T", "S", "C"),
            Err(AnalysisError::Generation(_))
        ));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let text = long_paragraph();
        let (first, _) = generate_slides(&text, "Energy", "Physics", "Ch 5").unwrap();
        let (second, _) = generate_slides(&text, "Energy", "Physics", "Ch 5").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_insert_remove_move_keep_numbering_contiguous() {
        let (_, mut deck) = generate_slides(&long_paragraph(), "T", "S", "C").unwrap();

        deck.insert_slide(2, sample_slide("inserted"));
        assert_eq!(deck.slides[2].title, "inserted");
        assert_numbering_contiguous(&deck);

        let removed = deck.remove_slide(0).unwrap();
        assert_eq!(removed.slide_type, SlideType::Title);
        assert_numbering_contiguous(&deck);

        assert!(deck.move_slide(0, deck.slides.len() - 1));
        assert_numbering_contiguous(&deck);

        // Out-of-bounds operations are rejected without disturbing the deck
        assert!(!deck.move_slide(0, 99));
        assert!(deck.remove_slide(99).is_none());
        assert_numbering_contiguous(&deck);
    }

    #[test]
    fn test_insert_index_clamped_to_deck_length() {
        let (_, mut deck) = generate_slides(&long_paragraph(), "T", "S", "C").unwrap();
        deck.insert_slide(999, sample_slide("appended"));
        assert_eq!(deck.slides.last().unwrap().title, "appended");
        assert_numbering_contiguous(&deck);
    }

    #[test]
    fn test_deck_serde_round_trip() {
        let (_, deck) = generate_slides(&long_paragraph(), "T", "S", "C").unwrap();
        let json = serde_json::to_string(&deck).unwrap();
        let back: SlideDeck = serde_json::from_str(&json).unwrap();
        assert_eq!(back, deck);
    }

    #[test]
    fn test_cancellation_between_paragraphs() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result =
            generate_slides_with_cancel(&long_paragraph(), "T", "S", "C", &cancel);
        assert!(matches!(result, Err(AnalysisError::Cancelled)));
    }

    fn assert_numbering_contiguous(deck: &SlideDeck) {
        for (i, slide) in deck.slides.iter().enumerate() {
            assert_eq!(slide.number, i as u32 + 1);
            assert_eq!(slide.order, i as u32 + 1);
        }
    }
}
