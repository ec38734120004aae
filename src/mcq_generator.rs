use std::collections::HashSet;

use lazy_static::lazy_static;
use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A heuristically synthesized multiple-choice question.
/// `correct_answer` indexes into `options`; options are pairwise distinct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMcq {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: Option<String>,
}

/// Persistable question-bank record built from a generated MCQ plus the
/// caller's subject/class/chapter metadata. The surrounding application hands
/// this to its document store; the shape here is just serde-serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub content: String,
    pub question_type: String,
    pub subject: String,
    pub class_level: u32,
    pub chapter: String,
    pub difficulty: Difficulty,
    pub source_details: String,
    pub answer: String,
    pub options: Vec<String>,
    pub created_by: String,
}

/// Sentences shorter/longer than this are ignored as question material.
const SENTENCE_MIN_CHARS: usize = 20;
const SENTENCE_MAX_CHARS: usize = 200;
const CONCEPT_CAP: usize = 20;
const OPTION_MAX_CHARS: usize = 100;
const FALLBACK_OPTION_MAX_CHARS: usize = 120;
const DISTRACTOR_COUNT: usize = 3;

/// Filler distractors used when too few unrelated sentences exist. Distinct
/// strings, consumed in order, so options stay pairwise unique.
const FILLER_OPTIONS: &[&str] = &[
    "This is not mentioned in the text.",
    "None of these statements appears in the text.",
    "The text does not make this claim.",
];

lazy_static! {
    static ref SENTENCE_SPLIT: Regex = Regex::new(r"[.!?]+").unwrap();
    static ref NUMBERED_FRAGMENT: Regex = Regex::new(r"^\d+[.)]\s*$").unwrap();
    /// "X is/are/refers to/means/defined as Y" definitions.
    static ref DEFINITION: Regex = Regex::new(
        r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\s+(?:is|are|refers to|means|defined as)\s+(.+?)(?:[.,\n]|$)"
    )
    .unwrap();
    /// Capitalized 1-3 word phrases treated as bare concepts.
    static ref TERM: Regex = Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,2})\b").unwrap();
}

/// Determiners and structural words that disqualify a term.
const TERM_STOP_WORDS: &[&str] = &[
    "The", "This", "That", "These", "Those", "Chapter", "Unit", "Page",
];

/// Generate up to `number_of_questions` MCQs from a block of text.
///
/// Fails only on empty input. Text with no usable concepts or sentences
/// yields an empty list, not an error.
pub fn generate_mcqs(
    text: &str,
    number_of_questions: usize,
    difficulty: Difficulty,
) -> Result<Vec<GeneratedMcq>> {
    generate_mcqs_with_rng(text, number_of_questions, difficulty, &mut rand::thread_rng())
}

/// Same as `generate_mcqs` with an injected RNG for deterministic tests.
pub fn generate_mcqs_with_rng<R: Rng>(
    text: &str,
    number_of_questions: usize,
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<Vec<GeneratedMcq>> {
    if text.trim().is_empty() {
        return Err(AnalysisError::Generation(
            "cannot generate MCQs from empty text".to_string(),
        ));
    }

    let sentences = extract_sentences(text);
    let concepts = extract_key_concepts(text);

    let mut mcqs = Vec::new();
    for concept in concepts.iter().take(number_of_questions) {
        mcqs.push(mcq_from_concept(concept, &sentences, difficulty, rng));
    }

    // Not enough concepts: fall back to sentence questions, consuming each
    // sentence at most once so the loop always terminates.
    let mut pool = sentences.clone();
    while mcqs.len() < number_of_questions && !pool.is_empty() {
        let picked = pool.swap_remove(rng.gen_range(0..pool.len()));
        mcqs.push(mcq_from_sentence(&picked, &sentences, rng));
    }

    mcqs.truncate(number_of_questions);
    Ok(mcqs)
}

/// Convert a generated MCQ into a persistable question-bank record.
pub fn to_question_record(
    mcq: &GeneratedMcq,
    subject: &str,
    class_level: u32,
    chapter: Option<&str>,
    difficulty: Difficulty,
    source_id: &str,
    created_by: &str,
) -> QuestionRecord {
    QuestionRecord {
        content: mcq.question.clone(),
        question_type: "MCQ".to_string(),
        subject: subject.to_string(),
        class_level,
        chapter: chapter.unwrap_or("").to_string(),
        difficulty,
        source_details: format!("generated from content: {source_id}"),
        answer: mcq
            .options
            .get(mcq.correct_answer)
            .cloned()
            .unwrap_or_default(),
        options: mcq.options.clone(),
        created_by: created_by.to_string(),
    }
}

/// Split into trimmed sentences of reasonable length, dropping bare
/// numbered-list fragments.
fn extract_sentences(text: &str) -> Vec<String> {
    SENTENCE_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|s| s.len() > SENTENCE_MIN_CHARS && s.len() < SENTENCE_MAX_CHARS)
        .filter(|s| !NUMBERED_FRAGMENT.is_match(s))
        .map(str::to_string)
        .collect()
}

/// Extract "Term: definition" concept strings plus bare capitalized terms,
/// order-preserving, deduplicated, capped.
fn extract_key_concepts(text: &str) -> Vec<String> {
    let mut concepts = Vec::new();
    let mut seen = HashSet::new();

    for caps in DEFINITION.captures_iter(text) {
        let concept = format!("{}: {}", caps[1].trim(), caps[2].trim());
        if seen.insert(concept.clone()) {
            concepts.push(concept);
        }
    }

    for caps in TERM.captures_iter(text) {
        let term = caps[1].trim();
        let first_word = term.split_whitespace().next().unwrap_or("");
        if term.len() > 3 && !TERM_STOP_WORDS.contains(&first_word) && seen.insert(term.to_string())
        {
            concepts.push(term.to_string());
        }
    }

    concepts.truncate(CONCEPT_CAP);
    concepts
}

fn mcq_from_concept<R: Rng>(
    concept: &str,
    sentences: &[String],
    difficulty: Difficulty,
    rng: &mut R,
) -> GeneratedMcq {
    let (term, definition) = match concept.split_once(':') {
        Some((t, d)) => (t.trim(), d.trim()),
        None => (concept, ""),
    };

    let question = match difficulty {
        Difficulty::Easy => format!("What is {term}?"),
        Difficulty::Medium => format!("Which of the following best describes {term}?"),
        Difficulty::Hard => {
            format!("What is the significance of {term} in the context of this chapter?")
        }
    };

    let correct = if !definition.is_empty() {
        take_chars(definition, OPTION_MAX_CHARS)
    } else {
        sentences
            .iter()
            .find(|s| contains_ignore_case(s, term))
            .map(|s| take_chars(s, OPTION_MAX_CHARS))
            .unwrap_or_else(|| "The correct answer".to_string())
    };

    let candidates: Vec<String> = sentences
        .iter()
        .filter(|s| !contains_ignore_case(s, term))
        .map(|s| take_chars(s, OPTION_MAX_CHARS))
        .collect();
    let distractors = pick_distractors(candidates, &correct, rng);

    assemble(question, correct, distractors, rng, format!("Based on the concept: {concept}"))
}

fn mcq_from_sentence<R: Rng>(sentence: &str, sentences: &[String], rng: &mut R) -> GeneratedMcq {
    let correct = take_chars(sentence, FALLBACK_OPTION_MAX_CHARS);
    let candidates: Vec<String> = sentences
        .iter()
        .filter(|s| s.as_str() != sentence)
        .map(|s| take_chars(s, FALLBACK_OPTION_MAX_CHARS))
        .collect();
    let distractors = pick_distractors(candidates, &correct, rng);

    assemble(
        "According to the text, which statement is correct?".to_string(),
        correct,
        distractors,
        rng,
        "This is directly stated in the text.".to_string(),
    )
}

/// Choose three distractors, never textually equal to the correct option or
/// to each other; pad with fillers when sentences run out.
fn pick_distractors<R: Rng>(mut candidates: Vec<String>, correct: &str, rng: &mut R) -> Vec<String> {
    candidates.shuffle(rng);

    let mut distractors: Vec<String> = Vec::with_capacity(DISTRACTOR_COUNT);
    for candidate in candidates {
        if distractors.len() == DISTRACTOR_COUNT {
            break;
        }
        if candidate != correct && !distractors.contains(&candidate) {
            distractors.push(candidate);
        }
    }

    let mut fillers = FILLER_OPTIONS.iter();
    while distractors.len() < DISTRACTOR_COUNT {
        match fillers.next() {
            Some(filler) if *filler != correct && !distractors.iter().any(|d| d == filler) => {
                distractors.push(filler.to_string());
            }
            Some(_) => {}
            None => break,
        }
    }

    distractors
}

/// Shuffle options and recompute the correct index from the shuffled order.
fn assemble<R: Rng>(
    question: String,
    correct: String,
    distractors: Vec<String>,
    rng: &mut R,
    explanation: String,
) -> GeneratedMcq {
    let mut options = Vec::with_capacity(1 + distractors.len());
    options.push(correct.clone());
    options.extend(distractors);
    options.shuffle(rng);

    let correct_answer = options
        .iter()
        .position(|o| *o == correct)
        .unwrap_or_default();

    GeneratedMcq {
        question,
        options,
        correct_answer,
        explanation: Some(explanation),
    }
}

fn take_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
