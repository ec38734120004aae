/// Textbook Analyzer - heuristic analysis of page-indexed textbook text
/// Parses tables of contents, detects sections, and generates MCQs and slide decks

pub mod content_cache;
pub mod error;
pub mod index_parser;
pub mod mcq_generator;
pub mod page_map;
pub mod section_detector;
pub mod slide_generator;
pub mod slide_template;

/// Re-export error handling
pub use error::{AnalysisError, CancelToken, Result};

/// Re-export the page-indexed text model
pub use page_map::{clean_extracted_text, FullText, PageTextMap};

/// Re-export index parsing
pub use index_parser::{
    parse_index,
    parse_index_with_cancel,
    Chapter,
    DocumentIndex,
    SubTopic,
    Topic,
};

/// Re-export flat section detection
pub use section_detector::{
    detect_sections,
    detect_sections_with_cancel,
    ContentSection,
    SectionType,
};

/// Re-export cached content extraction
pub use content_cache::{
    cache_key,
    extract_content,
    refresh_content,
    CachedContent,
    ContentStore,
    InMemoryStore,
};

/// Re-export MCQ generation
pub use mcq_generator::{
    generate_mcqs,
    generate_mcqs_with_rng,
    to_question_record,
    Difficulty,
    GeneratedMcq,
    QuestionRecord,
};

/// Re-export slide deck generation
pub use slide_generator::{
    generate_slides,
    generate_slides_with_cancel,
    Slide,
    SlideDeck,
    SlideType,
};

/// Re-export deck rendering
pub use slide_template::render_deck;
