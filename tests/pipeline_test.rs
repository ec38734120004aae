use rand::rngs::StdRng;
use rand::SeedableRng;

use textbook_analyzer::{
    detect_sections, extract_content, generate_mcqs_with_rng, generate_slides, parse_index,
    Difficulty, InMemoryStore, PageTextMap, SectionType, SlideType,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Small synthetic textbook: an index page followed by content pages.
fn sample_textbook() -> PageTextMap {
    PageTextMap::from_pages(vec![
        (
            1,
            "Contents\n\n1. Motion 2\n1.1 Speed and Velocity 3\n2. Force and Laws 5\n\nPage"
                .to_string(),
        ),
        (
            2,
            "1.1 Speed and Velocity\n\nVelocity is the rate of change of displacement of a body. \
             The main idea is that speed only measures how fast a body moves. \
             Acceleration is the rate of change of velocity over time."
                .to_string(),
        ),
        (
            3,
            "A force changes the state of motion of a body. It is important to remember that \
             every force has a direction and a magnitude. Friction is the force that opposes \
             relative motion between surfaces."
                .to_string(),
        ),
        (
            4,
            "Exercise 1: Practice questions.\n\n1. Define velocity in your own words.\n\
             2. State the main difference between speed and velocity."
                .to_string(),
        ),
        (5, "2. Force and Laws\n\nA body at rest stays at rest.".to_string()),
        (6, "More notes on balanced and unbalanced forces.".to_string()),
        (7, "Worked examples on the laws of motion.".to_string()),
        (8, "End of chapter material and references.".to_string()),
    ])
}

#[test]
fn test_index_parsing_on_sample_textbook() {
    init_logging();
    let map = sample_textbook();

    let index = parse_index(&map, "physics9").unwrap();
    assert_eq!(index.document_id, "physics9");
    assert_eq!(index.chapters.len(), 2);

    let motion = &index.chapters[0];
    assert_eq!(motion.name, "Motion");
    assert_eq!((motion.start_page, motion.end_page), (2, 4));
    assert_eq!(motion.topics.len(), 1);
    assert_eq!(motion.topics[0].name, "Speed and Velocity");
    assert_eq!((motion.topics[0].start_page, motion.topics[0].end_page), (3, 4));

    let force = &index.chapters[1];
    assert_eq!(force.name, "Force and Laws");
    assert_eq!((force.start_page, force.end_page), (5, 8));
}

#[test]
fn test_section_detection_on_sample_textbook() {
    init_logging();
    let sections = detect_sections(&sample_textbook());

    // Sorted by start page
    for pair in sections.windows(2) {
        assert!(pair[0].start_page <= pair[1].start_page);
    }

    let subtopic = sections
        .iter()
        .find(|s| s.section_type == SectionType::Subtopic && s.start_page == 2)
        .expect("subtopic heading on page 2");
    assert!(subtopic.title.contains("Speed and Velocity"));
    assert_eq!(subtopic.end_page, 6);

    let exercise = sections
        .iter()
        .find(|s| s.section_type == SectionType::Exercise)
        .expect("exercise heading on page 4");
    assert_eq!(exercise.start_page, 4);
    assert_eq!(exercise.end_page, 8);
}

#[test]
fn test_extraction_is_cached_across_calls() {
    init_logging();
    let map = sample_textbook();
    let store = InMemoryStore::new();

    let text = extract_content("physics9", "Motion", None, None, 2, 4, &map, &store).unwrap();
    assert!(text.contains("Velocity is the rate of change"));
    assert!(text.contains("Exercise 1"));
    assert_eq!(store.len(), 1);

    // The second call must be served from the store: extraction against an
    // empty page map would fail.
    let empty = PageTextMap::new();
    let again = extract_content("physics9", "Motion", None, None, 2, 4, &empty, &store).unwrap();
    assert_eq!(again, text);
}

#[test]
fn test_mcq_generation_from_extracted_content() {
    init_logging();
    let map = sample_textbook();
    let store = InMemoryStore::new();
    let text = extract_content("physics9", "Motion", None, None, 2, 4, &map, &store).unwrap();

    let mut rng = StdRng::seed_from_u64(11);
    let mcqs = generate_mcqs_with_rng(&text, 5, Difficulty::Easy, &mut rng).unwrap();
    assert_eq!(mcqs.len(), 5);

    for mcq in &mcqs {
        assert_eq!(mcq.options.len(), 4);
        assert!(mcq.correct_answer < 4);
        let distinct: std::collections::HashSet<&String> = mcq.options.iter().collect();
        assert_eq!(distinct.len(), 4);
    }
}

#[test]
fn test_slide_generation_from_extracted_content() {
    init_logging();
    let map = sample_textbook();
    let store = InMemoryStore::new();
    let text = extract_content("physics9", "Motion", None, None, 2, 4, &map, &store).unwrap();

    let (html, deck) = generate_slides(&text, "Motion", "Physics", "Chapter 1").unwrap();

    assert_eq!(deck.slides.first().unwrap().slide_type, SlideType::Title);
    assert_eq!(deck.slides.last().unwrap().slide_type, SlideType::Summary);
    for (i, slide) in deck.slides.iter().enumerate() {
        assert_eq!(slide.number, i as u32 + 1);
        assert_eq!(slide.order, i as u32 + 1);
    }

    // The exercise paragraph is a numbered list and becomes a bullet slide
    assert!(deck
        .slides
        .iter()
        .any(|s| s.slide_type == SlideType::BulletPoints));

    // Markup contract
    assert!(html.contains("<div class=\"slide title-slide\">"));
    assert!(html.contains("<h1>Motion</h1>"));
    assert!(html.contains("<h2>Physics</h2>"));
    assert!(html.contains("<h3>Chapter 1</h3>"));
    assert!(html.contains("<div class=\"slide summary-slide\">"));
    assert!(html.contains("<ul class='bullet-list'>"));
    assert_eq!(
        html.matches("<div class=\"slide ").count(),
        deck.slides.len()
    );
}
