//! Deck rendering. The markup shape is a contract with downstream display
//! code: one `div.slide` per slide, the title slide carries `h1`/`h2`/`h3`
//! for title/subject/chapter, content slides carry an `h2.slide-heading` and
//! a `div.slide-content`, bullet lists render as `ul.bullet-list`.

use crate::slide_generator::{Slide, SlideDeck, SlideType};

const DECK_CSS: &str = r#"        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: 'Segoe UI', Arial, sans-serif;
            background: #1a1a2e;
            color: #eaeaea;
        }
        .slide {
            width: 100vw;
            height: 100vh;
            display: none;
            flex-direction: column;
            justify-content: center;
            align-items: center;
            padding: 60px 80px;
            text-align: center;
        }
        .slide.active { display: flex; }
        .title-slide h1 { font-size: 3em; color: #e94560; margin-bottom: 24px; }
        .title-slide h2 { font-size: 1.8em; color: #0f3460; margin-bottom: 12px; }
        .title-slide h3 { font-size: 1.3em; color: #aaaaaa; }
        .slide-heading { font-size: 2.2em; color: #e94560; margin-bottom: 32px; }
        .slide-content { font-size: 1.4em; line-height: 1.6; max-width: 900px; }
        .bullet-list { text-align: left; list-style-position: inside; }
        .bullet-list li { margin: 12px 0; }
        .slide-counter {
            position: fixed;
            bottom: 20px;
            right: 30px;
            font-size: 0.9em;
            color: #888888;
        }"#;

const DECK_JS: &str = r#"        let current = 0;
        const slides = document.querySelectorAll('.slide');
        const counter = document.getElementById('slide-counter');

        function show(index) {
            slides[current].classList.remove('active');
            current = (index + slides.length) % slides.length;
            slides[current].classList.add('active');
            counter.textContent = (current + 1) + ' / ' + slides.length;
        }

        document.addEventListener('keydown', (event) => {
            if (event.key === 'ArrowRight' || event.key === ' ') show(current + 1);
            if (event.key === 'ArrowLeft') show(current - 1);
            if (event.key === 'Home') show(0);
            if (event.key === 'End') show(slides.length - 1);
        });

        show(0);"#;

/// Render the whole deck as a self-contained document. Pure function of the
/// deck, so equal decks render to equal bytes.
pub fn render_deck(deck: &SlideDeck) -> String {
    let slides: Vec<String> = deck.slides.iter().map(|s| render_slide(deck, s)).collect();
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         <title>{title}</title>\n\
         <style>\n{css}\n</style>\n\
         </head>\n\
         <body>\n\
         {slides}\n\
         <div class=\"slide-counter\" id=\"slide-counter\"></div>\n\
         <script>\n{js}\n</script>\n\
         </body>\n\
         </html>\n",
        title = deck.title,
        css = DECK_CSS,
        slides = slides.join("\n"),
        js = DECK_JS,
    )
}

fn render_slide(deck: &SlideDeck, slide: &Slide) -> String {
    match slide.slide_type {
        SlideType::Title => render_title_slide(deck, slide),
        SlideType::Summary => render_summary_slide(slide),
        SlideType::Content | SlideType::BulletPoints | SlideType::Image => {
            render_content_slide(slide)
        }
    }
}

fn render_title_slide(deck: &SlideDeck, slide: &Slide) -> String {
    format!(
        "<div class=\"slide title-slide\">\n\
         <h1>{}</h1>\n\
         <h2>{}</h2>\n\
         <h3>{}</h3>\n\
         </div>",
        slide.title, deck.subject, deck.chapter,
    )
}

fn render_content_slide(slide: &Slide) -> String {
    format!(
        "<div class=\"slide content-slide\">\n\
         <h2 class=\"slide-heading\">{}</h2>\n\
         <div class=\"slide-content\">\n{}\n</div>\n\
         </div>",
        slide.title,
        render_slide_body(slide),
    )
}

fn render_summary_slide(slide: &Slide) -> String {
    format!(
        "<div class=\"slide summary-slide\">\n\
         <h2 class=\"slide-heading\">Summary</h2>\n\
         <div class=\"slide-content\">\n{}\n</div>\n\
         </div>",
        render_slide_body(slide),
    )
}

/// Paragraph text, then bullets when present. Slides with neither still get
/// an empty content block so the markup shape stays uniform.
fn render_slide_body(slide: &Slide) -> String {
    let mut body = String::new();
    if !slide.content.is_empty() {
        body.push_str(&format!("<p>{}</p>", slide.content));
    }
    if let Some(bullets) = &slide.bullet_points {
        if !bullets.is_empty() {
            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str("<ul class='bullet-list'>\n");
            for bullet in bullets {
                body.push_str(&format!("<li>{bullet}</li>\n"));
            }
            body.push_str("</ul>");
        }
    }
    body
}
