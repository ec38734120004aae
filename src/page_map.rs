use std::collections::BTreeMap;

/// Ordered page-number -> extracted-text mapping for one document.
///
/// Produced by an external PDF text-extraction collaborator; everything in
/// this crate consumes it read-only. Page numbers are 1-based and the total
/// page count is derived from the highest key present.
#[derive(Debug, Clone, Default)]
pub struct PageTextMap {
    pages: BTreeMap<u32, String>,
}

/// Concatenation of every page in page order, with enough bookkeeping to map
/// a character offset in the combined text back to the page it came from.
#[derive(Debug, Clone)]
pub struct FullText {
    pub text: String,
    /// (page number, byte offset where that page's text begins).
    starts: Vec<(u32, usize)>,
}

impl PageTextMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pages(pages: impl IntoIterator<Item = (u32, String)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
        }
    }

    pub fn insert_page(&mut self, page: u32, text: String) {
        self.pages.insert(page, text);
    }

    pub fn get(&self, page: u32) -> Option<&str> {
        self.pages.get(&page).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total page count, derived from the highest page number present.
    pub fn total_pages(&self) -> u32 {
        self.pages.keys().next_back().copied().unwrap_or(0)
    }

    /// Iterate pages in ascending page-number order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.pages.iter().map(|(p, t)| (*p, t.as_str()))
    }

    /// Concatenate all pages with a newline separator and record where each
    /// page begins, so match offsets can be resolved back to page numbers.
    pub fn full_text(&self) -> FullText {
        let mut text = String::new();
        let mut starts = Vec::with_capacity(self.pages.len());

        for (i, (page, page_text)) in self.pages.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            starts.push((*page, text.len()));
            text.push_str(page_text);
        }

        FullText { text, starts }
    }

    /// Slice the inclusive page range `[max(1, start), min(end, total)]`,
    /// joining present pages with a newline separator. Returns `None` when the
    /// clamped range covers no pages at all.
    pub fn extract_range(&self, start_page: u32, end_page: u32) -> Option<String> {
        let total = self.total_pages();
        if total == 0 {
            return None;
        }
        let start = start_page.max(1);
        let end = end_page.min(total);
        if start > end {
            return None;
        }

        let parts: Vec<&str> = self
            .pages
            .range(start..=end)
            .map(|(_, text)| text.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}

impl FullText {
    /// Resolve a byte offset in the combined text to the page that owns it.
    /// Page p owns `[start(p), start(p) + len(p) + 1)` -- the trailing
    /// separator counts towards the page before it.
    pub fn page_at(&self, offset: usize) -> u32 {
        let mut owner = self.starts.first().map(|(p, _)| *p).unwrap_or(1);
        for (page, start) in &self.starts {
            if *start <= offset {
                owner = *page;
            } else {
                break;
            }
        }
        owner
    }

    pub fn max_page(&self) -> u32 {
        self.starts.last().map(|(p, _)| *p).unwrap_or(0)
    }
}

/// Collapse runs of whitespace and excess blank lines in extracted text.
pub fn clean_extracted_text(text: &str) -> String {
    lazy_static::lazy_static! {
        static ref SPACES: regex::Regex = regex::Regex::new(r"[ \t]+").unwrap();
        static ref NEWLINES: regex::Regex = regex::Regex::new(r"\n{3,}").unwrap();
    }
    let collapsed = SPACES.replace_all(text, " ");
    NEWLINES.replace_all(&collapsed, "\n\n").trim().to_string()
}
