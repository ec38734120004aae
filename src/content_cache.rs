use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::page_map::PageTextMap;

/// Separates the four key fields. A control character keeps chapter/topic
/// names from colliding with the separator itself.
const KEY_SEPARATOR: char = '\u{1f}';

/// One memoized extraction. Created on first successful extraction for a key,
/// overwritten on explicit re-extraction, never mutated in place otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedContent {
    pub text: String,
    pub cached_at: DateTime<Utc>,
}

/// External key-value collaborator memoizing extracted text.
///
/// Errors on this boundary are opaque (`anyhow`) and never surfaced to
/// callers of `extract_content`: a failed read degrades to a cache miss, a
/// failed write is logged and swallowed.
pub trait ContentStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<CachedContent>>;
    fn put(&self, key: &str, content: CachedContent) -> anyhow::Result<()>;
}

/// Composite cache key over (document, chapter, topic, subtopic).
///
/// Missing topic/subtopic participate as empty strings rather than being
/// omitted, so all four positions are always present and two regions that
/// differ in any field get distinct keys.
pub fn cache_key(
    document_id: &str,
    chapter: &str,
    topic: Option<&str>,
    subtopic: Option<&str>,
) -> String {
    let mut key = String::with_capacity(
        document_id.len() + chapter.len() + 3,
    );
    key.push_str(document_id);
    key.push(KEY_SEPARATOR);
    key.push_str(chapter);
    key.push(KEY_SEPARATOR);
    key.push_str(topic.unwrap_or(""));
    key.push(KEY_SEPARATOR);
    key.push_str(subtopic.unwrap_or(""));
    key
}

/// In-process store, used directly in tests and as a default collaborator.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, CachedContent>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentStore for InMemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<CachedContent>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("store mutex poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, content: CachedContent) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("store mutex poisoned"))?;
        entries.insert(key.to_string(), content);
        Ok(())
    }
}

/// Return the text for a logical region, extracting from the page map only on
/// a cache miss.
///
/// Cache reads never trigger re-extraction on a hit; read failures fall
/// through to extraction, write failures are best-effort. `Extraction` is
/// returned only when the clamped page range covers no text at all.
pub fn extract_content(
    document_id: &str,
    chapter: &str,
    topic: Option<&str>,
    subtopic: Option<&str>,
    start_page: u32,
    end_page: u32,
    page_map: &PageTextMap,
    store: &dyn ContentStore,
) -> Result<String> {
    let key = cache_key(document_id, chapter, topic, subtopic);

    match store.get(&key) {
        Ok(Some(cached)) => return Ok(cached.text),
        Ok(None) => {}
        Err(err) => {
            log::warn!("content store read failed for {key:?}, falling back to extraction: {err}");
        }
    }

    extract_and_store(&key, start_page, end_page, page_map, store)
}

/// Re-extract unconditionally and overwrite the cached entry for this key.
pub fn refresh_content(
    document_id: &str,
    chapter: &str,
    topic: Option<&str>,
    subtopic: Option<&str>,
    start_page: u32,
    end_page: u32,
    page_map: &PageTextMap,
    store: &dyn ContentStore,
) -> Result<String> {
    let key = cache_key(document_id, chapter, topic, subtopic);
    extract_and_store(&key, start_page, end_page, page_map, store)
}

fn extract_and_store(
    key: &str,
    start_page: u32,
    end_page: u32,
    page_map: &PageTextMap,
    store: &dyn ContentStore,
) -> Result<String> {
    let text = page_map
        .extract_range(start_page, end_page)
        .ok_or_else(|| {
            AnalysisError::Extraction(format!(
                "pages {start_page}-{end_page} contain no text (document has {} pages)",
                page_map.total_pages()
            ))
        })?;

    let entry = CachedContent {
        text: text.clone(),
        cached_at: Utc::now(),
    };
    if let Err(err) = store.put(key, entry) {
        log::warn!("content store write failed for {key:?}, continuing uncached: {err}");
    }

    Ok(text)
}
