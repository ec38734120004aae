use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

/// Error taxonomy for the analysis pipeline.
///
/// Every variant is recoverable: callers fall back to other detection paths
/// (`IndexNotFound`), retry with different page ranges (`Extraction`), or show
/// an empty-result state (`Generation`). Store failures never appear here --
/// they degrade to a cache miss inside `content_cache`.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No contents/index-like page was found in the scanned prefix.
    #[error("no index/contents page found: {0}")]
    IndexNotFound(String),

    /// A page-range slice produced no text even after clamping.
    #[error("content extraction failed: {0}")]
    Extraction(String),

    /// MCQ or slide generation was given unusable input.
    #[error("generation failed: {0}")]
    Generation(String),

    /// The operation observed a cancelled token between iterations.
    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Cooperative cancellation flag shared between a caller and a running
/// analysis pass. Checks happen between page/paragraph iterations, so a
/// cancelled operation returns `AnalysisError::Cancelled` rather than a
/// partial result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; all clones observe it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Return `Err(Cancelled)` if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }
}
