//! In-memory sink

use crate::output::traits::{ArticleDocument, OutputError, OutputResult, ResultSink};
use std::sync::Mutex;

/// Keeps the flushed document in memory instead of writing it anywhere
///
/// Used by library callers that post-process records themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    document: Mutex<Option<ArticleDocument>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the flushed document, if any
    pub fn document(&self) -> Option<ArticleDocument> {
        self.document
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ResultSink for MemorySink {
    fn flush(&self, document: &ArticleDocument) -> OutputResult<()> {
        let mut slot = self.document.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return Err(OutputError::AlreadyFlushed);
        }
        *slot = Some(document.clone());
        Ok(())
    }
}
