use crate::crawler::DedupRegistry;
use crate::state::ArticleRecord;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Per-run aggregate for one category harvest
///
/// The session owns the set of claimed URLs (through its `DedupRegistry`)
/// and the ordered list of collected records. Fetch tasks only see a clone
/// of the registry handle and the cancellation token; records are appended
/// by the orchestrator alone.
#[derive(Debug)]
pub struct CrawlSession {
    category: String,
    started_at: DateTime<Utc>,
    registry: Arc<DedupRegistry>,
    collected: Vec<ArticleRecord>,
    cancel: CancellationToken,
}

impl CrawlSession {
    /// Starts a fresh session for `category`
    pub fn new(category: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            category: category.into(),
            started_at: Utc::now(),
            registry: Arc::new(DedupRegistry::new()),
            collected: Vec::new(),
            cancel,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Shared handle to the URL claim registry
    pub fn registry(&self) -> &Arc<DedupRegistry> {
        &self.registry
    }

    /// The cancellation token observed at every checkpoint
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns false once cancellation has been requested
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Appends the records of one aggregation round
    pub fn append(&mut self, records: impl IntoIterator<Item = ArticleRecord>) {
        self.collected.extend(records);
    }

    pub fn collected(&self) -> &[ArticleRecord] {
        &self.collected
    }

    /// Consumes the session, returning the collected records
    pub fn into_records(self) -> Vec<ArticleRecord> {
        self.collected
    }
}
