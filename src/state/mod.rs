//! State module for tracking crawl progress
//!
//! This module provides the state owned by a single harvest run.
//!
//! # Components
//!
//! - `CrawlPhase`: The orchestrator's pagination state machine
//! - `StopReason`: Why a crawl reached its terminal phase
//! - `ArticleRecord`: One harvested article, possibly degraded
//! - `CrawlSession`: Per-run aggregate owning the seen set and collected records

mod phase;
mod record;
mod session;

// Re-export main types
pub use phase::{CrawlPhase, StopReason};
pub use record::ArticleRecord;
pub use session::CrawlSession;
