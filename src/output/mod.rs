//! Output module for persisting harvested articles
//!
//! This module handles:
//! - The `ResultSink` trait and the JSON document shape
//! - Writing the document to a timestamped file
//! - Recording and printing run statistics

mod json;
mod memory;
pub mod stats;
mod traits;

pub use json::{output_filename, JsonFileSink};
pub use memory::MemorySink;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{ArticleDocument, OutputError, OutputResult, ResultSink};
