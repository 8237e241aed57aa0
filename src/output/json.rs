//! JSON file sink

use crate::output::traits::{ArticleDocument, OutputError, OutputResult, ResultSink};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

const PROBE_FILE: &str = ".tag-harvest-probe";

/// Writes the document as pretty-printed JSON to a single file
///
/// The file is written at most once per sink; a second flush is rejected
/// with `OutputError::AlreadyFlushed`. The document goes to a sibling
/// `.tmp` file first and is renamed into place, so a failed flush never
/// leaves a partial document at the target path.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    flushed: AtomicBool,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            flushed: AtomicBool::new(false),
        }
    }

    /// Creates a sink for one category run inside `directory`
    ///
    /// The file is named `{category}_news_{YYYYmmdd_HHMMSS}.json` after the
    /// run's start time.
    pub fn for_run(directory: impl AsRef<Path>, category: &str, started_at: DateTime<Utc>) -> Self {
        Self::new(directory.as_ref().join(output_filename(category, started_at)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl ResultSink for JsonFileSink {
    fn prepare(&self) -> OutputResult<()> {
        let directory = self.directory();
        let not_writable = |source: std::io::Error| OutputError::NotWritable {
            path: directory.to_path_buf(),
            source,
        };

        fs::create_dir_all(directory).map_err(not_writable)?;

        let probe = directory.join(PROBE_FILE);
        File::create(&probe).map_err(not_writable)?;
        let _ = fs::remove_file(&probe);

        tracing::debug!("Output directory {} is writable", directory.display());
        Ok(())
    }

    fn flush(&self, document: &ArticleDocument) -> OutputResult<()> {
        if self.flushed.swap(true, Ordering::SeqCst) {
            return Err(OutputError::AlreadyFlushed);
        }

        let temp = self.temp_path();
        let written = write_document(&temp, document)
            .and_then(|()| fs::rename(&temp, &self.path).map_err(OutputError::from));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }

        tracing::info!(
            "Wrote {} articles to {}",
            document.total_articles,
            self.path.display()
        );
        Ok(())
    }
}

fn write_document(path: &Path, document: &ArticleDocument) -> OutputResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// Builds the output file name for a category run
pub fn output_filename(category: &str, started_at: DateTime<Utc>) -> String {
    let category: String = category
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "{}_news_{}.json",
        category,
        started_at.format("%Y%m%d_%H%M%S")
    )
}
