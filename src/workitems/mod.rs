use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Result, ScraperError, EXCEPTION_TYPE};
use crate::scraper::article::ArticleRecord;

fn default_max_results() -> usize {
    1
}

/// Payload of one input work item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkItemPayload {
    pub search_phrase: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    pub sort_by: String,
}

/// One unit of input in the queue-processing model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub payload: WorkItemPayload,
}

/// A line in the output file: an emitted article, an item outcome, or a
/// non-fatal error report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputLine {
    Output {
        id: Uuid,
        payload: ArticleRecord,
    },
    Done {
        item_id: Uuid,
        at: DateTime<Utc>,
    },
    Failed {
        item_id: Uuid,
        exception_type: String,
        code: String,
        message: String,
        at: DateTime<Utc>,
    },
    Error {
        item_id: Uuid,
        exception_type: String,
        code: String,
        message: String,
        at: DateTime<Utc>,
    },
}

/// Read the input work items from a JSON array file. A missing file is
/// an empty queue, not an error.
pub fn load_work_items(path: &Path) -> Result<Vec<WorkItem>> {
    if !path.exists() {
        warn!("Work item input file {:?} not found, nothing to process", path);
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let items: Vec<WorkItem> = serde_json::from_str(&content)
        .map_err(|e| ScraperError::DataProcessing(format!("Invalid work item file: {}", e)))?;
    info!("Loaded {} work item(s) from {:?}", items.len(), path);
    Ok(items)
}

/// Append-only writer for the output side of the queue. One JSON line
/// per event, in the order events happen.
pub struct WorkItemWriter {
    path: PathBuf,
}

impl WorkItemWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Emit one output work item carrying an extracted article.
    pub fn emit_output(&self, record: &ArticleRecord) -> Result<()> {
        self.append(&OutputLine::Output {
            id: Uuid::new_v4(),
            payload: record.clone(),
        })
    }

    pub fn mark_done(&self, item_id: Uuid) -> Result<()> {
        self.append(&OutputLine::Done {
            item_id,
            at: Utc::now(),
        })
    }

    /// Fail the current item with its typed code. The run continues with
    /// the next item.
    pub fn report_failure(&self, item_id: Uuid, err: &ScraperError) -> Result<()> {
        self.append(&OutputLine::Failed {
            item_id,
            exception_type: EXCEPTION_TYPE.to_string(),
            code: err.code().to_string(),
            message: err.to_string(),
            at: Utc::now(),
        })
    }

    /// Report a non-fatal error (per-entry processing, image download)
    /// without changing the item's outcome.
    pub fn report_error(&self, item_id: Uuid, err: &ScraperError) -> Result<()> {
        self.append(&OutputLine::Error {
            item_id,
            exception_type: EXCEPTION_TYPE.to_string(),
            code: err.code().to_string(),
            message: err.to_string(),
            at: Utc::now(),
        })
    }

    fn append(&self, line: &OutputLine) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let json = serde_json::to_string(line)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }

    /// Read back every line written so far, in order.
    pub fn read_lines(&self) -> Result<Vec<OutputLine>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l)
                    .map_err(|e| ScraperError::DataProcessing(format!("Corrupt output line: {}", e)))
            })
            .collect()
    }
}
