//! Append-only feedback log. Users react to a match report with approve or
//! deny; each reaction is one record keyed by the analysis match ID.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

const DEFAULT_FEEDBACK_FILE: &str = "match_feedback.json";

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("failed to access feedback log: {0}")]
    Io(#[from] std::io::Error),
    #[error("feedback log is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackRecord {
    pub match_id: String,
    pub user_id: String,
    pub approved: bool,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(match_id: impl Into<String>, user_id: impl Into<String>, approved: bool) -> Self {
        Self {
            match_id: match_id.into(),
            user_id: user_id.into(),
            approved,
            timestamp: Utc::now(),
        }
    }
}

/// JSON-array log on disk. Records are only ever appended.
pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log at the path named by `AM_FEEDBACK_LOG`, or the default file in
    /// the working directory.
    pub fn from_env() -> Self {
        let path = std::env::var("AM_FEEDBACK_LOG")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FEEDBACK_FILE.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records, oldest first. A missing file is an empty log.
    pub fn read_all(&self) -> Result<Vec<FeedbackRecord>, FeedbackError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    /// Append one record. The whole array is rewritten; the log is small
    /// and this keeps the file a single valid JSON document.
    pub fn append(&self, record: FeedbackRecord) -> Result<(), FeedbackError> {
        let mut records = self.read_all()?;
        records.push(record);
        let serialized = serde_json::to_string_pretty(&records)?;
        std::fs::write(&self.path, serialized)?;
        info!(path = %self.path.display(), total = records.len(), "feedback recorded");
        Ok(())
    }
}
