// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Append-only audit log stored as JSON lines.
//!
//! Each apply that changed something appends one [`HistoryRecord`] as a
//! single line. Records are never rewritten.

use crate::audit::HistoryRecord;
use crate::collaborators::HistoryStore;
use crate::errors::ZoneSyncError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// History store backed by a JSONL file.
#[derive(Debug)]
pub struct JsonlHistoryStore {
    path: PathBuf,
    // serializes appends from concurrent applies in one process
    write_lock: Mutex<()>,
}

impl JsonlHistoryStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every record, optionally only those of `zone`.
    ///
    /// A missing file is an empty history. Lines that fail to parse are
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSyncError::History`] when the file exists but cannot be read.
    pub async fn load(&self, zone: Option<&str>) -> Result<Vec<HistoryRecord>, ZoneSyncError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ZoneSyncError::History {
                    reason: format!("reading {}: {e}", self.path.display()),
                })
            }
        };

        let wanted = zone.map(|z| z.trim_end_matches('.'));
        let mut records = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryRecord>(line) {
                Ok(record) => {
                    if wanted.map_or(true, |z| record.zone.trim_end_matches('.') == z) {
                        records.push(record);
                    }
                }
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping unreadable history line"
                ),
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl HistoryStore for JsonlHistoryStore {
    async fn persist_history(&self, record: &HistoryRecord) -> Result<(), ZoneSyncError> {
        let mut line = serde_json::to_string(record).map_err(|e| ZoneSyncError::History {
            reason: format!("encoding history record: {e}"),
        })?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ZoneSyncError::History {
                reason: format!("opening {}: {e}", self.path.display()),
            })?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| ZoneSyncError::History {
                reason: format!("writing {}: {e}", self.path.display()),
            })?;
        file.flush().await.map_err(|e| ZoneSyncError::History {
            reason: format!("flushing {}: {e}", self.path.display()),
        })?;

        debug!(zone = %record.zone, path = %self.path.display(), "History record appended");
        Ok(())
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod history_tests;
