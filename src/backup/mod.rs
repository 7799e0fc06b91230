//! Snapshot history of the primary file.
//!
//! Snapshots are verbatim copies named by local wall-clock minute. They are
//! never pruned. A second snapshot in the same minute overwrites the first.

pub mod name;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::error::{DbError, Result};
use crate::models::BackupInfo;
use crate::store::writer;

use name::NamePattern;

/// Takes, lists and restores snapshots of one primary file.
#[derive(Debug, Clone)]
pub struct BackupManager {
    source: PathBuf,
    history_dir: PathBuf,
    pattern: NamePattern,
}

impl BackupManager {
    pub fn new(source: impl Into<PathBuf>, history_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            source: source.into(),
            history_dir: history_dir.into(),
            pattern: NamePattern::new()?,
        })
    }

    #[must_use]
    pub fn history_dir(&self) -> &Path {
        &self.history_dir
    }

    /// Copy the primary file into the history directory under the current minute.
    pub fn snapshot(&self) -> Result<PathBuf> {
        self.snapshot_at(Local::now().naive_local())
    }

    /// Copy the primary file into the history directory under the minute of `at`.
    pub fn snapshot_at(&self, at: NaiveDateTime) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.history_dir)?;
        let target = self.history_dir.join(name::format_name(&at));
        std::fs::copy(&self.source, &target)?;
        tracing::info!(file = %target.display(), "backup created");
        Ok(target)
    }

    /// Take a snapshot whose failure is logged and dropped.
    ///
    /// Used after a mutation has already been committed; the caller's result
    /// must not depend on it.
    pub fn snapshot_best_effort(&self, reason: &str) {
        if let Err(e) = self.snapshot() {
            tracing::warn!(
                reason,
                source = %self.source.display(),
                history = %self.history_dir.display(),
                "failed to create backup: {e}"
            );
        }
    }

    /// All snapshots, newest first. Files not named like a snapshot are ignored.
    pub fn list(&self) -> Result<Vec<BackupInfo>> {
        let entries = match std::fs::read_dir(&self.history_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                std::fs::create_dir_all(&self.history_dir)?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut found: Vec<BackupInfo> = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(timestamp) = self.pattern.timestamp(file_name) else {
                continue;
            };
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            found.push(BackupInfo::new(
                file_name.to_string(),
                timestamp,
                metadata.len(),
            ));
        }

        found.sort_by(|a, b| b.filename.cmp(&a.filename));
        tracing::debug!(count = found.len(), "listed backups");
        Ok(found)
    }

    /// Overwrite the primary file with the named snapshot.
    ///
    /// The current state is snapshotted first. The named snapshot is read
    /// before that, so a same-minute collision cannot clobber what is restored.
    pub fn restore(&self, name: &str) -> Result<()> {
        if !self.pattern.is_match(name) {
            return Err(DbError::InvalidBackupName { name: name.into() });
        }

        let backup_path = self.history_dir.join(name);
        let bytes = match std::fs::read(&backup_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DbError::BackupNotFound { name: name.into() })
            }
            Err(e) => return Err(e.into()),
        };

        self.snapshot_best_effort("pre-restore");

        writer::write_atomic(&self.source, &bytes)?;
        tracing::info!(name, "backup restored");
        Ok(())
    }
}
