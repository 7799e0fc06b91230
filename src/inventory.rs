//! The device inventory: record store, snapshot history and the writer lock
//! that serialises every read-modify-write cycle between them.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backup::BackupManager;
use crate::config::Config;
use crate::error::{DbError, Result};
use crate::models::{BackupInfo, Record, RecordEntry};
use crate::store::RecordStore;

const PENDING: u8 = 0;
const STARTED: u8 = 1;
const ABANDONED: u8 = 2;

/// One-shot decision between a queued call and the caller waiting on it.
///
/// Whichever side moves first wins: once a call has started it runs to
/// completion, once it is abandoned it never touches the files.
#[derive(Debug, Clone, Default)]
pub struct CallGate(Arc<AtomicU8>);

impl CallGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the call for execution. False if it was abandoned first.
    pub fn start(&self) -> bool {
        self.transition(STARTED)
    }

    /// Give up on the call. False if it has already started.
    pub fn abandon(&self) -> bool {
        self.transition(ABANDONED)
    }

    fn transition(&self, to: u8) -> bool {
        self.0
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Shared entry point for the CLI and the HTTP server.
#[derive(Debug)]
pub struct Inventory {
    store: RecordStore,
    backups: BackupManager,
    lock: Mutex<()>,
}

/// Exclusive access to the inventory for as long as it is held.
#[derive(Debug)]
pub struct Session<'a> {
    inventory: &'a Inventory,
    _guard: MutexGuard<'a, ()>,
}

impl Inventory {
    /// Build an inventory from resolved configuration, creating the primary
    /// file and history directory if they are missing.
    pub fn open(config: &Config) -> Result<Self> {
        config.ensure_layout()?;
        Self::new(config)
    }

    /// Build an inventory without touching the filesystem.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            store: RecordStore::new(&config.db_path),
            backups: BackupManager::new(&config.db_path, &config.history_dir)?,
            lock: Mutex::new(()),
        })
    }

    /// Wait for the writer lock.
    pub fn session(&self) -> Session<'_> {
        Session {
            inventory: self,
            _guard: self.lock.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Wait for the writer lock, then claim `gate`.
    ///
    /// Fails with [`DbError::Abandoned`] if the caller gave up while waiting.
    pub fn session_gated(&self, gate: &CallGate) -> Result<Session<'_>> {
        let session = self.session();
        if gate.start() {
            Ok(session)
        } else {
            tracing::debug!("dropping call abandoned while waiting for the writer lock");
            Err(DbError::Abandoned)
        }
    }

    pub fn list(&self) -> Result<Vec<RecordEntry>> {
        self.session().list()
    }

    pub fn add(&self, record: &Record, insert_after: Option<usize>) -> Result<usize> {
        self.session().add(record, insert_after)
    }

    pub fn edit(&self, line: usize, record: &Record) -> Result<()> {
        self.session().edit(line, record)
    }

    pub fn delete(&self, line: usize) -> Result<()> {
        self.session().delete(line)
    }

    pub fn backups(&self) -> Result<Vec<BackupInfo>> {
        self.session().backups()
    }

    pub fn restore(&self, name: &str) -> Result<()> {
        self.session().restore(name)
    }
}

impl Session<'_> {
    pub fn list(&self) -> Result<Vec<RecordEntry>> {
        self.inventory.store.list()
    }

    pub fn add(&self, record: &Record, insert_after: Option<usize>) -> Result<usize> {
        let line = self.inventory.store.append(record, insert_after)?;
        tracing::info!(line, "record added");
        self.inventory.backups.snapshot_best_effort("add");
        Ok(line)
    }

    pub fn edit(&self, line: usize, record: &Record) -> Result<()> {
        self.inventory.store.update(line, record)?;
        tracing::info!(line, "record updated");
        self.inventory.backups.snapshot_best_effort("edit");
        Ok(())
    }

    pub fn delete(&self, line: usize) -> Result<()> {
        self.inventory.store.delete(line)?;
        tracing::info!(line, "record deleted");
        self.inventory.backups.snapshot_best_effort("delete");
        Ok(())
    }

    pub fn backups(&self) -> Result<Vec<BackupInfo>> {
        self.inventory.backups.list()
    }

    pub fn restore(&self, name: &str) -> Result<()> {
        self.inventory.backups.restore(name)
    }
}
