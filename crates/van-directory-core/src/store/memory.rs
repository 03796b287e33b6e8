//! In-memory [`Store`] implementation for testing.
//!
//! Persisted state and backups live behind `std::sync::RwLock`. Writes can
//! be made to fail on demand to exercise the record store's
//! all-or-nothing behaviour.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::{BuilderRecord, StateIndex};

use super::{Snapshot, Store};

/// In-memory store for tests and embedding.
pub struct InMemoryStore {
    persisted: RwLock<Option<Snapshot>>,
    backups: RwLock<Vec<Snapshot>>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            persisted: RwLock::new(None),
            backups: RwLock::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Start from an already-persisted snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        *store.persisted.write().unwrap() = Some(snapshot);
        store
    }

    /// Make every subsequent `save` and `backup` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of backups taken so far.
    pub fn backup_count(&self) -> usize {
        self.backups.read().unwrap().len()
    }

    /// Current persisted state, if any.
    pub fn persisted(&self) -> Option<Snapshot> {
        self.persisted.read().unwrap().clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn load(&self) -> Result<Snapshot> {
        Ok(self.persisted.read().unwrap().clone().unwrap_or_default())
    }

    async fn save(&self, builders: &[BuilderRecord], by_state: &StateIndex) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("in-memory store rejected write");
        }
        *self.persisted.write().unwrap() = Some(Snapshot {
            builders: builders.to_vec(),
            builders_by_state: by_state.clone(),
        });
        Ok(())
    }

    async fn backup(&self) -> Result<Option<String>> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("in-memory store rejected backup");
        }
        let current = self.persisted.read().unwrap().clone();
        match current {
            Some(snapshot) => {
                let mut backups = self.backups.write().unwrap();
                backups.push(snapshot);
                Ok(Some(format!("memory-backup-{}", backups.len())))
            }
            None => Ok(None),
        }
    }

    async fn restore_latest(&self) -> Result<Option<String>> {
        let latest = {
            let backups = self.backups.read().unwrap();
            backups.last().cloned().map(|s| (s, backups.len()))
        };
        let Some((snapshot, n)) = latest else {
            return Ok(None);
        };
        self.backup().await?;
        *self.persisted.write().unwrap() = Some(snapshot);
        Ok(Some(format!("memory-backup-{}", n)))
    }
}
