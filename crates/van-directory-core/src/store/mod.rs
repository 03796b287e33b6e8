//! Persistence abstraction for the builder directory.
//!
//! The [`Store`] trait is the narrow boundary the record store is written
//! against: load the whole collection, save the whole collection, and keep
//! timestamped backups of what was persisted. Backends include the JSON
//! document and SQLite stores in the application crate and the
//! [`memory::InMemoryStore`] used in tests.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{BuilderRecord, StateIndex};

/// Everything a backend persists: the flat collection and its index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub builders: Vec<BuilderRecord>,
    #[serde(default)]
    pub builders_by_state: StateIndex,
}

/// Abstract storage backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`load`](Store::load) | Read the persisted collection and index |
/// | [`save`](Store::save) | Replace the persisted collection and index |
/// | [`backup`](Store::backup) | Snapshot persisted state to a timestamped location |
/// | [`restore_latest`](Store::restore_latest) | Make the newest backup authoritative |
///
/// `save` must be all-or-nothing: on error the previously persisted state
/// stays authoritative.
#[async_trait]
pub trait Store: Send + Sync {
    /// Read the persisted state. A store that was never written loads empty.
    async fn load(&self) -> Result<Snapshot>;

    /// Replace the persisted state.
    async fn save(&self, builders: &[BuilderRecord], by_state: &StateIndex) -> Result<()>;

    /// Copy the current persisted state aside. Returns a label for the
    /// backup, or `None` when nothing has been persisted yet.
    async fn backup(&self) -> Result<Option<String>>;

    /// Restore the newest backup. The current persisted state is backed up
    /// first, so a restore can itself be undone. Returns the label of the
    /// backup restored, or `None` when there are no backups.
    async fn restore_latest(&self) -> Result<Option<String>>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Box<S> {
    async fn load(&self) -> Result<Snapshot> {
        (**self).load().await
    }

    async fn save(&self, builders: &[BuilderRecord], by_state: &StateIndex) -> Result<()> {
        (**self).save(builders, by_state).await
    }

    async fn backup(&self) -> Result<Option<String>> {
        (**self).backup().await
    }

    async fn restore_latest(&self) -> Result<Option<String>> {
        (**self).restore_latest().await
    }
}
