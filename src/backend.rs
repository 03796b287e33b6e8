//! Opens the configured persistence backend.

use anyhow::Result;

use van_directory_core::directory::Directory;
use van_directory_core::store::Store;

use crate::config::{Backend, Config};
use crate::json_store::JsonFileStore;
use crate::sqlite_store::SqliteStore;

/// Whichever backend `[store]` selects.
pub type DynStore = Box<dyn Store>;

pub async fn open_store(config: &Config) -> Result<DynStore> {
    let store = &config.store;
    let opened: DynStore = match store.backend {
        Backend::Json => Box::new(JsonFileStore::new(&store.path, store.backup_dir())),
        Backend::Sqlite => Box::new(SqliteStore::open(&store.path, store.backup_dir()).await?),
    };
    Ok(opened)
}

/// Load the directory through the configured backend.
pub async fn open_directory(config: &Config) -> Result<Directory<DynStore>> {
    let store = open_store(config).await?;
    Ok(Directory::open(store, config.ids.strategy).await?)
}

/// Create the backing store. Idempotent: existing data is left alone.
pub async fn init_store(config: &Config) -> Result<()> {
    let store = &config.store;
    match store.backend {
        Backend::Json => {
            JsonFileStore::new(&store.path, store.backup_dir())
                .init()
                .await?;
        }
        Backend::Sqlite => {
            let db = SqliteStore::open(&store.path, store.backup_dir()).await?;
            db.close().await;
        }
    }
    Ok(())
}
