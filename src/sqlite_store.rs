//! SQLite-backed [`Store`] implementation.
//!
//! Records are stored one per row in `builders` (full record as JSON, plus
//! its position in the collection and its state bucket), and the per-state
//! index in `state_index`. A save replaces both tables inside a single
//! transaction. Backups are complete database copies made with
//! `VACUUM INTO`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};

use van_directory_core::index::state_key;
use van_directory_core::models::{BuilderRecord, StateBucket, StateIndex};
use van_directory_core::store::{Snapshot, Store};

use crate::backup::{backup_path, ensure_dir, latest_backup};
use crate::db;
use crate::migrate::apply_schema;

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
    backup_dir: PathBuf,
}

impl SqliteStore {
    /// Open the database at `path`, creating it and its schema as needed.
    pub async fn open(path: &Path, backup_dir: impl Into<PathBuf>) -> Result<Self> {
        let pool = db::connect(path).await?;
        apply_schema(&pool).await?;
        Ok(Self {
            pool,
            backup_dir: backup_dir.into(),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn has_been_saved(&self) -> Result<bool> {
        let saved: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM store_meta WHERE key = 'last_updated'")
                .fetch_one(&self.pool)
                .await?;
        Ok(saved > 0)
    }
}

async fn read_snapshot(pool: &SqlitePool) -> Result<Snapshot> {
    let rows = sqlx::query("SELECT id, data_json FROM builders ORDER BY position ASC")
        .fetch_all(pool)
        .await?;

    let mut builders = Vec::with_capacity(rows.len());
    for row in &rows {
        let id: String = row.get("id");
        let data_json: String = row.get("data_json");
        let mut record: BuilderRecord = serde_json::from_str(&data_json)
            .with_context(|| format!("Corrupt record for builder '{}'", id))?;
        record.id = id;
        builders.push(record);
    }

    let index_rows = sqlx::query("SELECT state, count, builder_ids_json FROM state_index")
        .fetch_all(pool)
        .await?;

    let mut builders_by_state = StateIndex::new();
    for row in &index_rows {
        let state: String = row.get("state");
        let count: i64 = row.get("count");
        let ids_json: String = row.get("builder_ids_json");
        let builder_ids: Vec<String> = serde_json::from_str(&ids_json)
            .with_context(|| format!("Corrupt index bucket for state '{}'", state))?;
        builders_by_state.insert(
            state,
            StateBucket {
                count: usize::try_from(count).unwrap_or(0),
                builder_ids,
            },
        );
    }

    Ok(Snapshot {
        builders,
        builders_by_state,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn load(&self) -> Result<Snapshot> {
        read_snapshot(&self.pool).await
    }

    async fn save(&self, builders: &[BuilderRecord], by_state: &StateIndex) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM builders").execute(&mut *tx).await?;
        for (position, record) in builders.iter().enumerate() {
            let data_json = serde_json::to_string(record)?;
            sqlx::query(
                "INSERT INTO builders (id, position, name, state, data_json) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&record.id)
            .bind(position as i64)
            .bind(&record.name)
            .bind(state_key(record))
            .bind(&data_json)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to write builder '{}'", record.id))?;
        }

        sqlx::query("DELETE FROM state_index").execute(&mut *tx).await?;
        for (state, bucket) in by_state {
            sqlx::query(
                "INSERT INTO state_index (state, count, builder_ids_json) VALUES (?, ?, ?)",
            )
            .bind(state)
            .bind(bucket.count as i64)
            .bind(serde_json::to_string(&bucket.builder_ids)?)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO store_meta (key, value) VALUES ('last_updated', ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(builders = builders.len(), "saved directory to sqlite");
        Ok(())
    }

    async fn backup(&self) -> Result<Option<String>> {
        if !self.has_been_saved().await? {
            return Ok(None);
        }
        ensure_dir(&self.backup_dir)?;
        let target = backup_path(&self.backup_dir, "sqlite");
        sqlx::query("VACUUM INTO ?")
            .bind(target.display().to_string())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to back up to {}", target.display()))?;
        tracing::info!(backup = %target.display(), "backed up sqlite store");
        Ok(Some(target.display().to_string()))
    }

    async fn restore_latest(&self) -> Result<Option<String>> {
        let Some(latest) = latest_backup(&self.backup_dir, "sqlite")? else {
            return Ok(None);
        };
        let backup_pool = db::connect_read_only(&latest).await?;
        let snapshot = read_snapshot(&backup_pool).await;
        backup_pool.close().await;
        let snapshot =
            snapshot.with_context(|| format!("Failed to read backup {}", latest.display()))?;

        self.backup().await?;
        self.save(&snapshot.builders, &snapshot.builders_by_state)
            .await?;
        tracing::info!(backup = %latest.display(), "restored sqlite store");
        Ok(Some(latest.display().to_string()))
    }
}
