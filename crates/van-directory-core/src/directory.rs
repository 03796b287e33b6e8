//! The builder record store.
//!
//! [`Directory`] owns the flat builder collection and the per-state index,
//! and persists both through a [`Store`]. Every mutation is computed on
//! copies, the previously persisted state is backed up, the new state is
//! saved, and only then does the in-memory view change. A failure at any
//! step leaves both views exactly as they were.
//!
//! Mutations take `&mut self`. Callers sharing a directory across tasks
//! wrap it in a mutex, which also serializes writes to the backend.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, Result};
use crate::index::{self, canonical_state_key, state_key};
use crate::models::{
    BuilderId, BuilderPatch, BuilderRecord, SearchQuery, StateIndex, ValidationReport,
};
use crate::store::Store;

/// How new ids are allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// One more than the largest integer-valued id (1 for an empty store).
    /// Falls back to a UUID once the largest id is `u64::MAX`.
    #[default]
    Sequential,
    /// Random v4 UUID.
    Uuid,
}

/// Outcome of a bulk [`Directory::import`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub added: Vec<BuilderId>,
    /// Ids already present in the directory (or repeated in the batch).
    pub skipped: Vec<BuilderId>,
    /// `(position in batch, offending fields)`.
    pub rejected: Vec<(usize, Vec<String>)>,
}

pub struct Directory<S> {
    store: S,
    records: Vec<BuilderRecord>,
    by_state: StateIndex,
    id_strategy: IdStrategy,
}

/// Names of missing or invalid required fields, empty when the record is
/// acceptable.
pub fn record_issues(record: &BuilderRecord) -> Vec<String> {
    let mut fields = Vec::new();
    if record.name.trim().is_empty() {
        fields.push("name".to_string());
    }
    let has_address = record
        .address
        .as_deref()
        .is_some_and(|a| !a.trim().is_empty());
    if !has_address && record.location.is_none() {
        fields.push("address or location".to_string());
    }
    if !record.contact.has_any() {
        fields.push("contact (phone, email, or website)".to_string());
    }
    if let Some(loc) = &record.location {
        if let Some(lat) = loc.lat {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                fields.push("location.lat".to_string());
            }
        }
        if let Some(lng) = loc.lng {
            if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
                fields.push("location.lng".to_string());
            }
        }
    }
    if let Some(range) = &record.price_range {
        if range.min > range.max {
            fields.push("priceRange".to_string());
        }
    }
    fields
}

/// Trim and canonicalize the state, and drop transient search annotations.
fn normalize(record: &mut BuilderRecord) {
    record.distance_from_query = None;
    if let Some(loc) = record.location.as_mut() {
        let key = canonical_state_key(&loc.state);
        loc.state = if key == crate::models::UNKNOWN_STATE && loc.state.trim().is_empty() {
            String::new()
        } else {
            key
        };
        loc.city = loc.city.trim().to_string();
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn provided(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl<S: Store> Directory<S> {
    /// Load the persisted state from `store`.
    pub async fn open(store: S, id_strategy: IdStrategy) -> Result<Self> {
        let snapshot = store.load().await?;
        Ok(Self {
            store,
            records: snapshot.builders,
            by_state: snapshot.builders_by_state,
            id_strategy,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn records(&self) -> &[BuilderRecord] {
        &self.records
    }

    pub fn by_state(&self) -> &StateIndex {
        &self.by_state
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&BuilderRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    fn next_id(&self, records: &[BuilderRecord]) -> BuilderId {
        match self.id_strategy {
            IdStrategy::Sequential => {
                let max = records
                    .iter()
                    .filter_map(|r| r.id.trim().parse::<u64>().ok())
                    .max()
                    .unwrap_or(0);
                match max.checked_add(1) {
                    Some(next) => next.to_string(),
                    None => uuid::Uuid::new_v4().to_string(),
                }
            }
            IdStrategy::Uuid => uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Back up, save, then adopt the new state.
    async fn commit(&mut self, records: Vec<BuilderRecord>, by_state: StateIndex) -> Result<()> {
        self.store.backup().await?;
        self.store.save(&records, &by_state).await?;
        self.records = records;
        self.by_state = by_state;
        Ok(())
    }

    /// Validate, assign a fresh id, insert, and persist. Any id on the
    /// incoming record is ignored.
    pub async fn add(&mut self, mut record: BuilderRecord) -> Result<BuilderId> {
        normalize(&mut record);
        let issues = record_issues(&record);
        if !issues.is_empty() {
            return Err(DirectoryError::Validation(issues));
        }

        record.id = self.next_id(&self.records);
        let id = record.id.clone();

        let mut records = self.records.clone();
        let mut by_state = self.by_state.clone();
        index::insert(&mut by_state, &state_key(&record), &id);
        records.push(record);

        self.commit(records, by_state).await?;
        Ok(id)
    }

    /// Merge `patch` into the record with `id`, moving it between state
    /// buckets when its state changes.
    pub async fn update(&mut self, id: &str, patch: BuilderPatch) -> Result<BuilderRecord> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))?;

        let mut updated = self.records[pos].clone();
        let old_state = state_key(&updated);
        patch.apply_to(&mut updated);
        normalize(&mut updated);
        let issues = record_issues(&updated);
        if !issues.is_empty() {
            return Err(DirectoryError::Validation(issues));
        }

        let new_state = state_key(&updated);
        let mut by_state = self.by_state.clone();
        if old_state != new_state {
            index::remove(&mut by_state, &old_state, id);
            index::insert(&mut by_state, &new_state, id);
        }

        let mut records = self.records.clone();
        records[pos] = updated.clone();

        self.commit(records, by_state).await?;
        Ok(updated)
    }

    /// Delete the record with `id` from the collection and its bucket.
    pub async fn remove(&mut self, id: &str) -> Result<BuilderRecord> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))?;

        let mut records = self.records.clone();
        let removed = records.remove(pos);
        let mut by_state = self.by_state.clone();
        index::remove(&mut by_state, &state_key(&removed), id);

        self.commit(records, by_state).await?;
        Ok(removed)
    }

    /// Case-insensitive match on every provided field, in collection order.
    ///
    /// `name` and `city` match by substring; `state` by equality after
    /// canonicalization (`"nj"` finds New Jersey); `service` and `vanType`
    /// by substring of any member.
    pub fn search(&self, query: &SearchQuery) -> Vec<&BuilderRecord> {
        let name = provided(&query.name);
        let city = provided(&query.city);
        let state = provided(&query.state).map(canonical_state_key);
        let service = provided(&query.service);
        let van_type = provided(&query.van_type);

        let matches = self.records.iter().filter(|r| {
            name.map_or(true, |n| contains_ci(&r.name, n))
                && city.map_or(true, |c| contains_ci(r.city(), c))
                && state
                    .as_deref()
                    .map_or(true, |s| state_key(r).eq_ignore_ascii_case(s))
                && service.map_or(true, |s| r.services.iter().any(|v| contains_ci(v, s)))
                && van_type.map_or(true, |t| r.van_types.iter().any(|v| contains_ci(v, t)))
        });

        match query.limit {
            Some(limit) => matches.take(limit).collect(),
            None => matches.collect(),
        }
    }

    /// Check id uniqueness, index consistency, and required fields.
    pub fn validate(&self) -> ValidationReport {
        let mut issues = Vec::new();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for r in &self.records {
            *counts.entry(r.id.as_str()).or_default() += 1;
        }
        let mut reported = HashSet::new();
        for r in &self.records {
            if r.id.trim().is_empty() {
                if reported.insert("") {
                    issues.push("one or more builders have an empty id".to_string());
                }
                continue;
            }
            let n = counts[r.id.as_str()];
            if n > 1 && reported.insert(r.id.as_str()) {
                issues.push(format!("duplicate id '{}' ({} builders)", r.id, n));
            }
        }

        for r in &self.records {
            let fields = record_issues(r);
            if !fields.is_empty() {
                issues.push(format!(
                    "builder '{}' is missing or has invalid: {}",
                    r.id,
                    fields.join(", ")
                ));
            }
        }

        issues.extend(index::index_issues(&self.records, &self.by_state));

        ValidationReport {
            is_valid: issues.is_empty(),
            issues,
        }
    }

    /// Recompute the state index from the collection and persist it.
    pub async fn rebuild_index(&mut self) -> Result<()> {
        let by_state = index::build_index(&self.records);
        let records = self.records.clone();
        self.commit(records, by_state).await
    }

    /// Add many records in one persisted write.
    ///
    /// Records keep their (normalized) ids; records without one get a fresh
    /// id. Ids already in the directory are skipped, and records failing
    /// validation are rejected, without affecting the rest of the batch.
    pub async fn import(&mut self, batch: Vec<BuilderRecord>) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let mut records = self.records.clone();
        let mut by_state = self.by_state.clone();
        let mut ids: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();

        for (i, mut record) in batch.into_iter().enumerate() {
            normalize(&mut record);
            let issues = record_issues(&record);
            if !issues.is_empty() {
                report.rejected.push((i, issues));
                continue;
            }
            record.id = record.id.trim().to_string();
            if record.id.is_empty() {
                record.id = self.next_id(&records);
            } else if ids.contains(&record.id) {
                report.skipped.push(record.id);
                continue;
            }
            ids.insert(record.id.clone());
            index::insert(&mut by_state, &state_key(&record), &record.id);
            report.added.push(record.id.clone());
            records.push(record);
        }

        if !report.added.is_empty() {
            self.commit(records, by_state).await?;
        }
        Ok(report)
    }

    /// Make the newest backup authoritative and reload from it. The state
    /// being replaced is backed up first, so restoring again undoes this.
    pub async fn restore_latest_backup(&mut self) -> Result<Option<String>> {
        let label = self.store.restore_latest().await?;
        if label.is_some() {
            self.reload().await?;
        }
        Ok(label)
    }

    /// Re-read the persisted state, discarding the in-memory view.
    pub async fn reload(&mut self) -> Result<()> {
        let snapshot = self.store.load().await?;
        self.records = snapshot.builders;
        self.by_state = snapshot.builders_by_state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::distance_miles;
    use crate::models::{Contact, Coordinate, Location, PriceRange};
    use crate::proximity::find_near;
    use crate::store::memory::InMemoryStore;
    use crate::store::Snapshot;

    fn builder(name: &str, city: &str, state: &str, lat: f64, lng: f64) -> BuilderRecord {
        BuilderRecord {
            name: name.into(),
            contact: Contact {
                email: Some(format!("hello@{}.example", name.to_lowercase().replace(' ', ""))),
                ..Default::default()
            },
            location: Some(Location {
                lat: Some(lat),
                lng: Some(lng),
                city: city.into(),
                state: state.into(),
                zip: None,
            }),
            ..Default::default()
        }
    }

    async fn empty() -> Directory<InMemoryStore> {
        Directory::open(InMemoryStore::new(), IdStrategy::Sequential)
            .await
            .unwrap()
    }

    fn assert_invariants(dir: &Directory<InMemoryStore>) {
        let report = dir.validate();
        assert!(report.is_valid, "issues: {:?}", report.issues);

        let ids: HashSet<&str> = dir.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), dir.len());

        let mut union: Vec<&str> = dir
            .by_state()
            .values()
            .flat_map(|b| b.builder_ids.iter().map(String::as_str))
            .collect();
        union.sort();
        let mut flat: Vec<&str> = ids.into_iter().collect();
        flat.sort();
        assert_eq!(union, flat);

        for (state, bucket) in dir.by_state() {
            let n = dir.records().iter().filter(|r| &state_key(r) == state).count();
            assert_eq!(bucket.builder_ids.len(), n);
            assert_eq!(bucket.count, n);
        }

        let persisted = dir.store().persisted().unwrap_or_default();
        assert_eq!(persisted.builders, dir.records());
        assert_eq!(&persisted.builders_by_state, dir.by_state());
    }

    #[tokio::test]
    async fn end_to_end_scenario() {
        let mut dir = empty().await;
        let id = dir
            .add(builder("Test Co", "Test City", "New Jersey", 40.0, -74.0))
            .await
            .unwrap();
        assert!(!id.is_empty());

        let hits = dir.search(&SearchQuery {
            state: Some("New Jersey".into()),
            ..Default::default()
        });
        assert!(hits.iter().any(|r| r.id == id));
        assert_invariants(&dir);

        let mut moved = dir.get(&id).unwrap().location.clone().unwrap();
        moved.state = "New York".into();
        dir.update(
            &id,
            BuilderPatch {
                location: Some(moved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!dir.by_state().contains_key("New Jersey"));
        assert_eq!(dir.by_state()["New York"].builder_ids, vec![id.clone()]);
        assert_invariants(&dir);

        dir.remove(&id).await.unwrap();
        assert!(dir.is_empty());
        assert!(dir.by_state().is_empty());
        assert_invariants(&dir);

        assert!(find_near(Coordinate::new(40.0, -74.0), 10.0, &[]).is_empty());
        assert!(find_near(Coordinate::new(40.0, -74.0), 10.0, dir.records()).is_empty());
    }

    #[tokio::test]
    async fn sequential_ids_follow_max() {
        let seeded = Snapshot {
            builders: vec![
                BuilderRecord {
                    id: "7".into(),
                    ..builder("A", "Bend", "Oregon", 44.0, -121.3)
                },
                BuilderRecord {
                    id: "nj-1".into(),
                    ..builder("B", "Trenton", "New Jersey", 40.2, -74.7)
                },
            ],
            builders_by_state: StateIndex::new(),
        };
        let store = InMemoryStore::with_snapshot(seeded);
        let mut dir = Directory::open(store, IdStrategy::Sequential).await.unwrap();
        let id = dir
            .add(builder("C", "Boise", "Idaho", 43.6, -116.2))
            .await
            .unwrap();
        assert_eq!(id, "8");
    }

    #[tokio::test]
    async fn sequential_ids_past_u64_max_fall_back_to_uuid() {
        let mut dir = empty().await;
        let mut top = builder("Top", "Bend", "Oregon", 44.0, -121.3);
        top.id = u64::MAX.to_string();
        let mut unnamed = builder("No Id", "Boise", "Idaho", 43.6, -116.2);
        unnamed.id = String::new();
        let report = dir.import(vec![top, unnamed]).await.unwrap();
        assert_eq!(report.added.len(), 2);
        assert_eq!(report.added[1].len(), 36);

        let id = dir.add(builder("Next", "Bend", "Oregon", 44.0, -121.3)).await.unwrap();
        assert_eq!(id.len(), 36);
        assert_ne!(id, report.added[1]);
        assert_invariants(&dir);
    }

    #[tokio::test]
    async fn removing_a_duplicate_id_keeps_its_twin_indexed() {
        let dup = builder("Dup", "Bend", "Oregon", 44.0, -121.3);
        let records = vec![
            BuilderRecord {
                id: "1".into(),
                ..dup.clone()
            },
            BuilderRecord {
                id: "1".into(),
                ..dup
            },
        ];
        let snapshot = Snapshot {
            builders_by_state: index::build_index(&records),
            builders: records,
        };
        let mut dir = Directory::open(InMemoryStore::with_snapshot(snapshot), IdStrategy::Sequential)
            .await
            .unwrap();
        dir.remove("1").await.unwrap();
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.by_state()["Oregon"].builder_ids, vec!["1"]);
        assert_eq!(dir.by_state()["Oregon"].count, 1);
        assert!(dir.validate().is_valid);
    }

    #[tokio::test]
    async fn uuid_ids() {
        let mut dir = Directory::open(InMemoryStore::new(), IdStrategy::Uuid)
            .await
            .unwrap();
        let a = dir.add(builder("A", "", "Utah", 40.0, -111.0)).await.unwrap();
        let b = dir.add(builder("B", "", "Utah", 40.0, -111.0)).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
        assert_invariants(&dir);
    }

    #[tokio::test]
    async fn add_rejects_missing_fields() {
        let mut dir = empty().await;
        let err = dir.add(BuilderRecord::default()).await.unwrap_err();
        match err {
            DirectoryError::Validation(fields) => {
                assert!(fields.contains(&"name".to_string()));
                assert!(fields.contains(&"address or location".to_string()));
                assert!(fields.iter().any(|f| f.starts_with("contact")));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(dir.is_empty());
        assert!(dir.store().persisted().is_none());
    }

    #[tokio::test]
    async fn address_satisfies_location_requirement() {
        let mut dir = empty().await;
        let rec = BuilderRecord {
            name: "Mail Only".into(),
            address: Some("1 Main St, Bend, OR".into()),
            contact: Contact {
                phone: Some("555-0100".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let id = dir.add(rec).await.unwrap();
        assert_eq!(dir.by_state()[crate::models::UNKNOWN_STATE].builder_ids, vec![id]);
        assert_invariants(&dir);
    }

    #[tokio::test]
    async fn add_rejects_bad_ranges() {
        let mut dir = empty().await;
        let mut rec = builder("Bad", "X", "Ohio", 95.0, -200.0);
        rec.price_range = Some(PriceRange {
            min: 90_000.0,
            max: 40_000.0,
        });
        let err = dir.add(rec).await.unwrap_err();
        let DirectoryError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields, vec!["location.lat", "location.lng", "priceRange"]);
    }

    #[tokio::test]
    async fn state_is_canonicalized() {
        let mut dir = empty().await;
        let id = dir.add(builder("A", "Denver", "co", 39.7, -105.0)).await.unwrap();
        assert_eq!(dir.get(&id).unwrap().state(), "Colorado");
        assert!(dir.by_state().contains_key("Colorado"));
    }

    #[tokio::test]
    async fn update_and_remove_missing_id() {
        let mut dir = empty().await;
        assert!(matches!(
            dir.update("404", BuilderPatch::default()).await,
            Err(DirectoryError::NotFound(_))
        ));
        assert!(matches!(dir.remove("404").await, Err(DirectoryError::NotFound(_))));
        assert!(dir.store().persisted().is_none());
    }

    #[tokio::test]
    async fn invalid_update_changes_nothing() {
        let mut dir = empty().await;
        let id = dir.add(builder("A", "Bend", "Oregon", 44.0, -121.3)).await.unwrap();
        let before = dir.records().to_vec();
        let err = dir
            .update(
                &id,
                BuilderPatch {
                    name: Some("   ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Validation(ref f) if f == &vec!["name".to_string()]));
        assert_eq!(dir.records(), before.as_slice());
    }

    #[tokio::test]
    async fn store_failure_is_atomic() {
        let mut dir = empty().await;
        let id = dir.add(builder("A", "Bend", "Oregon", 44.0, -121.3)).await.unwrap();
        let records = dir.records().to_vec();
        let index = dir.by_state().clone();

        dir.store().set_fail_writes(true);
        assert!(matches!(
            dir.add(builder("B", "Bend", "Oregon", 44.0, -121.3)).await,
            Err(DirectoryError::Store(_))
        ));
        assert!(matches!(dir.remove(&id).await, Err(DirectoryError::Store(_))));
        assert_eq!(dir.records(), records.as_slice());
        assert_eq!(dir.by_state(), &index);

        dir.store().set_fail_writes(false);
        assert_invariants(&dir);
    }

    #[tokio::test]
    async fn every_mutation_backs_up_first() {
        let mut dir = empty().await;
        let id = dir.add(builder("A", "Bend", "Oregon", 44.0, -121.3)).await.unwrap();
        // Nothing was persisted before the first add.
        assert_eq!(dir.store().backup_count(), 0);
        dir.update(
            &id,
            BuilderPatch {
                description: Some("new".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(dir.store().backup_count(), 1);
        dir.remove(&id).await.unwrap();
        assert_eq!(dir.store().backup_count(), 2);

        let label = dir.restore_latest_backup().await.unwrap();
        assert_eq!(label.as_deref(), Some("memory-backup-2"));
        assert_eq!(dir.get(&id).unwrap().description, "new");
        assert_eq!(dir.store().backup_count(), 3);
    }

    #[tokio::test]
    async fn restore_backs_up_the_state_it_replaces() {
        let mut dir = empty().await;
        dir.add(builder("A", "Bend", "Oregon", 44.0, -121.3)).await.unwrap();
        let b = dir.add(builder("B", "Boise", "Idaho", 43.6, -116.2)).await.unwrap();
        dir.remove(&b).await.unwrap();
        assert_eq!(dir.store().backup_count(), 2);

        dir.restore_latest_backup().await.unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.store().backup_count(), 3);

        // The one-record state was kept and is now the newest backup.
        let label = dir.restore_latest_backup().await.unwrap();
        assert_eq!(label.as_deref(), Some("memory-backup-3"));
        assert_eq!(dir.len(), 1);
        assert!(dir.get(&b).is_none());
        assert_eq!(dir.store().backup_count(), 4);
        assert_invariants(&dir);
    }

    #[tokio::test]
    async fn invariants_hold_across_mixed_operations() {
        let mut dir = empty().await;
        let states = ["New Jersey", "New York", "Oregon", "nj", "Ontario", ""];
        let mut ids = Vec::new();
        for (i, s) in states.iter().enumerate() {
            let id = dir
                .add(builder(&format!("B{}", i), "Town", s, 40.0 + i as f64, -74.0))
                .await
                .unwrap();
            ids.push(id);
            assert_invariants(&dir);
        }
        for (i, id) in ids.iter().enumerate().filter(|(i, _)| i % 2 == 0) {
            let mut loc = dir.get(id).unwrap().location.clone().unwrap();
            loc.state = states[(i + 1) % states.len()].to_string();
            dir.update(
                id,
                BuilderPatch {
                    location: Some(loc),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
            assert_invariants(&dir);
        }
        for id in ids.iter().skip(1).step_by(2) {
            dir.remove(id).await.unwrap();
            assert_invariants(&dir);
        }
        assert_eq!(dir.len(), 3);
    }

    #[tokio::test]
    async fn search_semantics() {
        let mut dir = empty().await;
        let mut a = builder("Sprinter Works", "Denver", "Colorado", 39.7, -105.0);
        a.services = ["Full Build".to_string(), "Solar".to_string()].into();
        a.van_types = ["Mercedes Sprinter".to_string()].into();
        let mut b = builder("Transit Tinkers", "Boulder", "Colorado", 40.0, -105.3);
        b.services = ["Electrical".to_string()].into();
        b.van_types = ["Ford Transit".to_string()].into();
        let mut c = builder("Virginia Vans", "Richmond", "Virginia", 37.5, -77.4);
        c.van_types = ["Ram Promaster".to_string()].into();
        let mut d = builder("Mountain Vans", "Charleston", "West Virginia", 38.3, -81.6);
        d.services = ["solar".to_string()].into();
        for r in [a, b, c, d] {
            dir.add(r).await.unwrap();
        }

        let names = |q: SearchQuery| -> Vec<String> {
            dir.search(&q).iter().map(|r| r.name.clone()).collect()
        };

        assert_eq!(
            names(SearchQuery {
                state: Some("co".into()),
                ..Default::default()
            }),
            vec!["Sprinter Works", "Transit Tinkers"]
        );
        assert_eq!(
            names(SearchQuery {
                state: Some("Virginia".into()),
                ..Default::default()
            }),
            vec!["Virginia Vans"]
        );
        assert_eq!(
            names(SearchQuery {
                service: Some("SOLAR".into()),
                ..Default::default()
            }),
            vec!["Sprinter Works", "Mountain Vans"]
        );
        assert_eq!(
            names(SearchQuery {
                name: Some("vans".into()),
                van_type: Some("promaster".into()),
                ..Default::default()
            }),
            vec!["Virginia Vans"]
        );
        assert_eq!(
            names(SearchQuery {
                city: Some("BOUL".into()),
                ..Default::default()
            }),
            vec!["Transit Tinkers"]
        );
        assert_eq!(
            names(SearchQuery {
                limit: Some(1),
                ..Default::default()
            }),
            vec!["Sprinter Works"]
        );
    }

    #[tokio::test]
    async fn validate_reports_problems_without_failing() {
        let dup = builder("Dup", "Bend", "Oregon", 44.0, -121.3);
        let snapshot = Snapshot {
            builders: vec![
                BuilderRecord {
                    id: "1".into(),
                    ..dup.clone()
                },
                BuilderRecord {
                    id: "1".into(),
                    ..dup.clone()
                },
                BuilderRecord {
                    id: "2".into(),
                    name: String::new(),
                    ..dup
                },
            ],
            builders_by_state: StateIndex::new(),
        };
        let mut dir = Directory::open(InMemoryStore::with_snapshot(snapshot), IdStrategy::Sequential)
            .await
            .unwrap();
        let report = dir.validate();
        assert!(!report.is_valid);
        assert!(report.issues.iter().any(|i| i.contains("duplicate id '1'")));
        assert!(report.issues.iter().any(|i| i.contains("builder '2'") && i.contains("name")));
        assert!(report.issues.iter().any(|i| i.contains("missing from the index")));

        dir.rebuild_index().await.unwrap();
        let report = dir.validate();
        assert!(!report.issues.iter().any(|i| i.contains("index")));
    }

    #[tokio::test]
    async fn import_keeps_ids_and_skips_duplicates() {
        let mut dir = empty().await;
        let existing = dir.add(builder("A", "Bend", "Oregon", 44.0, -121.3)).await.unwrap();
        let batch: Vec<BuilderRecord> = serde_json::from_value(serde_json::json!([
            {"id": 12, "name": "Twelve", "location": {"city": "Boise", "state": "ID", "lat": 43.6, "lng": -116.2}, "contact": {"phone": "1"}},
            {"id": "nj-1", "name": "Jersey", "location": {"city": "Trenton", "state": "New Jersey"}, "contact": {"email": "a@b"}},
            {"id": existing, "name": "Again", "address": "x", "contact": {"phone": "1"}},
            {"name": "", "contact": {}},
            {"name": "No Id", "address": "Somewhere", "contact": {"website": "https://x"}}
        ]))
        .unwrap();

        let report = dir.import(batch).await.unwrap();
        assert_eq!(report.added, vec!["12", "nj-1", "13"]);
        assert_eq!(report.skipped, vec![existing]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, 3);
        assert_invariants(&dir);
        assert_eq!(dir.get("12").unwrap().state(), "Idaho");
    }

    #[tokio::test]
    async fn proximity_over_directory_records() {
        let mut dir = empty().await;
        dir.add(builder("Near", "Princeton", "NJ", 40.357, -74.667)).await.unwrap();
        dir.add(builder("Far", "Denver", "CO", 39.739, -104.990)).await.unwrap();
        let origin = Coordinate::new(40.2171, -74.7429);
        let out = find_near(origin, 50.0, dir.records());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Near");
        let miles = out[0].distance_from_query.as_ref().unwrap().miles;
        let expected = distance_miles(origin, Coordinate::new(40.357, -74.667));
        assert!((miles - expected).abs() < 1e-9);
        // Annotations never reach the store.
        assert!(dir
            .store()
            .persisted()
            .unwrap()
            .builders
            .iter()
            .all(|r| r.distance_from_query.is_none()));
    }
}
