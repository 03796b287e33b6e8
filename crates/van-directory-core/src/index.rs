//! The denormalized per-state index (`buildersByState`).
//!
//! A record belongs to the bucket named by [`state_key`]. Buckets list ids
//! in collection order, carry `count == builder_ids.len()`, and are dropped
//! once empty.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{BuilderRecord, StateBucket, StateIndex, UNKNOWN_STATE};
use crate::resolver::canonical_state;

/// Bucket name for a raw state value: the canonical name when recognized,
/// otherwise the trimmed input, or [`UNKNOWN_STATE`] when blank.
pub fn canonical_state_key(state: &str) -> String {
    if let Some(name) = canonical_state(state) {
        return name.to_string();
    }
    let trimmed = state.trim();
    if trimmed.is_empty() {
        UNKNOWN_STATE.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn state_key(record: &BuilderRecord) -> String {
    canonical_state_key(record.state())
}

/// Index rebuilt from scratch.
pub fn build_index(records: &[BuilderRecord]) -> StateIndex {
    let mut index = StateIndex::new();
    for r in records {
        insert(&mut index, &state_key(r), &r.id);
    }
    index
}

pub fn insert(index: &mut StateIndex, state: &str, id: &str) {
    let bucket = index.entry(state.to_string()).or_default();
    bucket.builder_ids.push(id.to_string());
    bucket.count = bucket.builder_ids.len();
}

/// Remove one occurrence of `id` from `state`'s bucket. Returns whether it
/// was present.
pub fn remove(index: &mut StateIndex, state: &str, id: &str) -> bool {
    let Some(bucket) = index.get_mut(state) else {
        return false;
    };
    let Some(pos) = bucket.builder_ids.iter().position(|b| b == id) else {
        return false;
    };
    bucket.builder_ids.remove(pos);
    bucket.count = bucket.builder_ids.len();
    if bucket.builder_ids.is_empty() {
        index.remove(state);
    }
    true
}

/// Compare a stored index against the collection and describe every
/// disagreement.
pub fn index_issues(records: &[BuilderRecord], index: &StateIndex) -> Vec<String> {
    let mut issues = Vec::new();
    let expected = build_index(records);

    let home: HashMap<&str, String> = records
        .iter()
        .map(|r| (r.id.as_str(), state_key(r)))
        .collect();

    for (state, bucket) in index {
        if bucket.count != bucket.builder_ids.len() {
            issues.push(format!(
                "state '{}' has count {} but lists {} builder id(s)",
                state,
                bucket.count,
                bucket.builder_ids.len()
            ));
        }
        let mut seen = HashSet::new();
        for id in &bucket.builder_ids {
            if !seen.insert(id.as_str()) {
                issues.push(format!("state '{}' lists builder '{}' more than once", state, id));
                continue;
            }
            match home.get(id.as_str()) {
                None => issues.push(format!(
                    "state '{}' lists builder '{}' which is not in the collection",
                    state, id
                )),
                Some(actual) if actual != state => issues.push(format!(
                    "builder '{}' is indexed under '{}' but its state is '{}'",
                    id, state, actual
                )),
                Some(_) => {}
            }
        }
    }

    for (state, bucket) in &expected {
        let listed: HashSet<&str> = index
            .get(state)
            .map(|b| b.builder_ids.iter().map(String::as_str).collect())
            .unwrap_or_default();
        match index.get(state) {
            None => issues.push(format!(
                "state '{}' is missing from the index ({} builder(s))",
                state, bucket.count
            )),
            Some(stored) if stored.count != bucket.count => issues.push(format!(
                "state '{}' has count {} but {} builder(s) have that state",
                state, stored.count, bucket.count
            )),
            Some(_) => {}
        }
        for id in &bucket.builder_ids {
            if index.contains_key(state) && !listed.contains(id.as_str()) {
                issues.push(format!(
                    "builder '{}' is missing from the '{}' bucket",
                    id, state
                ));
            }
        }
    }

    issues
}

/// Per-state record counts, for reporting.
pub fn state_counts(index: &StateIndex) -> BTreeMap<&str, usize> {
    index.iter().map(|(s, b)| (s.as_str(), b.count)).collect()
}
