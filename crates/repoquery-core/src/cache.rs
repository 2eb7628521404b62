//! Per-provider package caches
//!
//! Each provider owns one [`PackageCache`] holding everything its backend
//! has reported so far: a candidate-version store and a version-record
//! store. Retrievals merge additively; a later harvest overwrites values
//! for keys it shares with an earlier one and appends the rest, so a
//! cached package keeps its enumeration position for the life of the
//! cache.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::{CandidateMap, RecordMap, Retrieval, VersionRecords};

/// The candidate and record stores of a single provider.
///
/// Interior-mutable so the query layer can fill it through a shared
/// provider handle. The stores grow without bound; a cache lives as long
/// as its provider's registration and is dropped with it.
#[derive(Debug, Default)]
pub struct PackageCache {
    candidates: Mutex<CandidateMap>,
    records: Mutex<RecordMap>,
}

// Merge-only writers keep the maps coherent even when a lock was poisoned,
// so recover the guard instead of surfacing the poison.
fn lock<T>(store: &Mutex<T>) -> MutexGuard<'_, T> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PackageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached candidate version for `package`, if any retrieval has
    /// reported one.
    pub fn candidate(&self, package: &str) -> Option<String> {
        lock(&self.candidates).get(package).cloned()
    }

    /// The cached version records for `package`, if any retrieval has
    /// reported them.
    pub fn records(&self, package: &str) -> Option<VersionRecords> {
        lock(&self.records).get(package).cloned()
    }

    /// Merge candidate versions from a retrieval into the candidate store.
    pub fn merge_candidates(&self, found: &CandidateMap) {
        let mut store = lock(&self.candidates);
        for (package, version) in found {
            store.insert(package.clone(), version.clone());
        }
    }

    /// Merge version records from a retrieval into the record store.
    pub fn merge_records(&self, found: &RecordMap) {
        let mut store = lock(&self.records);
        for (package, records) in found {
            store.insert(package.clone(), records.clone());
        }
    }

    /// Merge a whole harvest: candidates and records together.
    pub fn absorb(&self, retrieval: &Retrieval) {
        self.merge_candidates(&retrieval.candidates);
        self.merge_records(&retrieval.records);
    }

    /// Drop every cached candidate version.
    pub fn clear_candidates(&self) {
        lock(&self.candidates).clear();
    }

    /// Drop every cached version record.
    pub fn clear_records(&self) {
        lock(&self.records).clear();
    }

    /// Snapshot of the candidate store in enumeration order.
    pub fn candidates_snapshot(&self) -> CandidateMap {
        lock(&self.candidates).clone()
    }

    /// Snapshot of the record store in enumeration order.
    pub fn records_snapshot(&self) -> RecordMap {
        lock(&self.records).clone()
    }
}
