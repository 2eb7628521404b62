//! Shared value types for package queries
//!
//! All query results are [`IndexMap`]s rather than hash maps: callers see
//! packages in the order a backend reported them, and re-inserting a key
//! during a cache merge keeps its original position. Both properties mirror
//! the output of the native tools closely enough to diff against them.

use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

/// Package name mapped to its current candidate version.
pub type CandidateMap = IndexMap<String, String>;

/// Metadata fields of one package version (`Package`, `Version`,
/// `Description`, ...). Field values are kept verbatim from the tool output.
pub type RecordFields = IndexMap<String, String>;

/// Version string mapped to the record describing that version.
pub type VersionRecords = IndexMap<String, RecordFields>;

/// Package name mapped to all known versions and their records.
pub type RecordMap = IndexMap<String, VersionRecords>;

/// Package name mapped to the plain list of known versions.
pub type VersionsMap = IndexMap<String, Vec<String>>;

/// A search pattern in a backend's native syntax, produced by that backend's
/// pattern builders and only meaningful to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern(String);

impl Pattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything one backend retrieval learned: candidate versions and full
/// version records.
///
/// Backends that answer both questions with a single tool run (ports) fill
/// both maps from one invocation; backends with separate subcommands (apt)
/// leave the map the current operation did not ask for empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Retrieval {
    pub candidates: CandidateMap,
    pub records: RecordMap,
}

impl Retrieval {
    /// A retrieval that found nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A retrieval carrying candidate versions only.
    pub fn from_candidates(candidates: CandidateMap) -> Self {
        Self {
            candidates,
            records: RecordMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.records.is_empty()
    }

    /// Drop records for packages this retrieval found no candidate for.
    ///
    /// A package that shows up in an index listing but no longer has an
    /// installable candidate (removed from the repository, all versions
    /// `(none)`) must not linger in the record caches.
    pub fn prune_orphans(mut self) -> Self {
        if self.records.is_empty() {
            return self;
        }
        self.records.retain(|package, _| {
            let keep = self.candidates.contains_key(package);
            if !keep {
                debug!(package, "dropping records for package without a candidate");
            }
            keep
        });
        self
    }
}
