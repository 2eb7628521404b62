//! [`MapBackend`]: an in-memory [`Backend`] for registry and aggregation
//! tests
//!
//! The backend answers from fixed candidate and record maps. Its pattern
//! convention is private to the tests: `=name` selects exactly one package,
//! `^prefix` selects by prefix. A retrieval counter shared through
//! [`MapBackend::retrieval_counter`] lets tests assert when the caching
//! layer above skipped a retrieval.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use regex::Regex;
use repoquery_core::types::{CandidateMap, Pattern, RecordFields, RecordMap, Retrieval};
use repoquery_core::{Backend, Result};

/// Counts retrievals, observable after its backend moved into an `Arc`.
#[derive(Clone, Default)]
pub struct RetrievalCounter(Arc<AtomicUsize>);

impl RetrievalCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MapBackend {
    name_grammar: Regex,
    prefix_grammar: Regex,
    candidates: CandidateMap,
    records: RecordMap,
    harvest_all: bool,
    counter: RetrievalCounter,
}

impl Default for MapBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MapBackend {
    pub fn new() -> Self {
        Self {
            name_grammar: Regex::new(r"^[a-z0-9][a-z0-9.+-]*$").unwrap(),
            prefix_grammar: Regex::new(r"^[a-z0-9.+-]*$").unwrap(),
            candidates: CandidateMap::new(),
            records: RecordMap::new(),
            harvest_all: false,
            counter: RetrievalCounter::default(),
        }
    }

    /// Add a candidate version.
    pub fn candidate(mut self, package: &str, version: &str) -> Self {
        self.candidates
            .insert(package.to_string(), version.to_string());
        self
    }

    /// Add a version record; `Package` and `Version` fields are filled in.
    pub fn record(mut self, package: &str, version: &str, fields: &[(&str, &str)]) -> Self {
        let mut record = RecordFields::new();
        record.insert("Package".to_string(), package.to_string());
        record.insert("Version".to_string(), version.to_string());
        for (key, value) in fields {
            record.insert((*key).to_string(), (*value).to_string());
        }
        self.records
            .entry(package.to_string())
            .or_default()
            .insert(version.to_string(), record);
        self
    }

    /// Answer every retrieval with the whole corpus, simulating a tool
    /// whose pattern matched more than was asked for.
    pub fn harvest_all(mut self) -> Self {
        self.harvest_all = true;
        self
    }

    pub fn retrieval_counter(&self) -> RetrievalCounter {
        self.counter.clone()
    }

    fn selects(&self, pattern: &Pattern, key: &str) -> bool {
        if self.harvest_all {
            return true;
        }
        if let Some(name) = pattern.as_str().strip_prefix('=') {
            key == name
        } else if let Some(prefix) = pattern.as_str().strip_prefix('^') {
            key.starts_with(prefix)
        } else {
            false
        }
    }

    fn harvest(&self, pattern: &Pattern, with_records: bool) -> Retrieval {
        self.counter.bump();
        let mut retrieval = Retrieval::empty();
        for (package, version) in &self.candidates {
            if self.selects(pattern, package) {
                retrieval
                    .candidates
                    .insert(package.clone(), version.clone());
            }
        }
        if with_records {
            for (package, records) in &self.records {
                if self.selects(pattern, package) {
                    retrieval.records.insert(package.clone(), records.clone());
                }
            }
        }
        retrieval
    }
}

impl Backend for MapBackend {
    fn name_grammar(&self) -> Result<&Regex> {
        Ok(&self.name_grammar)
    }

    fn prefix_grammar(&self) -> Result<&Regex> {
        Ok(&self.prefix_grammar)
    }

    fn name_to_pattern(&self, package: &str) -> Result<Pattern> {
        Ok(Pattern::new(format!("={package}")))
    }

    fn prefix_to_pattern(&self, prefix: &str) -> Result<Pattern> {
        Ok(Pattern::new(format!("^{prefix}")))
    }

    fn retrieve_candidates(&self, pattern: &Pattern) -> Result<Retrieval> {
        Ok(self.harvest(pattern, false))
    }

    fn retrieve_records(&self, pattern: &Pattern) -> Result<Retrieval> {
        Ok(self.harvest(pattern, true))
    }
}
