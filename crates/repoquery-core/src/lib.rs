//! Provider registry, caching, and cross-provider aggregation
//!
//! This crate is the heart of repoquery: it knows which package providers
//! exist, which of them are usable on the current host, and how to fan a
//! query out across several of them while caching what their tools report.
//!
//! # Architecture
//!
//! `repoquery-core` sits between the backend implementations and whatever
//! front end drives the queries:
//!
//! ```text
//!        callers (CLI, library users)
//!                    |
//!             ProviderRegistry
//!            /       |        \
//!      selection  providers  aggregation
//!                    |
//!              Backend trait
//!                    |
//!        repoquery-backends (apt, aptitude, ports)
//! ```
//!
//! A [`Provider`] pairs a registered name with a [`Backend`] and a private
//! [`PackageCache`]; the [`ProviderRegistry`] stores providers in
//! registration order, loads them lazily through a [`ProviderLoader`], and
//! answers which provider is suitable or default for an [`Environment`].
//! Bulk queries live in [`aggregate`] and return per-provider maps.
//!
//! # Example
//!
//! ```
//! use repoquery_core::{Environment, ProviderRegistry, ProviderSet};
//!
//! let mut registry = ProviderRegistry::new(Environment::new("debian"));
//! // With no providers registered and no loader, queries aggregate to
//! // nothing instead of failing.
//! let results = registry.package_candidates(&["bash"], &ProviderSet::Suitable)?;
//! assert!(results.is_empty());
//! # Ok::<(), repoquery_core::Error>(())
//! ```

pub mod aggregate;
pub mod backend;
pub mod cache;
pub mod env;
pub mod error;
pub mod provider;
pub mod registry;
pub mod types;

mod select;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::{
    PerProvider, ProviderSet, collective_query, collective_search_array, collective_search_hash,
};
pub use backend::{Backend, BaseBackend};
pub use cache::PackageCache;
pub use env::{Environment, Probe, StaticProbe, SystemProbe};
pub use error::{Error, Result};
pub use provider::{
    Confine, DEFAULT_SPECIFICITY, Provider, ProviderName, ProviderRef, ProviderSpec,
};
pub use registry::{NullLoader, ProviderLoader, ProviderRegistry};
pub use types::{
    CandidateMap, Pattern, RecordFields, RecordMap, Retrieval, VersionRecords, VersionsMap,
};
