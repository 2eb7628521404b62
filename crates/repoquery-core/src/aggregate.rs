//! Cross-provider query aggregation
//!
//! Bulk queries fan one question out to many providers and collect the
//! answers keyed by provider name. Three engines cover every entry point:
//!
//! - [`collective_query`]: per-subject lookups; subjects a provider cannot
//!   resolve are omitted from that provider's map
//! - [`collective_search_hash`]: prefix searches returning maps, merged
//!   across filters with later filters winning on shared keys
//! - [`collective_search_array`]: prefix searches returning lists,
//!   concatenated across filters
//!
//! Providers are queried sequentially in the order the [`ProviderSet`]
//! resolves to, and the first error aborts the whole aggregation.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::provider::{Provider, ProviderName, ProviderRef};
use crate::registry::ProviderRegistry;
use crate::types::{CandidateMap, RecordMap, VersionRecords, VersionsMap};

/// Aggregation results keyed by provider name, in query order.
pub type PerProvider<T> = IndexMap<ProviderName, T>;

/// Which providers a bulk query fans out to.
#[derive(Debug, Clone, Default)]
pub enum ProviderSet {
    /// Every provider suitable in the registry's environment.
    #[default]
    Suitable,
    /// An explicit list of handles and names, queried in list order.
    Listed(Vec<ProviderRef>),
}

impl ProviderSet {
    /// An explicit provider list.
    pub fn listed<I, R>(refs: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ProviderRef>,
    {
        ProviderSet::Listed(refs.into_iter().map(Into::into).collect())
    }
}

/// Ask every provider about every subject individually.
///
/// Subjects the operation resolves to `None` are left out of that
/// provider's map; a provider that resolves nothing still appears with an
/// empty map.
pub fn collective_query<T>(
    providers: &[Arc<Provider>],
    subjects: &[&str],
    op: impl Fn(&Provider, &str) -> Result<Option<T>>,
) -> Result<PerProvider<IndexMap<String, T>>> {
    let mut results = PerProvider::new();
    for provider in providers {
        let mut resolved = IndexMap::new();
        for subject in subjects {
            if let Some(value) = op(provider, subject)? {
                resolved.insert((*subject).to_string(), value);
            }
        }
        results.insert(provider.name().clone(), resolved);
    }
    Ok(results)
}

/// Run a map-producing search per filter and merge the maps per provider.
///
/// Within one provider, a key found by several filters keeps its first
/// position and takes the value from the last filter that produced it.
pub fn collective_search_hash<V>(
    providers: &[Arc<Provider>],
    filters: &[&str],
    op: impl Fn(&Provider, &str) -> Result<IndexMap<String, V>>,
) -> Result<PerProvider<IndexMap<String, V>>> {
    let mut results: PerProvider<IndexMap<String, V>> = PerProvider::new();
    for provider in providers {
        let merged = results.entry(provider.name().clone()).or_default();
        for filter in filters {
            for (package, value) in op(provider, filter)? {
                merged.insert(package, value);
            }
        }
    }
    Ok(results)
}

/// Run a list-producing search per filter and concatenate the lists per
/// provider.
pub fn collective_search_array<T>(
    providers: &[Arc<Provider>],
    filters: &[&str],
    op: impl Fn(&Provider, &str) -> Result<Vec<T>>,
) -> Result<PerProvider<Vec<T>>> {
    let mut results: PerProvider<Vec<T>> = PerProvider::new();
    for provider in providers {
        let collected = results.entry(provider.name().clone()).or_default();
        for filter in filters {
            collected.extend(op(provider, filter)?);
        }
    }
    Ok(results)
}

impl ProviderRegistry {
    /// Turn a [`ProviderSet`] into concrete providers.
    ///
    /// Names resolve through [`ProviderRegistry::lookup`] (so the loader is
    /// consulted); a name that still cannot be resolved fails the whole set
    /// before any provider is queried.
    pub fn resolve_set(&mut self, set: &ProviderSet) -> Result<Vec<Arc<Provider>>> {
        match set {
            ProviderSet::Suitable => Ok(self.suitable_providers()),
            ProviderSet::Listed(refs) => refs
                .iter()
                .map(|provider_ref| match provider_ref {
                    ProviderRef::Handle(provider) => Ok(Arc::clone(provider)),
                    ProviderRef::Name(name) => {
                        self.lookup(name).ok_or_else(|| Error::UnknownProvider {
                            name: name.clone(),
                        })
                    }
                })
                .collect(),
        }
    }

    /// Candidate versions of each named package, per provider.
    pub fn package_candidates(
        &mut self,
        packages: &[&str],
        set: &ProviderSet,
    ) -> Result<PerProvider<IndexMap<String, String>>> {
        let providers = self.resolve_set(set)?;
        collective_query(&providers, packages, |provider, package| {
            provider.package_candidate(package)
        })
    }

    /// Known versions of each named package, per provider.
    pub fn package_versions(
        &mut self,
        packages: &[&str],
        set: &ProviderSet,
    ) -> Result<PerProvider<IndexMap<String, Vec<String>>>> {
        let providers = self.resolve_set(set)?;
        collective_query(&providers, packages, |provider, package| {
            provider.package_versions(package)
        })
    }

    /// Version records of each named package, per provider.
    pub fn package_records(
        &mut self,
        packages: &[&str],
        set: &ProviderSet,
    ) -> Result<PerProvider<IndexMap<String, VersionRecords>>> {
        let providers = self.resolve_set(set)?;
        collective_query(&providers, packages, |provider, package| {
            provider.package_records(package)
        })
    }

    /// Names of packages matching any of the prefixes, per provider.
    pub fn packages_with_prefixes(
        &mut self,
        prefixes: &[&str],
        set: &ProviderSet,
    ) -> Result<PerProvider<Vec<String>>> {
        let providers = self.resolve_set(set)?;
        collective_search_array(&providers, prefixes, |provider, prefix| {
            provider.packages_with_prefix(prefix)
        })
    }

    /// Candidate versions of packages matching the prefixes, per provider.
    pub fn package_candidates_with_prefixes(
        &mut self,
        prefixes: &[&str],
        set: &ProviderSet,
    ) -> Result<PerProvider<CandidateMap>> {
        let providers = self.resolve_set(set)?;
        collective_search_hash(&providers, prefixes, |provider, prefix| {
            provider.package_candidates_with_prefix(prefix)
        })
    }

    /// Version lists of packages matching the prefixes, per provider.
    pub fn package_versions_with_prefixes(
        &mut self,
        prefixes: &[&str],
        set: &ProviderSet,
    ) -> Result<PerProvider<VersionsMap>> {
        let providers = self.resolve_set(set)?;
        collective_search_hash(&providers, prefixes, |provider, prefix| {
            provider.package_versions_with_prefix(prefix)
        })
    }

    /// Version records of packages matching the prefixes, per provider.
    pub fn package_records_with_prefixes(
        &mut self,
        prefixes: &[&str],
        set: &ProviderSet,
    ) -> Result<PerProvider<RecordMap>> {
        let providers = self.resolve_set(set)?;
        collective_search_hash(&providers, prefixes, |provider, prefix| {
            provider.package_records_with_prefix(prefix)
        })
    }
}
