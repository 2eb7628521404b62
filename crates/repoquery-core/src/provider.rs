//! Provider registrations and the per-provider query surface
//!
//! A [`Provider`] ties one registered name to a [`Backend`], a private
//! [`PackageCache`], and the confinement facts that decide where the
//! provider is usable. Registrations are described with a [`ProviderSpec`]
//! and resolved into providers by the registry; query code then talks to
//! the provider, which consults its cache before asking the backend.

use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::backend::Backend;
use crate::cache::PackageCache;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::types::{CandidateMap, RecordMap, VersionRecords, VersionsMap};

/// Specificity assigned to registrations that do not state one.
pub const DEFAULT_SPECIFICITY: u32 = 1;

/// A registered provider name: non-empty, no whitespace, compared and
/// stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderName(String);

impl ProviderName {
    pub fn new(name: &str) -> Result<Self> {
        let normalized = normalize(name);
        if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
            return Err(Error::InvalidProviderName {
                name: name.to_string(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lowercase a name the way lookups do, without validating it.
pub(crate) fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProviderName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProviderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One condition restricting where a provider is suitable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confine {
    /// An executable the provider shells out to must be runnable.
    Command(PathBuf),
    /// A path the provider reads (such as a ports tree) must exist.
    PathExists(PathBuf),
    /// The host OS must be one of the named systems.
    Os(Vec<String>),
}

impl Confine {
    /// A command confinement.
    pub fn command(program: impl Into<PathBuf>) -> Self {
        Confine::Command(program.into())
    }

    /// A path confinement.
    pub fn path_exists(path: impl Into<PathBuf>) -> Self {
        Confine::PathExists(path.into())
    }

    /// An OS confinement; names are stored lowercase.
    pub fn os<I, S>(systems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Confine::Os(
            systems
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        )
    }

    /// Whether the condition holds in `env`.
    pub fn holds(&self, env: &Environment) -> bool {
        match self {
            Confine::Command(program) => env.command_exists(program),
            Confine::PathExists(path) => env.path_exists(path),
            Confine::Os(systems) => systems.iter().any(|os| os == env.os()),
        }
    }
}

/// A reference to a provider in an aggregation list: either an already
/// resolved handle or a name to resolve through the registry.
#[derive(Clone)]
pub enum ProviderRef {
    Handle(Arc<Provider>),
    Name(String),
}

impl ProviderRef {
    pub fn name(name: impl Into<String>) -> Self {
        ProviderRef::Name(name.into())
    }
}

impl From<Arc<Provider>> for ProviderRef {
    fn from(provider: Arc<Provider>) -> Self {
        ProviderRef::Handle(provider)
    }
}

impl From<&str> for ProviderRef {
    fn from(name: &str) -> Self {
        ProviderRef::Name(name.to_string())
    }
}

impl From<String> for ProviderRef {
    fn from(name: String) -> Self {
        ProviderRef::Name(name)
    }
}

impl fmt::Debug for ProviderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderRef::Handle(provider) => {
                f.debug_tuple("Handle").field(provider.name()).finish()
            }
            ProviderRef::Name(name) => f.debug_tuple("Name").field(name).finish(),
        }
    }
}

/// Describes a registration before the registry resolves it.
///
/// ```
/// use repoquery_core::provider::{Confine, ProviderSpec};
///
/// let spec = ProviderSpec::new("apt")
///     .confine(Confine::command("/usr/bin/apt-cache"))
///     .default_for(["debian", "ubuntu"])
///     .specificity(10);
/// # let _ = spec;
/// ```
#[derive(Clone)]
pub struct ProviderSpec {
    pub(crate) name: String,
    pub(crate) parent: Option<ProviderRef>,
    pub(crate) backend: Option<Arc<dyn Backend>>,
    pub(crate) confines: Vec<Confine>,
    pub(crate) default_for: Vec<String>,
    pub(crate) specificity: u32,
    pub(crate) test_only: bool,
}

impl ProviderSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            backend: None,
            confines: Vec::new(),
            default_for: Vec::new(),
            specificity: DEFAULT_SPECIFICITY,
            test_only: false,
        }
    }

    /// Inherit the backend from another provider. A spec with both a
    /// parent and its own backend uses its own backend.
    pub fn parent(mut self, parent: impl Into<ProviderRef>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// The backend answering this provider's queries.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Add a suitability condition. All conditions must hold.
    pub fn confine(mut self, confine: Confine) -> Self {
        self.confines.push(confine);
        self
    }

    /// Mark the provider as the default choice on the named systems.
    pub fn default_for<I, S>(mut self, systems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.default_for
            .extend(systems.into_iter().map(|s| s.as_ref().to_lowercase()));
        self
    }

    /// How strongly this provider claims the systems it is default for.
    pub fn specificity(mut self, specificity: u32) -> Self {
        self.specificity = specificity;
        self
    }

    /// Exclude the provider from suitable-provider enumeration. Used by
    /// test scaffolding that must not leak into real aggregation.
    pub fn test_only(mut self) -> Self {
        self.test_only = true;
        self
    }
}

impl fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSpec")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("confines", &self.confines)
            .field("default_for", &self.default_for)
            .field("specificity", &self.specificity)
            .field("test_only", &self.test_only)
            .finish_non_exhaustive()
    }
}

/// A resolved registration: name, backend, confinement facts, and the
/// provider's private caches.
pub struct Provider {
    name: ProviderName,
    parent: Option<ProviderName>,
    backend: Arc<dyn Backend>,
    confines: Vec<Confine>,
    default_for: Vec<String>,
    specificity: u32,
    test_only: bool,
    cache: PackageCache,
}

impl Provider {
    pub(crate) fn from_parts(
        name: ProviderName,
        parent: Option<ProviderName>,
        backend: Arc<dyn Backend>,
        spec: &ProviderSpec,
    ) -> Self {
        Self {
            name,
            parent,
            backend,
            confines: spec.confines.clone(),
            default_for: spec.default_for.clone(),
            specificity: spec.specificity,
            test_only: spec.test_only,
            cache: PackageCache::new(),
        }
    }

    pub fn name(&self) -> &ProviderName {
        &self.name
    }

    /// The provider this one inherited its backend from, if any.
    pub fn parent(&self) -> Option<&ProviderName> {
        self.parent.as_ref()
    }

    pub fn specificity(&self) -> u32 {
        self.specificity
    }

    pub fn is_test_only(&self) -> bool {
        self.test_only
    }

    /// The backend answering this provider's queries.
    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    /// The provider's candidate and record stores.
    pub fn cache(&self) -> &PackageCache {
        &self.cache
    }

    /// Whether every confinement condition holds in `env`.
    pub fn is_suitable(&self, env: &Environment) -> bool {
        self.confines.iter().all(|confine| confine.holds(env))
    }

    /// Whether the provider claims `env`'s OS as one it is default for.
    pub fn is_default_for(&self, env: &Environment) -> bool {
        self.default_for.iter().any(|os| os == env.os())
    }

    /// Reject `package` unless it fully matches the backend's name
    /// grammar.
    pub fn validate_package_name(&self, package: &str) -> Result<()> {
        if self.backend.name_grammar()?.is_match(package) {
            Ok(())
        } else {
            Err(Error::IllFormedName {
                name: package.to_string(),
            })
        }
    }

    /// Reject `prefix` unless it fully matches the backend's prefix
    /// grammar.
    pub fn validate_package_prefix(&self, prefix: &str) -> Result<()> {
        if self.backend.prefix_grammar()?.is_match(prefix) {
            Ok(())
        } else {
            Err(Error::IllFormedPrefix {
                prefix: prefix.to_string(),
            })
        }
    }

    /// The candidate version of `package`, from cache when present,
    /// otherwise freshly retrieved.
    ///
    /// A fresh retrieval merges everything the backend reported, then the
    /// answer is read back from the cache; `Ok(None)` means the tool knows
    /// no such package. Only a cache miss validates the name, so a name
    /// already cached is served without re-validation.
    pub fn package_candidate(&self, package: &str) -> Result<Option<String>> {
        if let Some(version) = self.cache.candidate(package) {
            return Ok(Some(version));
        }
        self.validate_package_name(package)?;
        let pattern = self.backend.name_to_pattern(package)?;
        let harvest = self.backend.retrieve_candidates(&pattern)?.prune_orphans();
        self.cache.absorb(&harvest);
        Ok(self.cache.candidate(package))
    }

    /// All known version records of `package`, cache-first like
    /// [`Self::package_candidate`].
    pub fn package_records(&self, package: &str) -> Result<Option<VersionRecords>> {
        if let Some(records) = self.cache.records(package) {
            return Ok(Some(records));
        }
        self.validate_package_name(package)?;
        let pattern = self.backend.name_to_pattern(package)?;
        let harvest = self.backend.retrieve_records(&pattern)?.prune_orphans();
        self.cache.absorb(&harvest);
        Ok(self.cache.records(package))
    }

    /// The known versions of `package`: record keys, in report order.
    pub fn package_versions(&self, package: &str) -> Result<Option<Vec<String>>> {
        Ok(self
            .package_records(package)?
            .map(|records| records.keys().cloned().collect()))
    }

    /// Names of every package starting with `prefix`.
    pub fn packages_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .package_candidates_with_prefix(prefix)?
            .into_keys()
            .collect())
    }

    /// Candidate versions of every package starting with `prefix`.
    ///
    /// Prefix queries always retrieve fresh; the harvest is merged into
    /// the cache and returned as is.
    pub fn package_candidates_with_prefix(&self, prefix: &str) -> Result<CandidateMap> {
        self.validate_package_prefix(prefix)?;
        let pattern = self.backend.prefix_to_pattern(prefix)?;
        let harvest = self.backend.retrieve_candidates(&pattern)?.prune_orphans();
        self.cache.absorb(&harvest);
        Ok(harvest.candidates)
    }

    /// Version records of every package starting with `prefix`, freshly
    /// retrieved like [`Self::package_candidates_with_prefix`].
    pub fn package_records_with_prefix(&self, prefix: &str) -> Result<RecordMap> {
        self.validate_package_prefix(prefix)?;
        let pattern = self.backend.prefix_to_pattern(prefix)?;
        let harvest = self.backend.retrieve_records(&pattern)?.prune_orphans();
        self.cache.absorb(&harvest);
        Ok(harvest.records)
    }

    /// Version lists of every package starting with `prefix`.
    pub fn package_versions_with_prefix(&self, prefix: &str) -> Result<VersionsMap> {
        Ok(self
            .package_records_with_prefix(prefix)?
            .into_iter()
            .map(|(package, records)| (package, records.into_keys().collect()))
            .collect())
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("confines", &self.confines)
            .field("default_for", &self.default_for)
            .field("specificity", &self.specificity)
            .field("test_only", &self.test_only)
            .finish_non_exhaustive()
    }
}
