//! The provider registry: registration, removal, lookup, and deferred
//! loading
//!
//! The registry owns every resolved [`Provider`] in insertion order. Lookups
//! that miss are offered to a [`ProviderLoader`] before failing, so builtin
//! providers can be registered on first use instead of at startup; listing
//! an empty registry loads everything.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::backend::{Backend, BaseBackend};
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::provider::{Provider, ProviderName, ProviderRef, ProviderSpec, normalize};

/// Registers providers into a registry on demand.
///
/// Loaders are consulted with normalized (lowercase) names. `load` returns
/// whether the name is one the loader recognises, even if registration
/// ultimately added nothing; the registry warns on that mismatch.
pub trait ProviderLoader: Send + Sync {
    /// Register the named provider, if this loader knows it.
    fn load(&self, name: &str, registry: &mut ProviderRegistry) -> bool;

    /// Register every provider this loader can supply.
    fn load_all(&self, registry: &mut ProviderRegistry);
}

/// A loader that knows no providers. Registries built with [`ProviderRegistry::new`]
/// use it; everything must then be registered explicitly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLoader;

impl ProviderLoader for NullLoader {
    fn load(&self, _name: &str, _registry: &mut ProviderRegistry) -> bool {
        false
    }

    fn load_all(&self, _registry: &mut ProviderRegistry) {}
}

/// Holds provider registrations for one host environment.
pub struct ProviderRegistry {
    pub(crate) providers: IndexMap<ProviderName, Arc<Provider>>,
    pub(crate) loader: Arc<dyn ProviderLoader>,
    pub(crate) env: Environment,
    /// Memoized default provider; invalidated when its registration
    /// changes.
    pub(crate) default: Option<Arc<Provider>>,
}

impl ProviderRegistry {
    /// An empty registry with no loader.
    pub fn new(env: Environment) -> Self {
        Self::with_loader(env, Arc::new(NullLoader))
    }

    /// An empty registry that fills itself through `loader`.
    pub fn with_loader(env: Environment, loader: Arc<dyn ProviderLoader>) -> Self {
        Self {
            providers: IndexMap::new(),
            loader,
            env,
            default: None,
        }
    }

    /// The environment providers are confined against.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Resolve a [`ProviderSpec`] and store it under its normalized name.
    ///
    /// A name that is already registered is replaced: the old registration
    /// (and its caches) is dropped and the new one appends to the end of
    /// enumeration order. Parents are resolved before anything is touched,
    /// so a failed registration leaves the registry as it was.
    pub fn register(&mut self, spec: ProviderSpec) -> Result<Arc<Provider>> {
        let name = ProviderName::new(&spec.name)?;
        let parent = self.resolve_parent(&name, spec.parent.as_ref())?;

        let backend = match (&spec.backend, &parent) {
            (Some(backend), _) => Arc::clone(backend),
            (None, Some(parent)) => parent.backend(),
            (None, None) => Arc::new(BaseBackend) as Arc<dyn Backend>,
        };
        let parent_name = parent.map(|p| p.name().clone());

        if self.providers.shift_remove(name.as_str()).is_some() {
            debug!(provider = %name, "reloading provider registration");
            self.invalidate_default(&name);
        }

        let provider = Arc::new(Provider::from_parts(name.clone(), parent_name, backend, &spec));
        self.providers.insert(name, Arc::clone(&provider));
        Ok(provider)
    }

    fn resolve_parent(
        &mut self,
        child: &ProviderName,
        parent: Option<&ProviderRef>,
    ) -> Result<Option<Arc<Provider>>> {
        match parent {
            None => Ok(None),
            Some(ProviderRef::Handle(provider)) => Ok(Some(Arc::clone(provider))),
            Some(ProviderRef::Name(name)) => {
                let provider = self.lookup(name).ok_or_else(|| Error::ParentNotFound {
                    parent: name.clone(),
                    child: child.to_string(),
                })?;
                Ok(Some(provider))
            }
        }
    }

    /// Remove a registration, returning the removed provider.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<Provider>> {
        let normalized = normalize(name);
        let removed = self.providers.shift_remove(normalized.as_str());
        if let Some(provider) = &removed {
            self.invalidate_default(provider.name());
            debug!(provider = %provider.name(), "unregistered provider");
        }
        removed
    }

    fn invalidate_default(&mut self, name: &ProviderName) {
        if self.default.as_ref().is_some_and(|d| d.name() == name) {
            self.default = None;
        }
    }

    /// Find a provider by name, asking the loader on a miss.
    pub fn lookup(&mut self, name: &str) -> Option<Arc<Provider>> {
        let normalized = normalize(name);
        if let Some(provider) = self.providers.get(normalized.as_str()) {
            return Some(Arc::clone(provider));
        }

        let loader = Arc::clone(&self.loader);
        if loader.load(&normalized, self) && !self.providers.contains_key(normalized.as_str()) {
            warn!(provider = %normalized, "loader reported success but no provider was registered");
        }
        self.providers.get(normalized.as_str()).cloned()
    }

    /// Find a provider by name without consulting the loader.
    pub fn get(&self, name: &str) -> Option<Arc<Provider>> {
        self.providers.get(normalize(name).as_str()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(normalize(name).as_str())
    }

    /// All registered names in enumeration order, loading everything first
    /// if the registry is empty.
    pub fn list(&mut self) -> Vec<ProviderName> {
        self.load_all_if_empty();
        self.providers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub(crate) fn load_all_if_empty(&mut self) {
        if self.providers.is_empty() {
            let loader = Arc::clone(&self.loader);
            loader.load_all(self);
        }
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("env", &self.env)
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
