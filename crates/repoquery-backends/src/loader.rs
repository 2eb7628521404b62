//! On-demand registration of the built-in providers
//!
//! [`BuiltinLoader`] knows the three shipped providers: `apt` over
//! `apt-cache`, `aptitude` layered on apt, and `ports` over a BSD ports
//! tree. Installed as a registry's loader it materialises providers
//! lazily on first lookup; [`builtin_registry`] returns a registry wired
//! up this way.

use std::sync::Arc;

use tracing::{debug, warn};

use repoquery_core::Result;
use repoquery_core::env::Environment;
use repoquery_core::provider::{Confine, Provider, ProviderSpec};
use repoquery_core::registry::{ProviderLoader, ProviderRegistry};
use repoquery_exec::{CommandRunner, SystemRunner};

use crate::apt::AptBackend;
use crate::aptitude::AptitudeBackend;
use crate::config::BackendConfig;
use crate::ports::PortsBackend;

/// The names the loader recognises, in registration order.
pub const BUILTIN_PROVIDERS: [&str; 3] = ["apt", "aptitude", "ports"];

// Native tools outrank layered ones: aptitude defers to plain apt on the
// platforms both claim.
const APT_SPECIFICITY: u32 = 10;
const APTITUDE_SPECIFICITY: u32 = 9;
const PORTS_SPECIFICITY: u32 = 10;

/// Registers the built-in providers into a registry on demand.
pub struct BuiltinLoader {
    config: BackendConfig,
    runner: Arc<dyn CommandRunner>,
}

impl BuiltinLoader {
    /// A loader running real subprocesses at the configured tool paths.
    pub fn new(config: BackendConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    /// A loader with an explicit command runner, scripted in tests.
    pub fn with_runner(config: BackendConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    fn register_apt(&self, registry: &mut ProviderRegistry) -> Result<Arc<Provider>> {
        let backend = AptBackend::with_command(Arc::clone(&self.runner), &self.config.apt_cache);
        registry.register(
            ProviderSpec::new("apt")
                .backend(Arc::new(backend))
                .confine(Confine::command(&self.config.apt_cache))
                .default_for(["debian", "ubuntu"])
                .specificity(APT_SPECIFICITY),
        )
    }

    fn ensure_apt(&self, registry: &mut ProviderRegistry) -> Result<Arc<Provider>> {
        match registry.get("apt") {
            Some(provider) => Ok(provider),
            None => self.register_apt(registry),
        }
    }

    /// Aptitude rides on apt: the apt provider is its parent, and its
    /// backend shares apt's grammars and candidate retrieval.
    fn register_aptitude(&self, registry: &mut ProviderRegistry) -> Result<Arc<Provider>> {
        let apt = self.ensure_apt(registry)?;
        let backend = AptitudeBackend::with_command(
            apt.backend(),
            Arc::clone(&self.runner),
            &self.config.aptitude,
        );
        registry.register(
            ProviderSpec::new("aptitude")
                .parent(apt)
                .backend(Arc::new(backend))
                .confine(Confine::command(&self.config.aptitude))
                .specificity(APTITUDE_SPECIFICITY),
        )
    }

    fn register_ports(&self, registry: &mut ProviderRegistry) -> Result<Arc<Provider>> {
        let ports_dir = self.config.ports_dir_for(registry.environment().os());
        let backend =
            PortsBackend::with_command(Arc::clone(&self.runner), &self.config.make, &ports_dir);
        registry.register(
            ProviderSpec::new("ports")
                .backend(Arc::new(backend))
                .confine(Confine::command(&self.config.make))
                .confine(Confine::path_exists(&ports_dir))
                .default_for(["freebsd", "openbsd", "netbsd"])
                .specificity(PORTS_SPECIFICITY),
        )
    }
}

impl ProviderLoader for BuiltinLoader {
    fn load(&self, name: &str, registry: &mut ProviderRegistry) -> bool {
        let result = match name {
            "apt" => self.register_apt(registry),
            "aptitude" => self.register_aptitude(registry),
            "ports" => self.register_ports(registry),
            _ => return false,
        };
        if let Err(error) = result {
            warn!(provider = name, %error, "builtin provider failed to register");
        }
        true
    }

    fn load_all(&self, registry: &mut ProviderRegistry) {
        for name in BUILTIN_PROVIDERS {
            if !registry.contains(name) {
                self.load(name, registry);
            }
        }
        debug!(count = registry.len(), "registered builtin providers");
    }
}

/// A registry for `env` that fills itself with the built-in providers.
pub fn builtin_registry(env: Environment, config: BackendConfig) -> ProviderRegistry {
    ProviderRegistry::with_loader(env, Arc::new(BuiltinLoader::new(config)))
}
