//! Built-in package-repository backends
//!
//! The concrete backends behind the `repoquery-core` provider registry:
//! Debian package indexes queried through `apt-cache` and `aptitude`, and
//! BSD ports trees queried through `make search`. [`BuiltinLoader`]
//! registers them into a registry on demand; [`BackendConfig`] carries the
//! external tool paths.
//!
//! ```
//! use repoquery_backends::{BackendConfig, builtin_registry};
//! use repoquery_core::env::Environment;
//!
//! let registry = builtin_registry(Environment::system(), BackendConfig::default());
//! # let _ = registry;
//! ```

pub mod apt;
pub mod aptitude;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod ports;

mod text;

pub use apt::AptBackend;
pub use aptitude::AptitudeBackend;
pub use config::BackendConfig;
pub use error::{Error, Result};
pub use loader::{BUILTIN_PROVIDERS, BuiltinLoader, builtin_registry};
pub use ports::PortsBackend;
