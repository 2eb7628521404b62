//! Backend configuration parsed from config.toml files
//!
//! The configuration carries the paths of the external package tools and an
//! optional ports tree override. Every field has a sensible default, so an
//! empty file (or no file at all) yields a working configuration for a stock
//! Debian or BSD host.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::apt::DEFAULT_APT_CACHE;
use crate::aptitude::DEFAULT_APTITUDE;
use crate::error::{Error, Result};
use crate::ports::DEFAULT_MAKE;

/// The standard ports tree on FreeBSD and OpenBSD.
pub const DEFAULT_PORTS_DIR: &str = "/usr/ports";

/// The standard pkgsrc tree on NetBSD.
pub const DEFAULT_PKGSRC_DIR: &str = "/usr/pkgsrc";

/// Tool locations for the built-in providers
///
/// Parsed from TOML:
///
/// ```
/// use repoquery_backends::BackendConfig;
///
/// let config = BackendConfig::parse(r#"
/// apt_cache = "/usr/local/bin/apt-cache"
/// ports_dir = "/home/ports"
/// "#).unwrap();
///
/// assert_eq!(config.apt_cache.to_str(), Some("/usr/local/bin/apt-cache"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Path of the `apt-cache` executable
    pub apt_cache: PathBuf,

    /// Path of the `aptitude` executable
    pub aptitude: PathBuf,

    /// Path of the `make` executable used for ports searches
    pub make: PathBuf,

    /// Ports tree override; when absent the tree is chosen per platform
    pub ports_dir: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            apt_cache: PathBuf::from(DEFAULT_APT_CACHE),
            aptitude: PathBuf::from(DEFAULT_APTITUDE),
            make: PathBuf::from(DEFAULT_MAKE),
            ports_dir: None,
        }
    }
}

impl BackendConfig {
    /// Parse a configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let config: BackendConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        Self::parse(&content)
    }

    /// The ports tree to search on the given platform.
    ///
    /// An explicit `ports_dir` wins; otherwise NetBSD gets the pkgsrc tree
    /// and every other platform the ports tree.
    pub fn ports_dir_for(&self, os: &str) -> PathBuf {
        match &self.ports_dir {
            Some(dir) => dir.clone(),
            None if os == "netbsd" => PathBuf::from(DEFAULT_PKGSRC_DIR),
            None => PathBuf::from(DEFAULT_PORTS_DIR),
        }
    }
}
