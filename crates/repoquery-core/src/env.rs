//! Host environment facts used to confine providers
//!
//! Providers are confined by operating system, by required executables, and
//! by required paths. [`Environment`] answers those questions for the host
//! the registry runs on; the [`Probe`] trait behind it lets tests fabricate
//! arbitrary hosts without touching the real filesystem.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Answers filesystem questions on behalf of an [`Environment`].
pub trait Probe: Send + Sync {
    /// Whether `path` exists on the host.
    fn path_exists(&self, path: &Path) -> bool;

    /// Whether `program` can be executed.
    ///
    /// Absolute paths are checked directly; bare names are searched on
    /// `PATH`.
    fn command_exists(&self, program: &Path) -> bool {
        if program.is_absolute() {
            return self.path_exists(program);
        }
        let Some(path_var) = std::env::var_os("PATH") else {
            return false;
        };
        std::env::split_paths(&path_var).any(|dir| self.path_exists(&dir.join(program)))
    }
}

/// The production probe: consults the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl Probe for SystemProbe {
    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// The host a provider registry selects providers for: an operating-system
/// name plus a probe for executables and paths.
///
/// OS names are lowercase distribution identifiers (`"debian"`, `"ubuntu"`,
/// `"freebsd"`), matching what provider registrations declare in their
/// confinements and defaults.
#[derive(Clone)]
pub struct Environment {
    os: String,
    probe: Arc<dyn Probe>,
}

impl Environment {
    /// Detect the running host: OS from `/etc/os-release` (or the platform
    /// name where that file does not exist), probing the real filesystem.
    pub fn system() -> Self {
        Self::with_probe(detect_os(), Arc::new(SystemProbe))
    }

    /// An environment for the given OS name, probing the real filesystem.
    pub fn new(os: impl Into<String>) -> Self {
        Self::with_probe(os, Arc::new(SystemProbe))
    }

    /// An environment with a custom probe. This is the constructor tests
    /// use to fabricate hosts.
    pub fn with_probe(os: impl Into<String>, probe: Arc<dyn Probe>) -> Self {
        Self {
            os: os.into().to_lowercase(),
            probe,
        }
    }

    /// The lowercase operating-system name.
    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn path_exists(&self, path: &Path) -> bool {
        self.probe.path_exists(path)
    }

    pub fn command_exists(&self, program: &Path) -> bool {
        self.probe.command_exists(program)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment").field("os", &self.os).finish()
    }
}

/// Detect the OS name for the running host.
fn detect_os() -> String {
    os_release_id(Path::new("/etc/os-release"))
        .unwrap_or_else(|| std::env::consts::OS.to_string())
}

/// Extract the `ID=` value from an os-release file.
fn os_release_id(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    for line in contents.lines() {
        if let Some(value) = line.strip_prefix("ID=") {
            let id = value.trim().trim_matches('"').to_lowercase();
            if !id.is_empty() {
                return Some(id);
            }
        }
    }
    None
}

/// A probe backed by an explicit list of existing paths.
///
/// Useful wherever a test needs "a host where `/usr/bin/apt-cache` exists"
/// without creating files.
#[derive(Debug, Default, Clone)]
pub struct StaticProbe {
    paths: Vec<PathBuf>,
}

impl StaticProbe {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl Probe for StaticProbe {
    fn path_exists(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    fn command_exists(&self, program: &Path) -> bool {
        self.paths.iter().any(|p| p == program)
    }
}
