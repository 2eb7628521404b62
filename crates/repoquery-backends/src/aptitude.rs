//! The aptitude backend: apt with records from `aptitude show`
//!
//! Aptitude understands the same package names and patterns as apt and has
//! nothing of its own to say about candidate versions, so this backend
//! composes a base backend (the registered apt backend in practice) for
//! grammars, patterns, and candidates. Only record retrieval differs:
//! `aptitude -q=2 show ~n<pattern>`, run non-interactively, whose output
//! parses with the same field grammar as `apt-cache show`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use repoquery_core::Result;
use repoquery_core::backend::Backend;
use repoquery_core::types::{Pattern, Retrieval};
use repoquery_exec::{CommandRunner, Invocation};

use crate::apt;

/// Where Debian installs `aptitude`.
pub const DEFAULT_APTITUDE: &str = "/usr/bin/aptitude";

/// Queries package records through `aptitude`, delegating everything else
/// to a base backend.
pub struct AptitudeBackend {
    base: Arc<dyn Backend>,
    aptitude: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl AptitudeBackend {
    /// A backend delegating to `base`, with `aptitude` at its standard
    /// path.
    pub fn new(base: Arc<dyn Backend>, runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_command(base, runner, DEFAULT_APTITUDE)
    }

    /// A backend with an explicit `aptitude` location.
    pub fn with_command(
        base: Arc<dyn Backend>,
        runner: Arc<dyn CommandRunner>,
        aptitude: impl Into<PathBuf>,
    ) -> Self {
        Self {
            base,
            aptitude: aptitude.into(),
            runner,
        }
    }

    /// The `aptitude` executable this backend runs.
    pub fn command(&self) -> &Path {
        &self.aptitude
    }

    fn show_invocation(&self, pattern: &Pattern) -> Invocation {
        Invocation::new(&self.aptitude)
            .args(["-q=2", "show"])
            .arg(format!("~n{}", pattern.as_str()))
            .env("DEBIAN_FRONTEND", "noninteractive")
    }
}

impl Backend for AptitudeBackend {
    fn name_grammar(&self) -> Result<&Regex> {
        self.base.name_grammar()
    }

    fn prefix_grammar(&self) -> Result<&Regex> {
        self.base.prefix_grammar()
    }

    fn name_to_pattern(&self, package: &str) -> Result<Pattern> {
        self.base.name_to_pattern(package)
    }

    fn prefix_to_pattern(&self, prefix: &str) -> Result<Pattern> {
        self.base.prefix_to_pattern(prefix)
    }

    fn retrieve_candidates(&self, pattern: &Pattern) -> Result<Retrieval> {
        self.base.retrieve_candidates(pattern)
    }

    fn retrieve_records(&self, pattern: &Pattern) -> Result<Retrieval> {
        let output = match self.runner.run(&self.show_invocation(pattern)) {
            Ok(output) => output,
            Err(err) if apt::is_no_match(&err) => return Ok(Retrieval::empty()),
            Err(err) => return Err(err.into()),
        };
        let candidates = self.base.retrieve_candidates(pattern)?.candidates;
        Ok(Retrieval {
            candidates,
            records: apt::parse_show_records(&output),
        })
    }
}
