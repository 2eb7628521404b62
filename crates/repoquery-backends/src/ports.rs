//! The ports backend: BSD ports-tree queries through `make search`
//!
//! One `make -C <portsdir> search name=<pattern>` run answers both
//! candidate and record questions: the index paragraphs it prints carry
//! the port's name-version string plus its metadata fields, and the first
//! version seen for a package is its candidate. Paragraphs describing
//! moved ports or missing mandatory fields are skipped.
//!
//! Unlike apt there is no "nothing matched" exit to tolerate: a failing
//! `make` is always an error.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use repoquery_core::Result;
use repoquery_core::backend::Backend;
use repoquery_core::types::{Pattern, RecordFields, Retrieval};
use repoquery_exec::{CommandRunner, Invocation};

use crate::text::paragraphs;

/// Where the BSDs install `make`.
pub const DEFAULT_MAKE: &str = "/usr/bin/make";

/// The version suffix a port's name-version string ends with, as a
/// pattern fragment for [`Backend::name_to_pattern`].
const VERSION_SUFFIX: &str = "-[A-Za-z0-9][A-Za-z0-9.,_]*";

static NAME_GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.+-]*$").unwrap());
static PREFIX_GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-zA-Z0-9][a-zA-Z0-9_.+-]*)?$").unwrap());

// Index paragraph fields are single-line, possibly indented.
static INDEX_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z0-9_-]+)\s*:\s*(\S(?:.*\S)?)\s*$").unwrap());

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '.' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Parse `make search` output into a combined harvest: records keyed by
/// package and version, candidates from the first version seen per
/// package.
pub(crate) fn parse_search_output(output: &str) -> Retrieval {
    let mut retrieval = Retrieval::empty();
    for paragraph in paragraphs(output) {
        let Some((package, version, record)) = parse_index_paragraph(&paragraph) else {
            continue;
        };
        retrieval
            .candidates
            .entry(package.clone())
            .or_insert_with(|| version.clone());
        retrieval
            .records
            .entry(package)
            .or_default()
            .insert(version, record);
    }
    retrieval
}

/// One index paragraph into its package, version, and fields.
///
/// Skips moved ports, paragraphs without `Port` and `Path` fields, and
/// `Port` values the name/version split cannot handle.
fn parse_index_paragraph(lines: &[&str]) -> Option<(String, String, RecordFields)> {
    let has_field = |name: &str| lines.iter().any(|line| line.starts_with(name));
    if has_field("Moved:") || !has_field("Path:") || !has_field("Port:") {
        return None;
    }

    let mut fields = RecordFields::new();
    for line in lines {
        if let Some(caps) = INDEX_FIELD.captures(line) {
            fields.insert(caps[1].to_string(), caps[2].to_string());
        }
    }

    let port = fields.get("Port")?.clone();
    let Some((package, version)) = port.rsplit_once('-') else {
        debug!(port = %port, "skipping index entry without a version suffix");
        return None;
    };
    let package = package.to_string();
    let version = version.to_string();
    fields.insert("Version".to_string(), version.clone());
    fields.insert("Package".to_string(), package.clone());
    Some((package, version, fields))
}

/// Queries a BSD ports or pkgsrc tree through `make search`.
pub struct PortsBackend {
    make: PathBuf,
    ports_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl PortsBackend {
    /// A backend searching `ports_dir` with `make` at its standard path.
    pub fn new(runner: Arc<dyn CommandRunner>, ports_dir: impl Into<PathBuf>) -> Self {
        Self::with_command(runner, DEFAULT_MAKE, ports_dir)
    }

    /// A backend with an explicit `make` location.
    pub fn with_command(
        runner: Arc<dyn CommandRunner>,
        make: impl Into<PathBuf>,
        ports_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            make: make.into(),
            ports_dir: ports_dir.into(),
            runner,
        }
    }

    /// The `make` executable this backend runs.
    pub fn command(&self) -> &Path {
        &self.make
    }

    /// The ports tree being searched.
    pub fn ports_dir(&self) -> &Path {
        &self.ports_dir
    }

    fn search_invocation(&self, pattern: &Pattern) -> Invocation {
        Invocation::new(&self.make)
            .arg("-C")
            .arg(self.ports_dir.to_string_lossy())
            .arg("search")
            .arg(format!("name={}", pattern.as_str()))
    }

    fn search(&self, pattern: &Pattern) -> Result<Retrieval> {
        let output = self.runner.run(&self.search_invocation(pattern))?;
        Ok(parse_search_output(&output))
    }
}

impl Backend for PortsBackend {
    fn name_grammar(&self) -> Result<&Regex> {
        Ok(&NAME_GRAMMAR)
    }

    fn prefix_grammar(&self) -> Result<&Regex> {
        Ok(&PREFIX_GRAMMAR)
    }

    fn name_to_pattern(&self, package: &str) -> Result<Pattern> {
        Ok(Pattern::new(format!(
            "^{}({})$",
            escape(package),
            VERSION_SUFFIX
        )))
    }

    fn prefix_to_pattern(&self, prefix: &str) -> Result<Pattern> {
        Ok(Pattern::new(format!("^{}", escape(prefix))))
    }

    fn retrieve_candidates(&self, pattern: &Pattern) -> Result<Retrieval> {
        self.search(pattern)
    }

    fn retrieve_records(&self, pattern: &Pattern) -> Result<Retrieval> {
        self.search(pattern)
    }
}
