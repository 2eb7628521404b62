//! The apt backend: Debian package queries through `apt-cache`
//!
//! Candidate versions come from `apt-cache policy`, version records from
//! `apt-cache show`; both run with `-q=2 -a` so the output stays terse and
//! lists every version. Patterns are anchored regular expressions in
//! apt-cache's own syntax, built from validated names with `.` and `+`
//! escaped.
//!
//! An `apt-cache` run failing with "No packages found" means an empty
//! harvest, not a broken tool, and is downgraded accordingly.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::trace;

use repoquery_core::Result;
use repoquery_core::backend::Backend;
use repoquery_core::types::{CandidateMap, Pattern, RecordFields, RecordMap, Retrieval};
use repoquery_exec::{CommandRunner, Invocation};

use crate::text::paragraphs;

/// Where Debian installs `apt-cache`.
pub const DEFAULT_APT_CACHE: &str = "/usr/bin/apt-cache";

static NAME_GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9.+-]+$").unwrap());
static PREFIX_GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-z0-9][a-z0-9.+-]*)?$").unwrap());

// `apt-cache policy` stanzas: an unindented "name:" header line, then an
// indented "Candidate:" line naming the version.
static POLICY_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z0-9][a-z0-9.+-]*)?:\s*$").unwrap());
static POLICY_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+Candidate:\s*(\S+)\s*$").unwrap());

// `apt-cache show` record fields; continuation lines are indented and
// folded into the preceding field's value.
static RECORD_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)\s*:\s*(\S.*?)\s*$").unwrap());

static NO_MATCH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"No packages found").unwrap());

/// Whether an `apt-cache` failure means "nothing matched" rather than a
/// broken tool.
pub(crate) fn is_no_match(err: &repoquery_exec::Error) -> bool {
    err.stderr().is_some_and(|stderr| NO_MATCH.is_match(stderr))
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '.' | '+') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Extract `package -> candidate version` pairs from policy output,
/// skipping packages whose candidate is `(none)`.
pub(crate) fn parse_policy_output(output: &str) -> CandidateMap {
    let mut candidates = CandidateMap::new();
    let mut package: Option<String> = None;
    for line in output.lines() {
        if let Some(caps) = POLICY_HEADER.captures(line) {
            package = caps.get(1).map(|name| name.as_str().to_string());
            continue;
        }
        if let Some(caps) = POLICY_CANDIDATE.captures(line) {
            let version = &caps[1];
            if version != "(none)" {
                if let Some(header) = package.take() {
                    candidates.insert(header, version.to_string());
                }
            }
        }
    }
    candidates
}

/// Parse `apt-cache show` output into records keyed by package, then
/// version.
pub(crate) fn parse_show_records(output: &str) -> RecordMap {
    let mut records = RecordMap::new();
    for paragraph in paragraphs(output) {
        let Some(fields) = parse_record_paragraph(&paragraph) else {
            continue;
        };
        let (Some(package), Some(version)) =
            (fields.get("Package").cloned(), fields.get("Version").cloned())
        else {
            continue;
        };
        records.entry(package).or_default().insert(version, fields);
    }
    records
}

/// One show paragraph into fields. Paragraphs lacking a `Package` or
/// `Version` field line describe nothing installable and yield `None`.
fn parse_record_paragraph(lines: &[&str]) -> Option<RecordFields> {
    let has_field = |name: &str| lines.iter().any(|line| line.starts_with(name));
    if !has_field("Package:") || !has_field("Version:") {
        return None;
    }

    let mut fields = RecordFields::new();
    let mut current: Option<String> = None;
    for line in lines {
        if let Some(caps) = RECORD_FIELD.captures(line) {
            let name = caps[1].to_string();
            fields.insert(name.clone(), caps[2].to_string());
            current = Some(name);
        } else if line.chars().next().is_some_and(char::is_whitespace) {
            // Folded continuation of the field above, including the
            // bare-dot marker for blank description lines.
            if let Some(name) = &current
                && let Some(value) = fields.get_mut(name)
            {
                value.push('\n');
                value.push_str(line.trim_end());
            }
        } else {
            current = None;
        }
    }
    Some(fields)
}

/// Queries Debian package indexes through `apt-cache`.
pub struct AptBackend {
    apt_cache: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl AptBackend {
    /// A backend shelling out to `apt-cache` at its standard path.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_command(runner, DEFAULT_APT_CACHE)
    }

    /// A backend with an explicit `apt-cache` location.
    pub fn with_command(runner: Arc<dyn CommandRunner>, apt_cache: impl Into<PathBuf>) -> Self {
        Self {
            apt_cache: apt_cache.into(),
            runner,
        }
    }

    /// The `apt-cache` executable this backend runs.
    pub fn command(&self) -> &Path {
        &self.apt_cache
    }

    fn policy_invocation(&self, pattern: &Pattern) -> Invocation {
        Invocation::new(&self.apt_cache)
            .args(["-q=2", "-a", "policy"])
            .arg(pattern.as_str())
    }

    fn show_invocation(&self, pattern: &Pattern) -> Invocation {
        Invocation::new(&self.apt_cache)
            .args(["-q=2", "-a", "show"])
            .arg(pattern.as_str())
    }

    fn run_tolerating_no_match(&self, invocation: &Invocation) -> Result<Option<String>> {
        match self.runner.run(invocation) {
            Ok(output) => Ok(Some(output)),
            Err(err) if is_no_match(&err) => {
                trace!(command = %invocation, "apt-cache matched no packages");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl Backend for AptBackend {
    fn name_grammar(&self) -> Result<&Regex> {
        Ok(&NAME_GRAMMAR)
    }

    fn prefix_grammar(&self) -> Result<&Regex> {
        Ok(&PREFIX_GRAMMAR)
    }

    fn name_to_pattern(&self, package: &str) -> Result<Pattern> {
        Ok(Pattern::new(format!("^{}$", escape(package))))
    }

    fn prefix_to_pattern(&self, prefix: &str) -> Result<Pattern> {
        Ok(Pattern::new(format!("^{}", escape(prefix))))
    }

    fn retrieve_candidates(&self, pattern: &Pattern) -> Result<Retrieval> {
        let Some(output) = self.run_tolerating_no_match(&self.policy_invocation(pattern))? else {
            return Ok(Retrieval::empty());
        };
        Ok(Retrieval::from_candidates(parse_policy_output(&output)))
    }

    fn retrieve_records(&self, pattern: &Pattern) -> Result<Retrieval> {
        let Some(output) = self.run_tolerating_no_match(&self.show_invocation(pattern))? else {
            return Ok(Retrieval::empty());
        };
        let candidates = self.retrieve_candidates(pattern)?.candidates;
        Ok(Retrieval {
            candidates,
            records: parse_show_records(&output),
        })
    }
}
