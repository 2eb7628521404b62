//! The backend contract every package tool implements
//!
//! A [`Backend`] wraps one native package tool: it validates package names
//! against that tool's grammar, turns names and prefixes into search
//! patterns, and runs the tool to harvest candidate versions and records.
//! Backends are stateless with respect to queries; caching happens in the
//! provider layer above them.
//!
//! Every method has a default body that reports
//! [`NotImplemented`](crate::Error::NotImplemented), so a backend only
//! implements the capabilities its tool actually has and callers get a
//! uniform error for the rest.

use regex::Regex;

use crate::error::{Error, Result};
use crate::types::{Pattern, Retrieval};

/// One native package tool, viewed through the operations the query layer
/// needs.
pub trait Backend: Send + Sync {
    /// The grammar a legal package name must fully match.
    ///
    /// The expression must be anchored: validation is a plain `is_match`.
    fn name_grammar(&self) -> Result<&Regex> {
        Err(Error::not_implemented("name_grammar"))
    }

    /// The grammar a legal package-name prefix must fully match.
    ///
    /// Prefix grammars are more permissive than name grammars and usually
    /// accept the empty string.
    fn prefix_grammar(&self) -> Result<&Regex> {
        Err(Error::not_implemented("prefix_grammar"))
    }

    /// Build the search pattern that matches exactly the named package.
    ///
    /// The name has already been validated against [`Self::name_grammar`].
    fn name_to_pattern(&self, package: &str) -> Result<Pattern> {
        let _ = package;
        Err(Error::not_implemented("name_to_pattern"))
    }

    /// Build the search pattern that matches every package starting with
    /// `prefix`.
    fn prefix_to_pattern(&self, prefix: &str) -> Result<Pattern> {
        let _ = prefix;
        Err(Error::not_implemented("prefix_to_pattern"))
    }

    /// Run the tool and harvest candidate versions for `pattern`.
    ///
    /// Backends whose tool reports records in the same run may fill
    /// [`Retrieval::records`] too; the harvest is merged into the caches as
    /// a whole.
    fn retrieve_candidates(&self, pattern: &Pattern) -> Result<Retrieval> {
        let _ = pattern;
        Err(Error::not_implemented("retrieve_candidates"))
    }

    /// Run the tool and harvest version records for `pattern`, along with
    /// the candidates needed to know which records are current.
    fn retrieve_records(&self, pattern: &Pattern) -> Result<Retrieval> {
        let _ = pattern;
        Err(Error::not_implemented("retrieve_records"))
    }
}

/// The backend a provider gets when registered without one: every
/// capability reports [`Error::NotImplemented`].
///
/// Registering such a provider is legal; it only fails when queried. This
/// keeps partially-configured registrations visible in listings instead of
/// silently absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseBackend;

impl Backend for BaseBackend {}
