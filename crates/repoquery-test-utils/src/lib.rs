//! Shared test utilities for the repoquery workspace
//!
//! Three pieces, usable together or alone:
//!
//! - [`ScriptedRunner`]: a `CommandRunner` replaying canned tool output
//! - [`MapBackend`]: an in-memory `Backend` for registry and aggregation
//!   scenarios that never touch a subprocess
//! - [`fixtures`]: realistic `apt-cache` and `make search` output texts

pub mod backend;
pub mod fixtures;
pub mod runner;

pub use backend::{MapBackend, RetrievalCounter};
pub use runner::ScriptedRunner;
