//! External command execution for repoquery
//!
//! Every package backend ultimately shells out to a native tool such as
//! `apt-cache`, `aptitude`, or `make search`. This crate isolates that
//! concern behind two small pieces:
//!
//! - [`Invocation`]: a value describing the command line to run
//! - [`CommandRunner`]: the trait that executes it, with [`SystemRunner`]
//!   as the production implementation
//!
//! Keeping execution behind a trait lets every other crate in the workspace
//! test its parsing and caching logic against scripted output instead of the
//! host's package tools.

pub mod error;
pub mod runner;

pub use error::{Error, Result};
pub use runner::{CommandRunner, Invocation, SystemRunner};
