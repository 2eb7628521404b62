//! Subprocess execution for package-tool invocations
//!
//! Backends describe a command line as an [`Invocation`] and hand it to a
//! [`CommandRunner`] for execution. The split lets tests substitute a
//! scripted runner while production code uses [`SystemRunner`], which shells
//! out via `std::process::Command`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

/// A fully-described command line: program, arguments, and extra environment
/// variables.
///
/// Invocations compare by value, so a scripted runner can key canned output
/// by the exact command a backend is expected to issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl Invocation {
    /// Start describing a command line for `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// The program to execute.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The argument list, in order.
    pub fn argv(&self) -> &[String] {
        &self.args
    }

    /// Extra environment variables, in insertion order.
    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs an [`Invocation`] to completion and captures its stdout.
pub trait CommandRunner: Send + Sync {
    /// Execute the command, returning captured stdout on success.
    ///
    /// A non-zero exit status is reported as [`Error::CommandFailed`] with
    /// the captured stderr; failure to start the program at all is
    /// [`Error::Spawn`].
    fn run(&self, invocation: &Invocation) -> Result<String>;
}

/// The production runner: executes invocations as real subprocesses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<String> {
        debug!(command = %invocation, "running external tool");

        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.argv());
        for (key, value) in invocation.envs() {
            cmd.env(key, value);
        }

        let output = cmd.output().map_err(|source| Error::Spawn {
            program: invocation.program().to_path_buf(),
            source,
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let code = output.status.code().unwrap_or(-1);
            Err(Error::CommandFailed {
                program: invocation.program().to_path_buf(),
                code,
                stderr,
            })
        }
    }
}
