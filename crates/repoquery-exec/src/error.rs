//! Error types for repoquery-exec

use std::path::PathBuf;

/// Result type for repoquery-exec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running an external tool
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The program could not be launched at all
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The program ran but exited with a non-zero status
    #[error("{program} exited with status {code}: {stderr}")]
    CommandFailed {
        program: PathBuf,
        code: i32,
        stderr: String,
    },
}

impl Error {
    /// The stderr captured from a failed run, if the program ran at all.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Error::CommandFailed { stderr, .. } => Some(stderr),
            Error::Spawn { .. } => None,
        }
    }
}
