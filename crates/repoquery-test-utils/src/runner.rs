//! [`ScriptedRunner`]: a [`CommandRunner`] answering from a script
//!
//! Backend tests key canned stdout by the exact [`Invocation`] the backend
//! is expected to issue. Any invocation outside the script fails with a
//! recognisable `CommandFailed`, so a drifting command line shows up as a
//! test failure instead of a hang or a real subprocess.

use std::collections::HashMap;
use std::sync::Mutex;

use repoquery_exec::{CommandRunner, Error, Invocation, Result};

#[derive(Clone)]
enum Response {
    Stdout(String),
    Failure { code: i32, stderr: String },
}

/// A command runner that replays scripted responses and records every call.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: Mutex<HashMap<Invocation, Response>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script successful stdout for an invocation.
    pub fn respond(&self, invocation: Invocation, stdout: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(invocation, Response::Stdout(stdout.into()));
    }

    /// Script a non-zero exit for an invocation.
    pub fn fail(&self, invocation: Invocation, code: i32, stderr: impl Into<String>) {
        self.responses.lock().unwrap().insert(
            invocation,
            Response::Failure {
                code,
                stderr: stderr.into(),
            },
        );
    }

    /// Every invocation run so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<String> {
        self.calls.lock().unwrap().push(invocation.clone());
        match self.responses.lock().unwrap().get(invocation).cloned() {
            Some(Response::Stdout(stdout)) => Ok(stdout),
            Some(Response::Failure { code, stderr }) => Err(Error::CommandFailed {
                program: invocation.program().to_path_buf(),
                code,
                stderr,
            }),
            None => Err(Error::CommandFailed {
                program: invocation.program().to_path_buf(),
                code: 127,
                stderr: format!("unscripted invocation: {invocation}"),
            }),
        }
    }
}
