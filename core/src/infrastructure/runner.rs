//! Process runner abstraction.
//!
//! `ProcessRunner` is the seam between the crate and the operating system.
//! `SystemRunner` is the production implementation that spawns the program
//! directly (no shell). `MockRunner` is the test double that records commands
//! and returns preset outputs.

use std::cell::RefCell;
use std::process::Stdio;

use tracing::debug;

use crate::error::{AwsError, Result};
use crate::types::command::Command;
use crate::types::result::RawOutput;

/// Runs a `Command` to completion and hands back everything it printed.
///
/// Implementations do not interpret the output; classification (stderr,
/// exit code) belongs to `AwsCli`.
pub trait ProcessRunner {
    fn execute(&self, cmd: &Command) -> Result<RawOutput>;
}

/// Lets a borrowed runner back a region-scoped `AwsCli`.
impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn execute(&self, cmd: &Command) -> Result<RawOutput> {
        (**self).execute(cmd)
    }
}

/// Production runner. The child inherits the ambient environment with the
/// command's overrides layered on top, and the calling thread blocks until it
/// exits.
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn execute(&self, cmd: &Command) -> Result<RawOutput> {
        let mut proc = std::process::Command::new(cmd.program());
        proc.args(cmd.get_args())
            .envs(cmd.get_env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cmd.get_cwd() {
            proc.current_dir(dir);
        }
        let output = proc.output().map_err(|e| AwsError::Spawn {
            program: cmd.program().to_string(),
            source: e,
        })?;
        debug!(
            program = cmd.program(),
            code = ?output.status.code(),
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "process exited"
        );
        Ok(RawOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Test-double runner that records commands and returns pre-configured
/// outputs in order.
///
/// A response of `Err(msg)` simulates a spawn failure. Once the script runs
/// out, the fallback is returned (an empty successful output by default).
pub struct MockRunner {
    responses: RefCell<Vec<std::result::Result<RawOutput, String>>>,
    fallback: RawOutput,
    commands: RefCell<Vec<Command>>,
}

impl MockRunner {
    pub fn with_responses(responses: Vec<std::result::Result<RawOutput, String>>) -> Self {
        let mut reversed = responses;
        reversed.reverse();
        MockRunner {
            responses: RefCell::new(reversed),
            fallback: RawOutput::success(""),
            commands: RefCell::new(Vec::new()),
        }
    }

    /// Convenience for the common case: every call succeeds with the given
    /// stdout.
    pub fn with_stdout(outputs: &[&str]) -> Self {
        MockRunner::with_responses(outputs.iter().map(|s| Ok(RawOutput::success(s))).collect())
    }

    pub fn new() -> Self {
        MockRunner::with_responses(Vec::new())
    }

    /// Output returned once the scripted responses are used up.
    pub fn with_fallback(mut self, fallback: RawOutput) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn executed_commands(&self) -> Vec<Command> {
        self.commands.borrow().clone()
    }

    /// The executed commands rendered as command lines.
    pub fn executed_lines(&self) -> Vec<String> {
        self.commands.borrow().iter().map(|c| c.to_string()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.commands.borrow().len()
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for MockRunner {
    fn execute(&self, cmd: &Command) -> Result<RawOutput> {
        self.commands.borrow_mut().push(cmd.clone());
        match self.responses.borrow_mut().pop() {
            Some(Ok(output)) => Ok(output),
            Some(Err(msg)) => Err(AwsError::Spawn {
                program: cmd.program().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, msg),
            }),
            None => Ok(self.fallback.clone()),
        }
    }
}
