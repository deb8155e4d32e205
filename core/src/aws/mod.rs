//! `AwsCli`: the command runner every caller goes through.
//!
//! Wraps a `ProcessRunner` with the operator's credentials and region,
//! traces each invocation, classifies failures (stderr output, non-zero
//! exit), and decodes stdout. `aws` output is decoded as JSON when it parses;
//! `eb` output is always kept as text.
//!
//! Failures are errors unless the call site passes `Suppress::Yes`, in which
//! case they are logged and a degraded result carrying whatever stdout was
//! captured is returned instead.

pub mod lookup;
pub mod response;

use tracing::{info, warn};

use crate::error::{AwsError, Result};
use crate::infrastructure::runner::ProcessRunner;
use crate::types::command::Command;
use crate::types::config::AwsConfig;
use crate::types::result::{CommandResult, Decoded, RawOutput};

pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";

/// Whether a command failure should abort the caller or be downgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppress {
    No,
    Yes,
}

impl Suppress {
    fn is_yes(self) -> bool {
        self == Suppress::Yes
    }
}


pub struct AwsCli<R: ProcessRunner> {
    config: AwsConfig,
    runner: R,
}

impl<R: ProcessRunner> AwsCli<R> {
    /// Fails with `AwsError::Config` when any of the three credential values
    /// is empty.
    pub fn new(config: AwsConfig, runner: R) -> Result<Self> {
        validate(&config)?;
        Ok(AwsCli { config, runner })
    }

    /// A runner sharing this one's process runner and credentials but bound
    /// to another region.
    pub fn with_region(&self, region: &str) -> AwsCli<&R> {
        let mut config = self.config.clone();
        if !region.is_empty() {
            config.default_region = region.to_string();
        }
        AwsCli {
            config,
            runner: &self.runner,
        }
    }

    pub fn region(&self) -> &str {
        &self.config.default_region
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// `aws <args...>`
    pub fn run_args(&self, args: &[String], suppress: Suppress) -> Result<CommandResult> {
        self.run(&Command::new("aws").args(args), suppress)
    }

    /// `eb <args...>`; the output is always text.
    pub fn run_eb(&self, args: &[String], suppress: Suppress) -> Result<CommandResult> {
        self.run(&Command::new("eb").args(args), suppress)
    }

    /// Execute one command to completion and classify the outcome.
    pub fn run(&self, cmd: &Command, suppress: Suppress) -> Result<CommandResult> {
        let cmd = cmd.clone().envs([
            (ENV_ACCESS_KEY_ID, self.config.access_key_id.as_str()),
            (ENV_SECRET_ACCESS_KEY, self.config.secret_access_key.as_str()),
            (ENV_DEFAULT_REGION, self.config.default_region.as_str()),
        ]);

        if suppress.is_yes() {
            info!(region = %self.region(), ">> command(ignore error): [{}] {}", self.region(), cmd);
        } else {
            info!(region = %self.region(), ">> command: [{}] {}", self.region(), cmd);
        }

        let raw = self.runner.execute(&cmd)?;
        classify(&cmd, raw, suppress)
    }
}


fn validate(config: &AwsConfig) -> Result<()> {
    let missing: Vec<&str> = [
        (ENV_ACCESS_KEY_ID, &config.access_key_id),
        (ENV_SECRET_ACCESS_KEY, &config.secret_access_key),
        (ENV_DEFAULT_REGION, &config.default_region),
    ]
    .iter()
    .filter(|(_, v)| v.trim().is_empty())
    .map(|(k, _)| *k)
    .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AwsError::config(format!("missing {}", missing.join(", "))))
    }
}


/// Stderr is checked before the exit code. Either one aborts unless
/// suppressed; a suppressed result is flagged `degraded`.
fn classify(cmd: &Command, raw: RawOutput, suppress: Suppress) -> Result<CommandResult> {
    let mut degraded = false;

    if !raw.stderr.is_empty() {
        let stderr = raw.stderr_text();
        warn!(command = %cmd, "{}", stderr.trim_end());
        if !suppress.is_yes() {
            return Err(AwsError::CommandStderrNonEmpty {
                command: cmd.to_string(),
                stderr,
            });
        }
        degraded = true;
    }

    if raw.exit_code != Some(0) {
        let code = raw.exit_code.unwrap_or(-1);
        warn!(command = %cmd, code, "command returns: {}", code);
        if !suppress.is_yes() {
            return Err(AwsError::CommandNonZeroExit {
                command: cmd.to_string(),
                code,
                stderr: raw.stderr_text(),
            });
        }
        degraded = true;
    }

    let decoded = match cmd.program() {
        "aws" => Decoded::from_aws_stdout(&raw.stdout),
        _ => Decoded::from_text_stdout(&raw.stdout),
    };

    Ok(CommandResult {
        exit_code: raw.exit_code,
        stdout: raw.stdout,
        stderr: raw.stderr,
        decoded,
        degraded,
    })
}
