use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// AwsError
// ---------------------------------------------------------------------------

/// Every failure the runner, the poller, and the lookups can surface.
///
/// `CommandStderrNonEmpty` and `CommandNonZeroExit` are only produced when the
/// caller did not ask for suppression. `PollTimeout` is always fatal.
#[derive(Debug, Error)]
pub enum AwsError {
    /// The program could not be started at all (usually: not on `PATH`).
    #[error("failed to execute '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command wrote to stderr: [{command}]\n{stderr}")]
    CommandStderrNonEmpty { command: String, stderr: String },

    #[error("command returns: {code} [{command}]")]
    CommandNonZeroExit {
        command: String,
        /// `-1` when the process was terminated by a signal.
        code: i32,
        stderr: String,
    },

    #[error("{label}: gave up after {} seconds ({iterations} checks)", .elapsed.as_secs())]
    PollTimeout {
        label: String,
        elapsed: Duration,
        iterations: u32,
    },

    /// Output did not have the shape the operation expects.
    #[error("unexpected response from {operation}: {detail}")]
    UnexpectedResponse { operation: String, detail: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AwsError {
    pub fn unexpected(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        AwsError::UnexpectedResponse {
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        AwsError::Config(message.into())
    }

    /// Whether this is one of the two command-execution failures that a call
    /// site may opt out of.
    pub fn is_suppressible(&self) -> bool {
        matches!(
            self,
            AwsError::CommandStderrNonEmpty { .. } | AwsError::CommandNonZeroExit { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
