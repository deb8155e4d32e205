//! Command output: the raw bytes a process produced, and the classified,
//! decoded `CommandResult` the rest of the crate works with.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AwsError, Result};


/// What a process produced, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RawOutput {
    pub fn success(stdout: &str) -> Self {
        RawOutput {
            exit_code: Some(0),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }

    pub fn failure(code: i32, stderr: &str) -> Self {
        RawOutput {
            exit_code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.as_bytes().to_vec();
        self
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}


/// How stdout was understood.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Json(Value),
    /// Non-JSON output (always the case for `eb`).
    Text(String),
    /// Nothing on stdout, or a suppressed failure with nothing to show.
    Empty,
}

impl Decoded {
    /// JSON if the text parses, otherwise the text unchanged.
    pub fn from_aws_stdout(stdout: &[u8]) -> Self {
        let text = String::from_utf8_lossy(stdout);
        if text.trim().is_empty() {
            return Decoded::Empty;
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(v) => Decoded::Json(v),
            Err(_) => Decoded::Text(text.into_owned()),
        }
    }

    pub fn from_text_stdout(stdout: &[u8]) -> Self {
        let text = String::from_utf8_lossy(stdout);
        if text.is_empty() {
            Decoded::Empty
        } else {
            Decoded::Text(text.into_owned())
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Decoded::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Decoded::Empty => true,
            Decoded::Json(Value::Object(m)) => m.is_empty(),
            _ => false,
        }
    }
}


/// Outcome of one invocation. Built once by the runner, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub decoded: Decoded,
    /// True when a failure was suppressed at the caller's request.
    pub degraded: bool,
}

impl CommandResult {
    /// Decode the JSON payload into a typed response schema.
    ///
    /// Text or empty output is an `UnexpectedResponse`, as is JSON that does
    /// not fit `T`; callers that can live with absence should use `Option`
    /// fields in `T` rather than catching this.
    pub fn parse<T: DeserializeOwned>(&self, operation: &str) -> Result<T> {
        match &self.decoded {
            Decoded::Json(v) => serde_json::from_value(v.clone())
                .map_err(|e| AwsError::unexpected(operation, e.to_string())),
            Decoded::Text(t) => Err(AwsError::unexpected(
                operation,
                format!("expected JSON, got text: {}", truncate(t, 120)),
            )),
            Decoded::Empty => Err(AwsError::unexpected(operation, "empty output")),
        }
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}


fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
