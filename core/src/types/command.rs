//! `Command`: one CLI invocation, described as data.
//!
//! A `Command` is never executed by itself; it is handed to a
//! `ProcessRunner` (spawn) or to `AwsCli` (spawn + classify + decode).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};


/// Program name plus ordered arguments, an optional working directory, and
/// environment overrides layered over the ambient process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl Command {
    pub fn new(program: &str) -> Self {
        Command {
            program: program.to_string(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    /// `aws <service> <operation>`
    pub fn aws(service: &str, operation: &str) -> Self {
        Command::new("aws").arg(service).arg(operation)
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    /// `--name value`
    pub fn flag(self, name: &str, value: &str) -> Self {
        self.arg(name).arg(value)
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Apply several overrides at once. Later keys win over earlier ones.
    pub fn envs<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (k, v) in vars {
            self.env.insert(k.to_string(), v.to_string());
        }
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn get_env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// The `<service> <operation>` pair of an `aws` invocation, used to name
    /// the operation in errors. Falls back to the whole command line.
    pub fn operation(&self) -> String {
        match self.args.as_slice() {
            [service, operation, ..] if self.program == "aws" => {
                format!("{} {}", service, operation)
            }
            _ => self.to_string(),
        }
    }
}

/// Shell-like rendering used for the operator trace. Environment overrides
/// are never shown since they carry credentials.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for a in &self.args {
            write!(f, " {}", a)?;
        }
        Ok(())
    }
}
