//! Johanna core: an AWS CLI command runner and a convergence poller that
//! waits for asynchronous AWS state changes (teardowns, NAT gateways,
//! endpoint discovery).
//!
//! `aws::AwsCli` runs one `aws`/`eb` invocation with the configured
//! credentials and classifies the outcome. `convergence::poller::Poller`
//! re-issues describe commands until a predicate holds. `sys::Sys` dispatches
//! the operations the `johanna` binary exposes.

pub mod aws;
pub mod cli;
pub mod command;
pub mod convergence;
pub mod data;
pub mod error;
pub mod help;
pub mod infrastructure;
pub mod logging;
pub mod sys;
pub mod types;

pub use error::{AwsError, Result};
