//! Operation: the typed interface for everything the `johanna` binary does.
//!
//! `cli::parse_args` turns argv into an `Invocation` (global options plus one
//! `Operation`), and `Sys::execute` runs it.
//!
//! | Group | Operations |
//! |-------|------------|
//! | Passthrough | `aws <args...>`, `eb <args...>` |
//! | Wait | `wait lambda-terminated`, `wait rds-terminated`, `wait elasticache-terminated`, `wait eb-terminated`, `wait nat-available`, `wait nat-deleted`, `wait cache-address`, `wait rds-address` |
//! | Lookup | `vpc-ids`, `role-arn`, `topic-arn`, `temp-bucket` |
//! | Help | `help` |

use std::path::PathBuf;


/// Parsed command line: global options and the operation to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Overrides the configured default region for this run.
    pub region: Option<String>,
    /// Explicit settings file.
    pub config: Option<PathBuf>,
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Run `aws` with the given arguments, failures suppressed.
    Aws { args: Vec<String> },
    /// Run `eb` with the given arguments, failures suppressed.
    Eb { args: Vec<String> },
    Wait { target: WaitTarget },
    VpcIds,
    RoleArn { name: String },
    TopicArn { name: String },
    TempBucket,
    Help { topic: Option<String> },
}

/// Conditions `johanna wait` can block on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitTarget {
    LambdaTerminated,
    RdsTerminated,
    ElasticacheTerminated,
    EbTerminated,
    NatAvailable { vpc_id: Option<String> },
    NatDeleted { vpc_id: Option<String> },
    CacheAddress,
    RdsAddress { read_replica: bool },
}

impl WaitTarget {
    pub const NAMES: &'static [&'static str] = &[
        "lambda-terminated",
        "rds-terminated",
        "elasticache-terminated",
        "eb-terminated",
        "nat-available",
        "nat-deleted",
        "cache-address",
        "rds-address",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WaitTarget::LambdaTerminated => "lambda-terminated",
            WaitTarget::RdsTerminated => "rds-terminated",
            WaitTarget::ElasticacheTerminated => "elasticache-terminated",
            WaitTarget::EbTerminated => "eb-terminated",
            WaitTarget::NatAvailable { .. } => "nat-available",
            WaitTarget::NatDeleted { .. } => "nat-deleted",
            WaitTarget::CacheAddress => "cache-address",
            WaitTarget::RdsAddress { .. } => "rds-address",
        }
    }
}
