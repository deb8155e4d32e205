use std::path::PathBuf;

use crate::command::{Invocation, Operation, WaitTarget};


/// Parse CLI arguments into an `Invocation`.
///
/// Global options (`--region`, `--config`) come before the operation. A bare
/// `--` before the operation is skipped, so `johanna -- aws ec2
/// describe-instances` works. Everything after `aws`/`eb` is passed through
/// untouched.
///
/// Arguments are expected WITHOUT the program name.
pub fn parse_args(args: &[&str]) -> Result<Invocation, String> {
    let mut region = None;
    let mut config = None;

    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--region" => {
                i += 1;
                region = Some(take_arg(args, i, "--region")?);
            }
            "--config" => {
                i += 1;
                config = Some(PathBuf::from(take_arg(args, i, "--config")?));
            }
            "--" => {}
            _ => break,
        }
        i += 1;
    }

    let rest = &args[i..];
    if rest.is_empty() {
        return Err("No command specified. Run 'johanna help' for usage.".into());
    }

    let operation = match rest[0] {
        "aws" => Operation::Aws { args: owned(&rest[1..]) },
        "eb" => Operation::Eb { args: owned(&rest[1..]) },
        "wait" => parse_wait(rest)?,
        "vpc-ids" => no_args(rest, Operation::VpcIds)?,
        "temp-bucket" => no_args(rest, Operation::TempBucket)?,
        "role-arn" => Operation::RoleArn { name: one_name(rest)? },
        "topic-arn" => Operation::TopicArn { name: one_name(rest)? },
        "help" | "--help" | "-h" => parse_help(rest),
        other if other.starts_with('-') => return Err(format!("Unknown option: '{}'", other)),
        other => return Err(format!("Unknown command: '{}'", other)),
    };

    Ok(Invocation { region, config, operation })
}


// ---------------------------------------------------------------------------
// Sub-parsers
// ---------------------------------------------------------------------------

/// `johanna help [topic]`
fn parse_help(args: &[&str]) -> Operation {
    let topic = if args.len() > 1 {
        Some(args[1..].join(" "))
    } else {
        None
    };
    Operation::Help { topic }
}

/// `johanna wait <target> [--vpc <id>] [--read-replica]`
fn parse_wait(args: &[&str]) -> Result<Operation, String> {
    if args.len() < 2 {
        return Err(format!("Usage: johanna wait <{}>", WaitTarget::NAMES.join("|")));
    }
    let name = args[1];
    let mut vpc_id = None;
    let mut read_replica = false;

    let rest = &args[2..];
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            "--vpc" if name.starts_with("nat-") => {
                i += 1;
                vpc_id = Some(take_arg(rest, i, "--vpc")?);
            }
            "--read-replica" if name == "rds-address" => read_replica = true,
            other => return Err(format!("Unknown flag for wait {}: '{}'", name, other)),
        }
        i += 1;
    }

    let target = match name {
        "lambda-terminated" => WaitTarget::LambdaTerminated,
        "rds-terminated" => WaitTarget::RdsTerminated,
        "elasticache-terminated" => WaitTarget::ElasticacheTerminated,
        "eb-terminated" => WaitTarget::EbTerminated,
        "nat-available" => WaitTarget::NatAvailable { vpc_id },
        "nat-deleted" => WaitTarget::NatDeleted { vpc_id },
        "cache-address" => WaitTarget::CacheAddress,
        "rds-address" => WaitTarget::RdsAddress { read_replica },
        other => return Err(format!("Unknown wait target: '{}'", other)),
    };
    Ok(Operation::Wait { target })
}

fn no_args(args: &[&str], op: Operation) -> Result<Operation, String> {
    if args.len() > 1 {
        return Err(format!("'{}' takes no arguments", args[0]));
    }
    Ok(op)
}

/// `johanna role-arn <name>` / `johanna topic-arn <name>`
fn one_name(args: &[&str]) -> Result<String, String> {
    match args {
        [_, name] => Ok(name.to_string()),
        _ => Err(format!("Usage: johanna {} <name>", args[0])),
    }
}


// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn take_arg(args: &[&str], index: usize, flag: &str) -> Result<String, String> {
    if index >= args.len() {
        return Err(format!("{} requires a value", flag));
    }
    Ok(args[index].into())
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
