//! johanna: run aws/eb commands and wait for AWS resources to settle.
//!
//! # Usage
//!
//! ```text
//! johanna aws ec2 describe-vpcs
//! johanna --region us-east-1 eb status
//! johanna wait rds-terminated
//! johanna wait nat-available --vpc vpc-0abc
//! johanna topic-arn alarms
//! ```

use std::path::PathBuf;
use std::process;

use johanna_core::cli::parse_args;
use johanna_core::command::{Invocation, Operation};
use johanna_core::data::settings;
use johanna_core::help::help_text;
use johanna_core::logging;
use johanna_core::sys::Sys;
use tracing::debug;


fn main() {
    let args: Vec<String> = std::env::args().collect();
    let arg_refs = user_args(&args);

    let invocation = match parse_args(&arg_refs) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("johanna: {}", e);
            process::exit(1);
        }
    };

    logging::init("info");

    match run(invocation) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(message) => {
            eprintln!("johanna: {}", message);
            process::exit(1);
        }
    }
}


fn run(invocation: Invocation) -> Result<String, String> {
    let Invocation { region, config, operation } = invocation;

    // Help is answered without touching settings or credentials.
    if let Operation::Help { topic } = &operation {
        return Ok(help_text(topic.as_deref()));
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let path = settings::resolve_path(config.as_deref(), &cwd).map_err(|e| e.to_string())?;
    debug!(path = %path.display(), "using settings file");
    let loaded = settings::load(&path).map_err(|e| e.to_string())?;

    let sys = Sys::new(loaded, region.as_deref()).map_err(|e| e.to_string())?;
    sys.execute(operation).map_err(|e| e.to_string())
}


/// Everything after the program name. An empty argv yields no arguments.
fn user_args(args: &[String]) -> Vec<&str> {
    args.get(1..)
        .unwrap_or_default()
        .iter()
        .map(|s| s.as_str())
        .collect()
}
