//! Help system: usage text for the `johanna` commands.
//!
//! Two levels of detail:
//!
//! 1. **Overview** (`johanna help`): every command with a one-line summary
//! 2. **Topic help** (`johanna help wait`, `johanna help config`): details
//!    for one command or one group


/// Generate help text for a given topic.
///
/// - `None` → overview
/// - `Some("wait")` → detailed help for wait
/// - `Some("lookup")` → the lookup commands
pub fn help_text(topic: Option<&str>) -> String {
    match topic {
        None => overview(),
        Some(t) => {
            if let Some(text) = command_help(t) {
                return text;
            }
            if let Some(text) = group_help(t) {
                return text;
            }
            format!("Unknown help topic: '{}'. Run 'johanna help' for a list of commands.", t)
        }
    }
}


fn overview() -> String {
    "\
johanna — run aws/eb commands and wait for resources to settle

Usage: johanna [--region <r>] [--config <path>] <command> [args...]

Passthrough commands:
  aws <args...>              Run the aws CLI, print its output (JSON pretty-printed)
  eb <args...>               Run the eb CLI, print its output

Wait commands:
  wait <target> [flags]      Poll until <target> holds or the wait times out

Lookup commands:
  vpc-ids                    Print the RDS and EB VPC ids found by CIDR
  role-arn <name>            Print the ARN of an IAM role
  topic-arn <name>           Print the ARN of an SNS topic
  temp-bucket                Print (creating if needed) the scratch S3 bucket

  help [topic]               Show help (this message, or help on a topic)

Run 'johanna help <command>' for detailed help on a command.
Run 'johanna help config' for the settings file format."
        .into()
}


fn group_help(group: &str) -> Option<String> {
    let text = match group {
        "passthrough" => "\
Passthrough commands — run a CLI with the configured credentials

  aws <args...>
    Runs 'aws' with AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY and
    AWS_DEFAULT_REGION taken from settings. Failures are logged, not fatal.

  eb <args...>
    Same for the Elastic Beanstalk CLI. Output is printed verbatim.",

        "lookup" => "\
Lookup commands — resolve names into ids

  vpc-ids
    Looks up the VPCs whose CIDR matches common.AWS_VPC_RDS and
    common.AWS_VPC_EB. Prints 'rds <id>' and 'eb <id>'; '-' when absent.

  role-arn <name>
    Prints the ARN of the IAM role. Fails when the role does not exist.

  topic-arn <name>
    Prints the ARN of the SNS topic with this name. Fails when absent.

  temp-bucket
    Prints the region's scratch bucket (<bucket_prefix>-<region>-<time>),
    creating it and waiting for it to appear when there is none.",

        "config" => "\
Settings file — YAML (JSON is accepted too)

  aws:
    AWS_ACCESS_KEY_ID: AKIA...
    AWS_SECRET_ACCESS_KEY: ...
    AWS_DEFAULT_REGION: ap-northeast-2
  common:
    AWS_VPC_RDS: 10.0.0.0/16
    AWS_VPC_EB: 10.1.0.0/16
  rds:
    ENGINE: aurora
  poll:
    interval_secs: 5
    max_wait_secs: 1800
  bucket_prefix: johanna

The file is --config <path>, else $JOHANNA_CONFIG, else the first of
config.yaml, config.yml, config.json in the current directory.
AWS_* variables in the environment override the file.
JOHANNA_LOG (or RUST_LOG) sets the log filter; the default is 'info'.",

        _ => return None,
    };
    Some(text.into())
}


fn command_help(command: &str) -> Option<String> {
    let text = match command {
        "aws" => "\
johanna aws — run the aws CLI

Usage: johanna [--region <r>] aws <service> <operation> [args...]

Arguments after 'aws' are passed through untouched. A JSON object on
stdout is printed with sorted keys and four-space indentation; anything
else is printed as-is. Errors from aws are logged and do not fail the run.

Examples:
  johanna aws ec2 describe-vpcs
  johanna --region us-east-1 aws s3api list-buckets",

        "eb" => "\
johanna eb — run the Elastic Beanstalk CLI

Usage: johanna [--region <r>] eb <args...>

Output is printed as-is. Errors from eb are logged and do not fail the run.",

        "wait" => "\
johanna wait — poll until a condition holds

Usage: johanna wait <target> [--vpc <id>] [--read-replica]

Targets:
  lambda-terminated        no Lambda functions remain
  rds-terminated           no DB instances, then no DB clusters remain
  elasticache-terminated   no cache clusters remain
  eb-terminated            every EC2 instance is terminated
  nat-available            every NAT gateway is available   [--vpc <id>]
  nat-deleted              every NAT gateway is deleted     [--vpc <id>]
  cache-address            print the first cache node's address
  rds-address              print the database endpoint      [--read-replica]

The state is checked immediately, then every poll.interval_secs seconds,
giving up after poll.max_wait_secs (5 and 1800 by default).",

        "vpc-ids" => "\
johanna vpc-ids — print the RDS and EB VPC ids

Usage: johanna vpc-ids

Looks up common.AWS_VPC_RDS and common.AWS_VPC_EB by CIDR block.",

        "role-arn" => "\
johanna role-arn — print the ARN of an IAM role

Usage: johanna role-arn <name>",

        "topic-arn" => "\
johanna topic-arn — print the ARN of an SNS topic

Usage: johanna topic-arn <name>",

        "temp-bucket" => "\
johanna temp-bucket — print the scratch S3 bucket

Usage: johanna temp-bucket

Reuses <bucket_prefix>-<region>-<digits> when it exists, otherwise creates
<bucket_prefix>-<region>-<unix time> and waits until it is reachable.",

        "help" => "\
johanna help — show help information

Usage: johanna help [topic]

  johanna help            # overview
  johanna help wait       # one command
  johanna help config     # settings file format",

        _ => return None,
    };
    Some(text.into())
}
