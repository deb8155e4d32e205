//! Lookups shared by the provisioning flows: VPC ids by CIDR, IAM/SNS ARNs,
//! the scratch S3 bucket, and EC2 name tags.

use serde_json::Value;
use tracing::info;

use crate::aws::response::{DescribeVpcs, GetRole, ListBuckets, ListTopics, Response, Role};
use crate::aws::{AwsCli, Suppress};
use crate::convergence::poller::Poller;
use crate::error::Result;
use crate::infrastructure::runner::ProcessRunner;
use crate::infrastructure::sleeper::Sleeper;
use crate::types::command::Command;
use crate::types::config::CommonConfig;
use crate::types::result::CommandResult;


/// The id of the single VPC with this CIDR block, if exactly one exists.
pub fn vpc_id_by_cidr<R: ProcessRunner>(aws: &AwsCli<R>, cidr: &str) -> Result<Option<String>> {
    let cmd = DescribeVpcs::command().arg(&format!("--filters=Name=cidr,Values={}", cidr));
    let vpcs = DescribeVpcs::decode(&aws.run(&cmd, Suppress::No)?)?.vpcs;
    Ok(match vpcs.as_slice() {
        [only] => Some(only.vpc_id.clone()),
        _ => None,
    })
}

/// `(rds_vpc_id, eb_vpc_id)`. A CIDR that is not configured yields `None`
/// without a call.
pub fn vpc_ids<R: ProcessRunner>(
    aws: &AwsCli<R>,
    common: &CommonConfig,
) -> Result<(Option<String>, Option<String>)> {
    let rds = match &common.vpc_rds_cidr {
        Some(cidr) => vpc_id_by_cidr(aws, cidr)?,
        None => None,
    };
    let eb = match &common.vpc_eb_cidr {
        Some(cidr) => vpc_id_by_cidr(aws, cidr)?,
        None => None,
    };
    Ok((rds, eb))
}

pub fn role_arn<R: ProcessRunner>(aws: &AwsCli<R>, role_name: &str) -> Result<String> {
    let cmd = GetRole::command().flag("--role-name", role_name);
    Ok(GetRole::decode(&aws.run(&cmd, Suppress::No)?)?.role.arn)
}

/// Probe for a role; a missing role is `None`, not an error.
pub fn iam_role<R: ProcessRunner>(aws: &AwsCli<R>, role_name: &str) -> Result<Option<Role>> {
    let cmd = GetRole::command().flag("--role-name", role_name);
    let result = aws.run(&cmd, Suppress::Yes)?;
    if result.degraded || result.decoded.is_empty() {
        return Ok(None);
    }
    Ok(Some(GetRole::decode(&result)?.role))
}

/// Probe for an inline role policy; a missing policy is `None`. The policy
/// document is returned as-is.
pub fn iam_role_policy<R: ProcessRunner>(
    aws: &AwsCli<R>,
    role_name: &str,
    policy_name: &str,
) -> Result<Option<Value>> {
    let cmd = Command::aws("iam", "get-role-policy")
        .flag("--role-name", role_name)
        .flag("--policy-name", policy_name);
    let result = aws.run(&cmd, Suppress::Yes)?;
    if result.degraded {
        return Ok(None);
    }
    Ok(result.decoded.as_json().cloned())
}

/// ARN of the topic whose name is `topic_name`, matched on the `:<name>`
/// suffix of the ARN.
pub fn topic_arn<R: ProcessRunner>(aws: &AwsCli<R>, topic_name: &str) -> Result<Option<String>> {
    let topics = ListTopics::decode(&aws.run(&ListTopics::command(), Suppress::No)?)?.topics;
    let suffix = format!(":{}", topic_name);
    Ok(topics
        .into_iter()
        .map(|t| t.topic_arn)
        .find(|arn| arn.ends_with(&suffix)))
}

pub fn set_name_tag<R: ProcessRunner>(aws: &AwsCli<R>, resource_id: &str, name: &str) -> Result<()> {
    let cmd = Command::aws("ec2", "create-tags")
        .flag("--resources", resource_id)
        .flag("--tags", &format!("Key=Name,Value={}", name));
    aws.run(&cmd, Suppress::No).map(|_| ())
}


/// `<prefix>-<region>-<digits>...`
pub fn is_temp_bucket(name: &str, prefix: &str, region: &str) -> bool {
    name.strip_prefix(&format!("{}-{}-", prefix, region))
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

/// Reuse the region's scratch bucket, or create `<prefix>-<region>-<now>`
/// and wait until `head-bucket` sees it.
pub fn temp_bucket<R: ProcessRunner, S: Sleeper>(
    aws: &AwsCli<R>,
    poller: &Poller<S>,
    prefix: &str,
    now_secs: u64,
) -> Result<String> {
    let region = aws.region().to_string();
    let buckets = ListBuckets::decode(&aws.run(&ListBuckets::command(), Suppress::No)?)?.buckets;
    if let Some(existing) = buckets.into_iter().find(|b| is_temp_bucket(&b.name, prefix, &region)) {
        return Ok(existing.name);
    }

    let bucket_name = format!("{}-{}-{}", prefix, region, now_secs);
    info!(bucket = %bucket_name, "creating scratch bucket");
    let create = Command::aws("s3api", "create-bucket")
        .flag("--bucket", &bucket_name)
        .flag("--region", &region)
        .flag(
            "--create-bucket-configuration",
            &format!("LocationConstraint={}", region),
        );
    aws.run(&create, Suppress::No)?;

    let head = Command::aws("s3api", "head-bucket").flag("--bucket", &bucket_name);
    poller.wait_until(aws, &head, "creating bucket", head_bucket_found)?;
    Ok(bucket_name)
}

/// A successful `head-bucket` prints nothing with aws-cli v1 and a
/// `{"BucketRegion": ...}` object with v2. Either one means the bucket is up.
fn head_bucket_found(result: &CommandResult) -> bool {
    result.decoded.is_empty()
        || result
            .decoded
            .as_json()
            .is_some_and(|v| v.get("BucketRegion").is_some())
}
