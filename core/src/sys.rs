use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::aws::lookup;
use crate::aws::{AwsCli, Suppress};
use crate::command::{Operation, WaitTarget};
use crate::convergence::policy::PollPolicy;
use crate::convergence::poller::Poller;
use crate::convergence::waits::DbEndpoint;
use crate::error::{AwsError, Result};
use crate::help;
use crate::infrastructure::runner::{ProcessRunner, SystemRunner};
use crate::infrastructure::sleeper::{Sleeper, ThreadSleeper};
use crate::types::config::Settings;
use crate::types::result::{CommandResult, Decoded};


/// Runtime for one `johanna` invocation. Owns the settings, the command
/// runner, and the poller, and dispatches operations.
///
/// The runner and sleeper are type parameters so tests can drive the whole
/// dispatch with `MockRunner` and `RecordingSleeper`.
pub struct Sys<R: ProcessRunner = SystemRunner, S: Sleeper = ThreadSleeper> {
    settings: Settings,
    aws: AwsCli<R>,
    poller: Poller<S>,
}


impl Sys {
    /// Build a Sys that runs real subprocesses and really sleeps.
    /// `region` overrides the configured default region when non-empty.
    pub fn new(settings: Settings, region: Option<&str>) -> Result<Sys> {
        Sys::from_parts(settings, region, SystemRunner, ThreadSleeper)
    }
}


impl<R: ProcessRunner, S: Sleeper> Sys<R, S> {
    pub fn from_parts(
        mut settings: Settings,
        region: Option<&str>,
        runner: R,
        sleeper: S,
    ) -> Result<Self> {
        if let Some(region) = region.filter(|r| !r.is_empty()) {
            settings.aws.default_region = region.to_string();
        }
        let policy = PollPolicy::from_settings(&settings.poll)?;
        let aws = AwsCli::new(settings.aws.clone(), runner)?;
        Ok(Sys {
            settings,
            aws,
            poller: Poller::with_sleeper(policy, sleeper),
        })
    }

    /// The single dispatch method. Every operation enters here and yields
    /// the text to print on stdout (possibly empty).
    pub fn execute(&self, op: Operation) -> Result<String> {
        match op {
            Operation::Aws { args } => self.cmd_aws(&args),
            Operation::Eb { args } => self.cmd_eb(&args),
            Operation::Wait { target } => self.cmd_wait(target),
            Operation::VpcIds => self.cmd_vpc_ids(),
            Operation::RoleArn { name } => lookup::role_arn(&self.aws, &name),
            Operation::TopicArn { name } => self.cmd_topic_arn(&name),
            Operation::TempBucket => lookup::temp_bucket(
                &self.aws,
                &self.poller,
                &self.settings.bucket_prefix,
                now_secs(),
            ),
            Operation::Help { topic } => Ok(help::help_text(topic.as_deref())),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn aws(&self) -> &AwsCli<R> {
        &self.aws
    }

    pub fn poller(&self) -> &Poller<S> {
        &self.poller
    }


    // ---- passthrough ----

    fn cmd_aws(&self, args: &[String]) -> Result<String> {
        let result = self.aws.run_args(args, Suppress::Yes)?;
        render(&result)
    }

    fn cmd_eb(&self, args: &[String]) -> Result<String> {
        let result = self.aws.run_eb(args, Suppress::Yes)?;
        Ok(trim_newline(result.stdout_text()))
    }


    // ---- waits ----

    fn cmd_wait(&self, target: WaitTarget) -> Result<String> {
        let aws = &self.aws;
        let poller = &self.poller;
        let output = match &target {
            WaitTarget::LambdaTerminated => poller.wait_terminate_lambda(aws).map(|_| String::new()),
            WaitTarget::RdsTerminated => poller.wait_terminate_rds(aws).map(|_| String::new()),
            WaitTarget::ElasticacheTerminated => {
                poller.wait_terminate_elasticache(aws).map(|_| String::new())
            }
            WaitTarget::EbTerminated => poller.wait_terminate_eb(aws).map(|_| String::new()),
            WaitTarget::NatAvailable { vpc_id } => poller
                .wait_create_nat_gateway(aws, vpc_id.as_deref())
                .map(|_| String::new()),
            WaitTarget::NatDeleted { vpc_id } => poller
                .wait_delete_nat_gateway(aws, vpc_id.as_deref())
                .map(|_| String::new()),
            WaitTarget::CacheAddress => poller.elasticache_address(aws),
            WaitTarget::RdsAddress { read_replica } => {
                let rds = self.settings.rds.as_ref().ok_or_else(|| {
                    AwsError::config("rds.ENGINE is required for wait rds-address")
                })?;
                let endpoint = if *read_replica {
                    DbEndpoint::ReadReplica
                } else {
                    DbEndpoint::Primary
                };
                poller.rds_address(aws, rds, endpoint)
            }
        }?;
        info!(target = target.name(), "wait finished");
        Ok(output)
    }


    // ---- lookups ----

    fn cmd_vpc_ids(&self) -> Result<String> {
        let (rds, eb) = lookup::vpc_ids(&self.aws, &self.settings.common)?;
        Ok(format!(
            "rds {}\neb {}",
            rds.as_deref().unwrap_or("-"),
            eb.as_deref().unwrap_or("-")
        ))
    }

    fn cmd_topic_arn(&self, name: &str) -> Result<String> {
        lookup::topic_arn(&self.aws, name)?
            .ok_or_else(|| AwsError::unexpected("sns list-topics", format!("no topic named '{}'", name)))
    }
}


// ---------------------------------------------------------------------------
// Output rendering
// ---------------------------------------------------------------------------

/// JSON objects print with sorted keys and four-space indentation; anything
/// else prints as the process wrote it.
fn render(result: &CommandResult) -> Result<String> {
    match &result.decoded {
        Decoded::Json(value @ Value::Object(_)) => pretty_json(value),
        _ => Ok(trim_newline(result.stdout_text())),
    }
}

/// `serde_json::Map` is ordered by key, so serializing a `Value` sorts it.
fn pretty_json(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| AwsError::unexpected("render", e.to_string()))?;
    String::from_utf8(buf).map_err(|e| AwsError::unexpected("render", e.to_string()))
}

fn trim_newline(mut text: String) -> String {
    while text.ends_with('\n') || text.ends_with('\r') {
        text.pop();
    }
    text
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::testing;
    use crate::infrastructure::runner::MockRunner;
    use crate::infrastructure::sleeper::RecordingSleeper;
    use crate::types::config::{CommonConfig, PollSettings, RdsConfig};
    use crate::types::result::RawOutput;

    fn settings() -> Settings {
        Settings {
            aws: testing::config(),
            common: CommonConfig::default(),
            rds: None,
            poll: PollSettings::default(),
            bucket_prefix: "johanna".into(),
        }
    }

    fn test_sys(runner: MockRunner) -> Sys<MockRunner, RecordingSleeper> {
        Sys::from_parts(settings(), None, runner, RecordingSleeper::new()).unwrap()
    }

    // --- passthrough ---

    #[test]
    fn aws_json_is_pretty_printed_with_sorted_keys() {
        let sys = test_sys(MockRunner::with_stdout(&[r#"{"b": 1, "a": {"c": [1, 2]}}"#]));
        let out = sys
            .execute(Operation::Aws { args: vec!["ec2".into(), "describe-vpcs".into()] })
            .unwrap();
        assert_eq!(
            out,
            "{\n    \"a\": {\n        \"c\": [\n            1,\n            2\n        ]\n    },\n    \"b\": 1\n}"
        );
        assert_eq!(sys.aws().runner().executed_lines(), vec!["aws ec2 describe-vpcs"]);
    }

    #[test]
    fn aws_text_is_printed_verbatim() {
        let sys = test_sys(MockRunner::with_stdout(&["2.15.0 Python/3.11\n"]));
        let out = sys.execute(Operation::Aws { args: vec!["--version".into()] }).unwrap();
        assert_eq!(out, "2.15.0 Python/3.11");
    }

    #[test]
    fn aws_failure_is_suppressed() {
        let sys = test_sys(MockRunner::with_responses(vec![Ok(RawOutput::failure(255, "boom"))]));
        let out = sys.execute(Operation::Aws { args: vec!["s3".into(), "ls".into()] }).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn eb_runs_eb_program() {
        let sys = test_sys(MockRunner::with_stdout(&["Environment details\n"]));
        let out = sys.execute(Operation::Eb { args: vec!["status".into()] }).unwrap();
        assert_eq!(out, "Environment details");
        assert_eq!(sys.aws().runner().executed_commands()[0].program(), "eb");
    }

    #[test]
    fn region_override_reaches_subprocess_env() {
        let sys = Sys::from_parts(
            settings(),
            Some("us-east-1"),
            MockRunner::new(),
            RecordingSleeper::new(),
        )
        .unwrap();
        sys.execute(Operation::Aws { args: vec!["sts".into(), "get-caller-identity".into()] })
            .unwrap();
        let cmd = sys.aws().runner().executed_commands().remove(0);
        assert_eq!(
            cmd.get_env().get("AWS_DEFAULT_REGION").map(String::as_str),
            Some("us-east-1")
        );
        assert_eq!(sys.settings().aws.default_region, "us-east-1");
    }

    #[test]
    fn missing_credentials_rejected() {
        let mut s = settings();
        s.aws.access_key_id.clear();
        let err = Sys::from_parts(s, None, MockRunner::new(), RecordingSleeper::new()).err();
        assert!(matches!(err, Some(AwsError::Config(_))));
    }

    // --- waits ---

    #[test]
    fn wait_lambda_ready_immediately() {
        let sys = test_sys(MockRunner::with_stdout(&[r#"{"Functions": []}"#]));
        let out = sys
            .execute(Operation::Wait { target: WaitTarget::LambdaTerminated })
            .unwrap();
        assert_eq!(out, "");
        assert!(sys.poller().sleeper().sleeps().is_empty());
    }

    #[test]
    fn wait_nat_available_after_two_sleeps() {
        let pending = r#"{"NatGateways": [{"NatGatewayId": "nat-1", "VpcId": "vpc-1", "State": "pending"}]}"#;
        let available = r#"{"NatGateways": [{"NatGatewayId": "nat-1", "VpcId": "vpc-1", "State": "available"}]}"#;
        let sys = test_sys(MockRunner::with_stdout(&[pending, pending, available]));
        sys.execute(Operation::Wait {
            target: WaitTarget::NatAvailable { vpc_id: Some("vpc-1".into()) },
        })
        .unwrap();
        assert_eq!(sys.poller().sleeper().sleeps().len(), 2);
        assert_eq!(sys.aws().runner().call_count(), 3);
    }

    #[test]
    fn wait_rds_address_needs_engine() {
        let sys = test_sys(MockRunner::new());
        let err = sys
            .execute(Operation::Wait { target: WaitTarget::RdsAddress { read_replica: false } })
            .unwrap_err();
        assert!(matches!(err, AwsError::Config(_)));
        assert_eq!(sys.aws().runner().call_count(), 0);
    }

    #[test]
    fn wait_rds_address_aurora_reader() {
        let mut s = settings();
        s.rds = Some(RdsConfig { engine: "aurora".into() });
        let clusters = r#"{"DBClusters": [{"DBClusterIdentifier": "db", "Status": "available",
            "Endpoint": "db.cluster-x.rds.amazonaws.com",
            "ReaderEndpoint": "db.cluster-ro-x.rds.amazonaws.com"}]}"#;
        let sys = Sys::from_parts(
            s,
            None,
            MockRunner::with_stdout(&[clusters]),
            RecordingSleeper::new(),
        )
        .unwrap();
        let out = sys
            .execute(Operation::Wait { target: WaitTarget::RdsAddress { read_replica: true } })
            .unwrap();
        assert_eq!(out, "db.cluster-ro-x.rds.amazonaws.com");
    }

    // --- lookups ---

    #[test]
    fn vpc_ids_prints_dash_for_unconfigured() {
        let mut s = settings();
        s.common.vpc_rds_cidr = Some("10.0.0.0/16".into());
        let sys = Sys::from_parts(
            s,
            None,
            MockRunner::with_stdout(&[r#"{"Vpcs": [{"VpcId": "vpc-1", "CidrBlock": "10.0.0.0/16"}]}"#]),
            RecordingSleeper::new(),
        )
        .unwrap();
        assert_eq!(sys.execute(Operation::VpcIds).unwrap(), "rds vpc-1\neb -");
        assert_eq!(sys.aws().runner().call_count(), 1);
    }

    #[test]
    fn topic_arn_missing_is_error() {
        let sys = test_sys(MockRunner::with_stdout(&[
            r#"{"Topics": [{"TopicArn": "arn:aws:sns:ap-northeast-2:1:other"}]}"#,
        ]));
        let err = sys.execute(Operation::TopicArn { name: "alarms".into() }).unwrap_err();
        assert!(err.to_string().contains("alarms"));
    }

    #[test]
    fn help_runs_nothing() {
        let sys = test_sys(MockRunner::new());
        let out = sys.execute(Operation::Help { topic: None }).unwrap();
        assert!(out.contains("Usage: johanna"));
        assert_eq!(sys.aws().runner().call_count(), 0);
    }
}
