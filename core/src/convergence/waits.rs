//! Named waits: one describe command plus one predicate per resource
//! condition, all run through the same `Poller`.

use crate::aws::response::{
    DescribeCacheClusters, DescribeDbClusters, DescribeDbInstances, DescribeInstances,
    DescribeNatGateways, ListFunctions, NatGatewayState, Response,
};
use crate::aws::AwsCli;
use crate::convergence::policy::PollState;
use crate::convergence::poller::{Poller, Probe};
use crate::convergence::predicates;
use crate::error::Result;
use crate::infrastructure::runner::ProcessRunner;
use crate::infrastructure::sleeper::Sleeper;
use crate::types::config::RdsConfig;
use crate::types::result::CommandResult;

/// Decode `T` from the result and map it through `check`. A response that
/// does not fit `T` aborts the wait.
fn probe_with<T, V>(
    check: impl Fn(&T) -> Option<V>,
) -> impl FnMut(&CommandResult) -> Result<Probe<V>>
where
    T: Response,
{
    move |result: &CommandResult| Ok(Probe::from(check(&T::decode(result)?)))
}

fn flag(ready: bool) -> Option<()> {
    ready.then_some(())
}

/// Which database endpoint `rds_address` should wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbEndpoint {
    Primary,
    ReadReplica,
}

impl DbEndpoint {
    fn is_replica(self) -> bool {
        self == DbEndpoint::ReadReplica
    }
}

impl<S: Sleeper> Poller<S> {
    pub fn wait_terminate_lambda<R: ProcessRunner>(&self, aws: &AwsCli<R>) -> Result<()> {
        self.poll(
            aws,
            &ListFunctions::command(),
            "terminating the lambda",
            probe_with(|r: &ListFunctions| flag(predicates::no_lambda_functions(r))),
        )
        .map(|_| ())
    }

    /// Instances first, then clusters; both phases share one budget.
    pub fn wait_terminate_rds<R: ProcessRunner>(&self, aws: &AwsCli<R>) -> Result<()> {
        let mut state = PollState::new();
        self.poll_with_state(
            &mut state,
            aws,
            &DescribeDbInstances::command(),
            "terminating the rds",
            probe_with(|r: &DescribeDbInstances| flag(predicates::no_db_instances(r))),
        )?;
        self.poll_with_state(
            &mut state,
            aws,
            &DescribeDbClusters::command(),
            "terminating the rds",
            probe_with(|r: &DescribeDbClusters| flag(predicates::no_db_clusters(r))),
        )
        .map(|_| ())
    }

    pub fn wait_terminate_elasticache<R: ProcessRunner>(&self, aws: &AwsCli<R>) -> Result<()> {
        self.poll(
            aws,
            &DescribeCacheClusters::command(),
            "terminating the elasticache",
            probe_with(|r: &DescribeCacheClusters| flag(predicates::no_cache_clusters(r))),
        )
        .map(|_| ())
    }

    /// Elastic Beanstalk teardown is done once every EC2 instance is gone.
    pub fn wait_terminate_eb<R: ProcessRunner>(&self, aws: &AwsCli<R>) -> Result<()> {
        self.poll(
            aws,
            &DescribeInstances::command(),
            "terminating the eb",
            probe_with(|r: &DescribeInstances| flag(predicates::all_instances_terminated(r))),
        )
        .map(|_| ())
    }

    pub fn wait_create_nat_gateway<R: ProcessRunner>(
        &self,
        aws: &AwsCli<R>,
        vpc_id: Option<&str>,
    ) -> Result<()> {
        self.wait_nat_gateway(aws, vpc_id, NatGatewayState::Available, "waiting for a new nat gateway")
    }

    pub fn wait_delete_nat_gateway<R: ProcessRunner>(
        &self,
        aws: &AwsCli<R>,
        vpc_id: Option<&str>,
    ) -> Result<()> {
        self.wait_nat_gateway(aws, vpc_id, NatGatewayState::Deleted, "deleting the nat gateway")
    }

    fn wait_nat_gateway<R: ProcessRunner>(
        &self,
        aws: &AwsCli<R>,
        vpc_id: Option<&str>,
        target: NatGatewayState,
        label: &str,
    ) -> Result<()> {
        self.poll(
            aws,
            &DescribeNatGateways::command(),
            label,
            probe_with(|r: &DescribeNatGateways| {
                flag(predicates::nat_gateways_in_state(r, vpc_id, target))
            }),
        )
        .map(|_| ())
    }

    /// Wait until the first cache cluster's first node has an address.
    pub fn elasticache_address<R: ProcessRunner>(&self, aws: &AwsCli<R>) -> Result<String> {
        let cmd = DescribeCacheClusters::command().arg("--show-cache-node-info");
        self.poll(
            aws,
            &cmd,
            "waiting for a new cache",
            probe_with(predicates::cache_address),
        )
        .map(|p| p.value)
    }

    /// Wait until a database endpoint is usable. Aurora is read per cluster,
    /// every other engine per instance.
    pub fn rds_address<R: ProcessRunner>(
        &self,
        aws: &AwsCli<R>,
        rds: &RdsConfig,
        endpoint: DbEndpoint,
    ) -> Result<String> {
        let replica = endpoint.is_replica();
        let label = "waiting for a new database";
        if rds.is_aurora() {
            self.poll(
                aws,
                &DescribeDbClusters::command(),
                label,
                probe_with(|r: &DescribeDbClusters| predicates::aurora_endpoint(r, replica)),
            )
            .map(|p| p.value)
        } else {
            self.poll(
                aws,
                &DescribeDbInstances::command(),
                label,
                probe_with(|r: &DescribeDbInstances| predicates::instance_address(r, replica)),
            )
            .map(|p| p.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::testing::cli;
    use crate::convergence::policy::PollPolicy;
    use crate::error::AwsError;
    use crate::infrastructure::runner::MockRunner;
    use crate::infrastructure::sleeper::RecordingSleeper;
    use crate::types::result::RawOutput;
    use std::time::Duration;

    fn poller(interval: u64, max: u64) -> Poller<RecordingSleeper> {
        Poller::with_sleeper(
            PollPolicy::from_secs(interval, max).unwrap(),
            RecordingSleeper::new(),
        )
    }

    #[test]
    fn lambda_already_gone_returns_immediately() {
        let aws = cli(MockRunner::with_stdout(&[r#"{"Functions": []}"#]));
        let p = poller(5, 1800);
        p.wait_terminate_lambda(&aws).unwrap();
        assert_eq!(aws.runner().executed_lines(), vec!["aws lambda list-functions"]);
        assert!(p.sleeper().sleeps().is_empty());
    }

    #[test]
    fn nat_gateway_available_on_third_check() {
        let pending = r#"{"NatGateways": [{"NatGatewayId": "nat-1", "VpcId": "vpc-eb", "State": "pending"}]}"#;
        let available = r#"{"NatGateways": [{"NatGatewayId": "nat-1", "VpcId": "vpc-eb", "State": "available"}]}"#;
        let aws = cli(MockRunner::with_stdout(&[pending, pending, available]));
        let p = poller(5, 1800);
        p.wait_create_nat_gateway(&aws, Some("vpc-eb")).unwrap();
        assert_eq!(aws.runner().call_count(), 3);
        assert_eq!(
            p.sleeper().sleeps(),
            vec![Duration::from_secs(5), Duration::from_secs(5)]
        );
    }

    #[test]
    fn nat_gateway_delete_ignores_other_vpcs() {
        let out = r#"{"NatGateways": [
            {"NatGatewayId": "nat-1", "VpcId": "vpc-eb", "State": "deleted"},
            {"NatGatewayId": "nat-2", "VpcId": "vpc-rds", "State": "available"}]}"#;
        let aws = cli(MockRunner::with_stdout(&[out]));
        let p = poller(5, 1800);
        p.wait_delete_nat_gateway(&aws, Some("vpc-eb")).unwrap();
        assert!(p.sleeper().sleeps().is_empty());
    }

    #[test]
    fn db_instances_never_empty_times_out() {
        let aws = cli(MockRunner::new().with_fallback(RawOutput::success(
            r#"{"DBInstances": [{"DBInstanceIdentifier": "main", "DBInstanceStatus": "deleting"}]}"#,
        )));
        let p = poller(5, 30);
        let err = p.wait_terminate_rds(&aws).unwrap_err();
        match err {
            AwsError::PollTimeout { label, elapsed, iterations } => {
                assert_eq!(label, "terminating the rds");
                assert_eq!(elapsed, Duration::from_secs(30));
                assert_eq!(iterations, 7);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(aws
            .runner()
            .executed_lines()
            .iter()
            .all(|l| l == "aws rds describe-db-instances"));
    }

    #[test]
    fn rds_teardown_checks_instances_then_clusters() {
        let aws = cli(MockRunner::with_stdout(&[
            r#"{"DBInstances": [{"DBInstanceIdentifier": "main"}]}"#,
            r#"{"DBInstances": []}"#,
            r#"{"DBClusters": [{"DBClusterIdentifier": "c"}]}"#,
            r#"{"DBClusters": []}"#,
        ]));
        let p = poller(5, 1800);
        p.wait_terminate_rds(&aws).unwrap();
        assert_eq!(
            aws.runner().executed_lines(),
            vec![
                "aws rds describe-db-instances",
                "aws rds describe-db-instances",
                "aws rds describe-db-clusters",
                "aws rds describe-db-clusters",
            ]
        );
        assert_eq!(p.sleeper().total(), Duration::from_secs(10));
    }

    #[test]
    fn eb_waits_for_every_instance() {
        let running = r#"{"Reservations": [{"Instances": [
            {"InstanceId": "i-1", "State": {"Name": "shutting-down"}}]}]}"#;
        let done = r#"{"Reservations": [{"Instances": [
            {"InstanceId": "i-1", "State": {"Name": "terminated"}}]}]}"#;
        let aws = cli(MockRunner::with_stdout(&[running, done]));
        let p = poller(5, 1800);
        p.wait_terminate_eb(&aws).unwrap();
        assert_eq!(p.sleeper().sleeps().len(), 1);
    }

    #[test]
    fn elasticache_teardown() {
        let aws = cli(MockRunner::with_stdout(&[
            r#"{"CacheClusters": [{"CacheClusterId": "redis"}]}"#,
            r#"{"CacheClusters": []}"#,
        ]));
        let p = poller(5, 1800);
        p.wait_terminate_elasticache(&aws).unwrap();
        assert_eq!(aws.runner().call_count(), 2);
    }

    #[test]
    fn cache_address_uses_node_info_flag() {
        let aws = cli(MockRunner::with_stdout(&[
            r#"{"CacheClusters": [{"CacheClusterId": "redis", "CacheNodes": []}]}"#,
            r#"{"CacheClusters": [{"CacheClusterId": "redis",
                "CacheNodes": [{"Endpoint": {"Address": "redis.cache", "Port": 6379}}]}]}"#,
        ]));
        let p = poller(5, 1800);
        assert_eq!(p.elasticache_address(&aws).unwrap(), "redis.cache");
        assert_eq!(
            aws.runner().executed_lines()[0],
            "aws elasticache describe-cache-clusters --show-cache-node-info"
        );
    }

    #[test]
    fn aurora_reader_endpoint() {
        let aws = cli(MockRunner::with_stdout(&[r#"{"DBClusters": [
            {"DBClusterIdentifier": "c", "Status": "available",
             "Endpoint": "c.rds", "ReaderEndpoint": "c-ro.rds"}]}"#]));
        let p = poller(5, 1800);
        let rds = RdsConfig { engine: "aurora".into() };
        assert_eq!(p.rds_address(&aws, &rds, DbEndpoint::ReadReplica).unwrap(), "c-ro.rds");
        assert_eq!(aws.runner().executed_lines(), vec!["aws rds describe-db-clusters"]);
    }

    #[test]
    fn instance_engine_reads_instances() {
        let aws = cli(MockRunner::with_stdout(&[
            r#"{"DBInstances": [{"DBInstanceIdentifier": "main", "DBInstanceStatus": "creating"}]}"#,
            r#"{"DBInstances": [{"DBInstanceIdentifier": "main", "Endpoint": {"Address": "main.rds"}}]}"#,
        ]));
        let p = poller(5, 1800);
        let rds = RdsConfig { engine: "mysql".into() };
        assert_eq!(p.rds_address(&aws, &rds, DbEndpoint::Primary).unwrap(), "main.rds");
        assert_eq!(p.sleeper().sleeps().len(), 1);
    }

    #[test]
    fn malformed_response_aborts_wait() {
        let aws = cli(MockRunner::with_stdout(&[r#"{"Unexpected": true}"#]));
        let p = poller(5, 1800);
        let err = p.wait_terminate_lambda(&aws).unwrap_err();
        assert!(matches!(err, AwsError::UnexpectedResponse { .. }));
        assert!(p.sleeper().sleeps().is_empty());
    }
}
