//! Typed schemas for the describe/list operations the crate reads.
//!
//! Only the fields the predicates and lookups need are modelled. Top-level
//! collections are required: a response without them is malformed and
//! decoding fails with `UnexpectedResponse`. Fields the service may omit for
//! a resource that is still being created are `Option`.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::Result;
use crate::types::command::Command;
use crate::types::result::CommandResult;

/// Ties a schema to the `aws <service> <operation>` call that produces it.
pub trait Response: DeserializeOwned {
    const SERVICE: &'static str;
    const OPERATION: &'static str;

    fn command() -> Command {
        Command::aws(Self::SERVICE, Self::OPERATION)
    }

    fn decode(result: &CommandResult) -> Result<Self> {
        result.parse(&format!("{} {}", Self::SERVICE, Self::OPERATION))
    }
}

macro_rules! response {
    ($ty:ty, $service:literal, $operation:literal) => {
        impl Response for $ty {
            const SERVICE: &'static str = $service;
            const OPERATION: &'static str = $operation;
        }
    };
}

// ---------------------------------------------------------------------------
// Lambda
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ListFunctions {
    pub functions: Vec<LambdaFunction>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LambdaFunction {
    pub function_name: String,
}

response!(ListFunctions, "lambda", "list-functions");

// ---------------------------------------------------------------------------
// RDS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DescribeDbInstances {
    #[serde(rename = "DBInstances")]
    pub db_instances: Vec<DbInstance>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    pub identifier: String,
    #[serde(rename = "DBInstanceStatus", default)]
    pub status: Option<String>,
    #[serde(rename = "Endpoint", default)]
    pub endpoint: Option<Endpoint>,
    #[serde(rename = "ReadReplicaSourceDBInstanceIdentifier", default)]
    pub read_replica_source: Option<String>,
}

impl DbInstance {
    pub fn is_read_replica(&self) -> bool {
        self.read_replica_source.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DescribeDbClusters {
    #[serde(rename = "DBClusters")]
    pub db_clusters: Vec<DbCluster>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DbCluster {
    #[serde(rename = "DBClusterIdentifier")]
    pub identifier: String,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Endpoint", default)]
    pub endpoint: Option<String>,
    #[serde(rename = "ReaderEndpoint", default)]
    pub reader_endpoint: Option<String>,
}

/// Host/port pair used by RDS instances and cache nodes.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Endpoint {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

response!(DescribeDbInstances, "rds", "describe-db-instances");
response!(DescribeDbClusters, "rds", "describe-db-clusters");

// ---------------------------------------------------------------------------
// ElastiCache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeCacheClusters {
    pub cache_clusters: Vec<CacheCluster>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CacheCluster {
    pub cache_cluster_id: String,
    #[serde(default)]
    pub cache_cluster_status: Option<String>,
    /// Only present with `--show-cache-node-info`.
    #[serde(default)]
    pub cache_nodes: Vec<CacheNode>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CacheNode {
    #[serde(default)]
    pub endpoint: Option<Endpoint>,
}

response!(DescribeCacheClusters, "elasticache", "describe-cache-clusters");

// ---------------------------------------------------------------------------
// EC2
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeInstances {
    pub reservations: Vec<Reservation>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Reservation {
    #[serde(default)]
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    pub instance_id: String,
    pub state: InstanceState,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceState {
    pub name: InstanceStateName,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceStateName {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeNatGateways {
    pub nat_gateways: Vec<NatGateway>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct NatGateway {
    pub nat_gateway_id: String,
    #[serde(default)]
    pub vpc_id: Option<String>,
    #[serde(default)]
    pub state: Option<NatGatewayState>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NatGatewayState {
    Pending,
    Failed,
    Available,
    Deleting,
    Deleted,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVpcs {
    pub vpcs: Vec<Vpc>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Vpc {
    pub vpc_id: String,
    #[serde(default)]
    pub cidr_block: Option<String>,
}

response!(DescribeInstances, "ec2", "describe-instances");
response!(DescribeNatGateways, "ec2", "describe-nat-gateways");
response!(DescribeVpcs, "ec2", "describe-vpcs");

// ---------------------------------------------------------------------------
// IAM / SNS / S3
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GetRole {
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    pub role_name: String,
    pub arn: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ListTopics {
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Topic {
    pub topic_arn: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ListBuckets {
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Bucket {
    pub name: String,
}

response!(GetRole, "iam", "get-role");
response!(ListTopics, "sns", "list-topics");
response!(ListBuckets, "s3api", "list-buckets");
