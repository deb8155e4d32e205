//! Convergence conditions over typed describe output.
//!
//! Each function is pure. Termination checks return `bool`; endpoint
//! discovery returns the address once one is usable.

use crate::aws::response::{
    DescribeCacheClusters, DescribeDbClusters, DescribeDbInstances, DescribeInstances,
    DescribeNatGateways, InstanceStateName, ListFunctions, NatGatewayState,
};

pub fn no_lambda_functions(r: &ListFunctions) -> bool {
    r.functions.is_empty()
}

pub fn no_db_instances(r: &DescribeDbInstances) -> bool {
    r.db_instances.is_empty()
}

pub fn no_db_clusters(r: &DescribeDbClusters) -> bool {
    r.db_clusters.is_empty()
}

pub fn no_cache_clusters(r: &DescribeCacheClusters) -> bool {
    r.cache_clusters.is_empty()
}

/// Every instance in every reservation is `terminated`. An account with no
/// instances at all qualifies.
pub fn all_instances_terminated(r: &DescribeInstances) -> bool {
    r.reservations
        .iter()
        .flat_map(|res| res.instances.iter())
        .all(|i| i.state.name == InstanceStateName::Terminated)
}

/// Every NAT gateway (restricted to `vpc_id` when given) is in `state`. A
/// gateway that reports no state yet does not count as being in any state.
pub fn nat_gateways_in_state(
    r: &DescribeNatGateways,
    vpc_id: Option<&str>,
    state: NatGatewayState,
) -> bool {
    r.nat_gateways
        .iter()
        .filter(|g| match vpc_id {
            Some(vpc) => g.vpc_id.as_deref() == Some(vpc),
            None => true,
        })
        .all(|g| g.state == Some(state))
}

/// Address of the first node of the first cache cluster, once assigned.
pub fn cache_address(r: &DescribeCacheClusters) -> Option<String> {
    r.cache_clusters
        .first()?
        .cache_nodes
        .first()?
        .endpoint
        .as_ref()?
        .address
        .clone()
        .filter(|a| !a.is_empty())
}

/// Endpoint of the first `available` Aurora cluster. With `read_replica`
/// the reader endpoint is returned, and clusters without one are skipped.
pub fn aurora_endpoint(r: &DescribeDbClusters, read_replica: bool) -> Option<String> {
    r.db_clusters
        .iter()
        .filter(|c| c.status.as_deref() == Some("available"))
        .filter_map(|c| {
            if read_replica {
                c.reader_endpoint.clone()
            } else {
                c.endpoint.clone()
            }
        })
        .find(|e| !e.is_empty())
}

/// Address of the first DB instance whose replica role matches the request:
/// a read replica when `read_replica`, a primary otherwise.
pub fn instance_address(r: &DescribeDbInstances, read_replica: bool) -> Option<String> {
    r.db_instances
        .iter()
        .filter(|i| i.is_read_replica() == read_replica)
        .filter_map(|i| i.endpoint.as_ref()?.address.clone())
        .find(|a| !a.is_empty())
}
