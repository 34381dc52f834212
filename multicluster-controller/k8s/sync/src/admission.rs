use multicluster_controller_core::SENTINEL_CLUSTER_NAME;
use multicluster_controller_k8s_api::{
    Cluster, ClusterPropagationPolicy, ResourceExt, SERVICE_EXPORT_POLICY_NAME,
};

/// A change observed on a watched resource.
#[derive(Debug)]
pub enum Event<'a, T> {
    Created(&'a T),
    Updated { old: &'a T, new: &'a T },
    Deleted(&'a T),
    Generic(&'a T),
}

/// Admits `Cluster` events that change the set of live clusters.
///
/// Updates are only interesting when a cluster is marked for deletion (or that
/// mark is cleared); any other change to a cluster is ignored.
pub fn admit_cluster(event: &Event<'_, Cluster>) -> bool {
    match event {
        Event::Created(_) | Event::Deleted(_) => true,
        Event::Updated { old, new } => old.is_live() != new.is_live(),
        Event::Generic(_) => false,
    }
}

/// Admits only the deletion of the service export policy.
///
/// The synchronizer is the only writer of the policy, so creates and updates
/// are its own writes and need no reconciliation.
pub fn admit_policy(event: &Event<'_, ClusterPropagationPolicy>) -> bool {
    match event {
        Event::Deleted(policy) => policy.name_any() == SERVICE_EXPORT_POLICY_NAME,
        Event::Created(_) | Event::Updated { .. } | Event::Generic(_) => false,
    }
}

/// Maps an admitted policy event to the key that rebuilds the policy.
///
/// The policy has no key of its own, so the sentinel, which never names a
/// real cluster, drives a reconcile that recreates it from scratch.
pub fn policy_to_keys(_: &ClusterPropagationPolicy) -> Vec<String> {
    vec![SENTINEL_CLUSTER_NAME.to_string()]
}
