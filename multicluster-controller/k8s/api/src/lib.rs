#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod cluster;
pub mod networking;
pub mod policy;

pub use self::{
    cluster::{Cluster, ClusterSpec},
    networking::{MultiClusterIngress, MultiClusterIngressSpec},
    policy::{ClusterPropagationPolicy, PropagationSpec},
};
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
pub use kube::{
    api::{Api, ListParams, ObjectMeta, Patch, PatchParams, PostParams, ResourceExt},
    Client, Error, Resource,
};

/// The name of the single `ClusterPropagationPolicy` that propagates the
/// ServiceExport CRD to every member cluster.
///
/// Nothing but this name makes the policy a singleton: the membership
/// synchronizer only ever reads, creates and updates the object with this
/// name, and recreates it under the same name whenever it is deleted.
pub const SERVICE_EXPORT_POLICY_NAME: &str = "serviceexport-policy";

/// The CRD that the service export policy propagates.
pub const SERVICE_EXPORT_CRD_NAME: &str = "serviceexports.multicluster.x-k8s.io";
