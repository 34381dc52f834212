use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A member cluster registered with the control plane.
///
/// Only the identity and liveness of a cluster matter to the controllers in
/// this workspace; `ClusterSpec` carries just enough to describe a registration.
#[derive(Clone, Debug, Default, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "cluster.karmada.io",
    version = "v1alpha1",
    kind = "Cluster"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(default)]
    pub sync_mode: SyncMode,
    pub api_endpoint: Option<String>,
    pub provider: Option<String>,
    pub region: Option<String>,
    pub zone: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum SyncMode {
    #[default]
    Push,
    Pull,
}

// === impl Cluster ===

impl Cluster {
    /// A cluster is live until it is marked for deletion. A cluster that is
    /// being torn down is treated as already gone.
    pub fn is_live(&self) -> bool {
        self.metadata.deletion_timestamp.is_none()
    }
}
