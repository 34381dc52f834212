use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Propagates a set of cluster-scoped resources to a set of member clusters.
///
/// Only the fields this workspace acts on are typed. Every other field is kept
/// in `extra` so that a read-modify-write of the policy preserves it.
#[derive(Clone, Debug, Default, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "policy.karmada.io",
    version = "v1alpha1",
    kind = "ClusterPropagationPolicy"
)]
#[serde(rename_all = "camelCase")]
pub struct PropagationSpec {
    #[serde(default)]
    pub resource_selectors: Vec<ResourceSelector>,
    #[serde(default)]
    pub placement: Placement,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Selects the resources to be propagated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSelector {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_affinity: Option<ClusterAffinity>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterAffinity {
    #[serde(default)]
    pub cluster_names: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// === impl ClusterPropagationPolicy ===

impl ClusterPropagationPolicy {
    /// The clusters the policy targets by name, in order.
    pub fn cluster_names(&self) -> &[String] {
        self.spec
            .placement
            .cluster_affinity
            .as_ref()
            .map(|a| a.cluster_names.as_slice())
            .unwrap_or_default()
    }

    /// Mutable access to the targeted cluster names, creating an empty
    /// affinity if the policy has none.
    pub fn cluster_names_mut(&mut self) -> &mut Vec<String> {
        &mut self
            .spec
            .placement
            .cluster_affinity
            .get_or_insert_with(Default::default)
            .cluster_names
    }
}
