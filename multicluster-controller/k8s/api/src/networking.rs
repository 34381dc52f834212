pub use k8s_openapi::api::core::v1::TypedLocalObjectReference;
pub use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, IngressBackend, IngressRule, IngressServiceBackend,
    IngressSpec, ServiceBackendPort,
};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An ingress that spans multiple clusters.
///
/// The spec is exactly a `networking.k8s.io/v1` `IngressSpec`.
#[derive(Clone, Debug, Default, PartialEq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "networking.karmada.io",
    version = "v1alpha1",
    kind = "MultiClusterIngress",
    shortname = "mci",
    namespaced
)]
pub struct MultiClusterIngressSpec {
    #[serde(flatten)]
    pub ingress: IngressSpec,
}

impl From<IngressSpec> for MultiClusterIngressSpec {
    fn from(ingress: IngressSpec) -> Self {
        Self { ingress }
    }
}
