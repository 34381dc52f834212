use crate::{Result, Store};
use multicluster_controller_core::{apply_intent, is_valid_cluster_name, Intent};
use multicluster_controller_k8s_api::{
    policy::{ClusterAffinity, Placement, ResourceSelector},
    ClusterPropagationPolicy, PropagationSpec, SERVICE_EXPORT_CRD_NAME,
    SERVICE_EXPORT_POLICY_NAME,
};
use tracing::{debug, info, instrument};

/// The result of a successful reconciliation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The policy did not exist and was created for these clusters.
    Created { clusters: Vec<String> },
    /// The cluster was added to the policy.
    Added,
    /// The cluster was removed from the policy.
    Removed,
    /// The policy already reflected the cluster's state.
    Unchanged,
}

// === impl Outcome ===

impl Outcome {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Brings the service export policy in line with the state of the cluster
/// named `key`.
///
/// If the policy does not exist it is created from the full set of live
/// clusters, which also settles `key`. Otherwise `key` is appended to or
/// removed from the policy's cluster names, and the policy is written back
/// only if that changed anything. Errors are returned to the caller to be
/// retried; this function never retries on its own.
#[instrument(skip_all, fields(cluster = %key))]
pub async fn reconcile<S: Store + ?Sized>(store: &S, key: &str) -> Result<Outcome> {
    let intent = cluster_intent(store, key).await?;

    let Some(mut policy) = store.get_policy(SERVICE_EXPORT_POLICY_NAME).await? else {
        return bootstrap(store).await;
    };

    if !apply_intent(policy.cluster_names_mut(), key, intent) {
        debug!(?intent, "Policy is up to date");
        return Ok(Outcome::Unchanged);
    }

    store.update_policy(&policy).await?;
    info!(?intent, clusters = ?policy.cluster_names(), "Updated policy");
    Ok(match intent {
        Intent::Ensure => Outcome::Added,
        Intent::Remove => Outcome::Removed,
    })
}

/// Builds the service export policy targeting `clusters`.
pub fn service_export_policy(clusters: Vec<String>) -> ClusterPropagationPolicy {
    ClusterPropagationPolicy::new(
        SERVICE_EXPORT_POLICY_NAME,
        PropagationSpec {
            resource_selectors: vec![ResourceSelector {
                api_version: "apiextensions.k8s.io/v1".to_string(),
                kind: "CustomResourceDefinition".to_string(),
                namespace: None,
                name: Some(SERVICE_EXPORT_CRD_NAME.to_string()),
                ..Default::default()
            }],
            placement: Placement {
                cluster_affinity: Some(ClusterAffinity {
                    cluster_names: clusters,
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        },
    )
}

async fn cluster_intent<S: Store + ?Sized>(store: &S, key: &str) -> Result<Intent> {
    // Keys that cannot name a cluster, like the sentinel, are never found.
    if !is_valid_cluster_name(key) {
        return Ok(Intent::Remove);
    }

    let intent = match store.get_cluster(key).await? {
        Some(cluster) if cluster.is_live() => Intent::Ensure,
        Some(_) => {
            debug!("Cluster is being deleted");
            Intent::Remove
        }
        None => Intent::Remove,
    };
    Ok(intent)
}

async fn bootstrap<S: Store + ?Sized>(store: &S) -> Result<Outcome> {
    let clusters = store
        .list_clusters()
        .await?
        .into_iter()
        .filter(|cluster| cluster.is_live())
        .filter_map(|cluster| cluster.metadata.name)
        .collect::<Vec<_>>();

    let policy = service_export_policy(clusters.clone());
    store.create_policy(&policy).await?;
    info!(?clusters, "Created policy");
    Ok(Outcome::Created { clusters })
}
