use crate::{Error, Result};
use multicluster_controller_core::CONTROLLER_NAME;
use multicluster_controller_k8s_api::{
    Api, Client, Cluster, ClusterPropagationPolicy, ListParams, PostParams, ResourceExt,
};
use std::{future::Future, time::Duration};
use tokio::time;

/// The resources the membership synchronizer reads and writes.
///
/// Lookups of missing objects return `Ok(None)`; only failures to talk to the
/// store are errors.
#[async_trait::async_trait]
pub trait Store: Send + Sync + 'static {
    async fn get_cluster(&self, name: &str) -> Result<Option<Cluster>>;

    async fn list_clusters(&self) -> Result<Vec<Cluster>>;

    async fn get_policy(&self, name: &str) -> Result<Option<ClusterPropagationPolicy>>;

    /// Creates the policy; fails with [`Error::Conflict`] if it already
    /// exists.
    async fn create_policy(&self, policy: &ClusterPropagationPolicy) -> Result<()>;

    /// Replaces the policy. The write only succeeds if the policy's resource
    /// version is still current; otherwise it fails with
    /// [`Error::Conflict`].
    async fn update_policy(&self, policy: &ClusterPropagationPolicy) -> Result<()>;
}

/// A [`Store`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeStore {
    clusters: Api<Cluster>,
    policies: Api<ClusterPropagationPolicy>,
    timeout: Duration,
}

// === impl KubeStore ===

impl KubeStore {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            clusters: Api::all(client.clone()),
            policies: Api::all(client),
            timeout,
        }
    }

    fn post_params() -> PostParams {
        PostParams {
            field_manager: Some(CONTROLLER_NAME.to_string()),
            ..Default::default()
        }
    }

    async fn bounded<T>(&self, f: impl Future<Output = Result<T>>) -> Result<T> {
        time::timeout(self.timeout, f)
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
    }
}

#[async_trait::async_trait]
impl Store for KubeStore {
    async fn get_cluster(&self, name: &str) -> Result<Option<Cluster>> {
        self.bounded(async { Ok(self.clusters.get_opt(name).await?) })
            .await
    }

    async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        self.bounded(async { Ok(self.clusters.list(&ListParams::default()).await?.items) })
            .await
    }

    async fn get_policy(&self, name: &str) -> Result<Option<ClusterPropagationPolicy>> {
        self.bounded(async { Ok(self.policies.get_opt(name).await?) })
            .await
    }

    async fn create_policy(&self, policy: &ClusterPropagationPolicy) -> Result<()> {
        let name = policy.name_unchecked();
        self.bounded(async {
            self.policies
                .create(&Self::post_params(), policy)
                .await
                .map_err(|error| Error::write(&name, error))?;
            Ok(())
        })
        .await
    }

    async fn update_policy(&self, policy: &ClusterPropagationPolicy) -> Result<()> {
        let name = policy.name_unchecked();
        self.bounded(async {
            self.policies
                .replace(&name, &Self::post_params(), policy)
                .await
                .map_err(|error| Error::write(&name, error))?;
            Ok(())
        })
        .await
    }
}
