use crate::k8s::{self, ObjectMeta, Patch, PatchParams};
use anyhow::Result;
use k8s_openapi::api::coordination::v1 as coordv1;
use kubert::lease::{Claim, ClaimParams, LeaseManager};
use std::sync::Arc;
use tokio::{sync::watch, time::Duration};

const FIELD_MANAGER: &str = "multicluster-controller";

const CLAIM_PARAMS: ClaimParams = ClaimParams {
    lease_duration: Duration::from_secs(30),
    renew_grace_period: Duration::from_secs(1),
};

/// Competes for the named lease as `claimant`, creating the lease if needed.
///
/// The returned watch always holds the latest claim; a replica may write
/// only while the claim is current for it.
pub async fn init<T>(
    runtime: &kubert::Runtime<T>,
    namespace: &str,
    name: &str,
    claimant: &str,
) -> Result<watch::Receiver<Arc<Claim>>> {
    let api = k8s::Api::<coordv1::Lease>::namespaced(runtime.client(), namespace);
    ensure_exists(&api, namespace, name).await?;

    let (claims, _task) = LeaseManager::init(api, name)
        .await?
        .spawn(claimant, CLAIM_PARAMS)
        .await?;
    tracing::info!(%namespace, %name, %claimant, "Competing for lease");
    Ok(claims)
}

async fn ensure_exists(api: &k8s::Api<coordv1::Lease>, namespace: &str, name: &str) -> Result<()> {
    let lease = coordv1::Lease {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            // A resource version of "0" only creates the lease if it is
            // absent; an existing lease is left untouched.
            resource_version: Some("0".to_string()),
            labels: Some(
                [(
                    "app.kubernetes.io/name".to_string(),
                    FIELD_MANAGER.to_string(),
                )]
                .into(),
            ),
            ..Default::default()
        },
        spec: None,
    };

    match api
        .patch(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Apply(lease))
        .await
    {
        Ok(_) => tracing::debug!(%name, "Created lease"),
        Err(k8s::Error::Api(_)) => tracing::debug!(%name, "Lease already exists"),
        Err(error) => return Err(error.into()),
    }
    Ok(())
}
