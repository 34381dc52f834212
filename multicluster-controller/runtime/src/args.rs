use crate::{
    core::{Backoff, TokenBucket},
    index::{self, IndexMetrics},
    k8s::{self, SERVICE_EXPORT_POLICY_NAME},
    lease,
    sync::{ClusterEvents, Controller, ControllerMetrics, KubeStore, Leadership, PolicyEvents, Queue},
    Controllers,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use kube::runtime::watcher;
use prometheus_client::registry::Registry;
use std::{num::NonZeroUsize, sync::Arc};
use tokio::time::Duration;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "multicluster-controller",
    about = "Keeps multicluster add-on resources in sync with member clusters"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "multicluster=info,warn",
        env = "MULTICLUSTER_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Controllers to run: `*` for all, `name` to enable and `-name` to
    /// disable, e.g. `*,-mci-index`.
    #[clap(long, default_value = "*")]
    controllers: Controllers,

    /// Number of keys the CRD synchronizer reconciles concurrently.
    #[clap(long, default_value = "1")]
    workers: NonZeroUsize,

    /// Delay before the first retry of a failed key.
    #[clap(long, default_value_t = Backoff::DEFAULT_BASE.as_millis() as u64)]
    rate_limiter_base_delay_ms: u64,

    /// Upper bound on the delay between retries of a failed key.
    #[clap(long, default_value_t = Backoff::DEFAULT_MAX.as_secs())]
    rate_limiter_max_delay_secs: u64,

    /// Overall retries per second across all keys; 0 disables the limit.
    #[clap(long, default_value_t = TokenBucket::DEFAULT_QPS)]
    rate_limiter_qps: u32,

    /// Number of retries allowed in a burst before the overall limit applies.
    #[clap(long, default_value_t = TokenBucket::DEFAULT_BURST)]
    rate_limiter_bucket_size: u32,

    /// Timeout for each request to the API server.
    #[clap(long, default_value_t = KubeStore::DEFAULT_TIMEOUT.as_millis() as u64)]
    store_timeout_ms: u64,

    /// Reconcile without holding the lease. Only safe with a single replica.
    #[clap(long)]
    leader_election_disabled: bool,

    #[clap(long, default_value = "karmada-system", env = "POD_NAMESPACE")]
    lease_namespace: String,

    #[clap(long, default_value = "multicluster-controller-crd-synchronizer")]
    lease_name: String,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            admin,
            controllers,
            workers,
            rate_limiter_base_delay_ms,
            rate_limiter_max_delay_secs,
            rate_limiter_qps,
            rate_limiter_bucket_size,
            store_timeout_ms,
            leader_election_disabled,
            lease_namespace,
            lease_name,
        } = self;

        let backoff = Backoff::new(
            Duration::from_millis(rate_limiter_base_delay_ms),
            Duration::from_secs(rate_limiter_max_delay_secs),
        );

        let mut prom = <Registry>::default();
        let sync_metrics =
            ControllerMetrics::register(prom.sub_registry_with_prefix("crd_synchronizer"));
        let mci_index = index::Index::shared();
        let mci_index_metrics = IndexMetrics::register(
            mci_index.clone(),
            prom.sub_registry_with_prefix("mci"),
        )
        .shared();
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        if controllers.is_enabled(Controllers::MCI_INDEX) {
            let mcis =
                runtime.watch_all::<k8s::MultiClusterIngress>(watcher::Config::default());
            tokio::spawn(
                kubert::index::namespaced(mci_index_metrics, mcis)
                    .instrument(info_span!("multiclusteringresses")),
            );
            info!(
                index = index::INDEX_KEY_SERVICE_REF_NAME,
                "Indexing MultiClusterIngress service references"
            );
        }

        if controllers.is_enabled(Controllers::CRD_SYNCHRONIZER) {
            let leadership = if leader_election_disabled {
                Leadership::Unconditional
            } else {
                let claimant = std::env::var("HOSTNAME")
                    .context("failed to fetch `HOSTNAME` environment variable")?;
                let claims = lease::init(&runtime, &lease_namespace, &lease_name, &claimant).await?;
                Leadership::Lease { claims, claimant }
            };

            let queue = Queue::shared();

            let clusters = runtime.watch_all::<k8s::Cluster>(watcher::Config::default());
            tokio::spawn(
                kubert::index::cluster(ClusterEvents::shared(queue.clone()), clusters)
                    .instrument(info_span!("clusters")),
            );

            let policies = runtime.watch_all::<k8s::ClusterPropagationPolicy>(
                watcher::Config::default()
                    .fields(&format!("metadata.name={SERVICE_EXPORT_POLICY_NAME}")),
            );
            tokio::spawn(
                kubert::index::cluster(PolicyEvents::shared(queue.clone()), policies)
                    .instrument(info_span!("clusterpropagationpolicies")),
            );

            let store = Arc::new(KubeStore::new(
                runtime.client(),
                Duration::from_millis(store_timeout_ms),
            ));
            let controller = Controller::new(store, queue, sync_metrics)
                .with_workers(workers)
                .with_backoff(backoff)
                .with_rate_limit(TokenBucket::new(rate_limiter_qps, rate_limiter_bucket_size))
                .with_leadership(leadership);
            tokio::spawn(
                controller
                    .run(runtime.shutdown_handle().signaled())
                    .instrument(info_span!("crd_synchronizer")),
            );
        }

        // Block the main thread on the shutdown signal. Once it fires, wait for the background tasks to
        // complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
