use crate::{reconcile, ControllerMetrics, Queue, Store};
use kubert::lease::Claim;
use multicluster_controller_core::{Backoff, TokenBucket};
use parking_lot::Mutex;
use std::{future::Future, num::NonZeroUsize, sync::Arc};
use tokio::{sync::watch, time};
use tracing::{debug, info, warn, Instrument};

/// Processes keys from a [`Queue`] with a fixed pool of workers.
pub struct Controller<S> {
    store: Arc<S>,
    queue: Arc<Queue>,
    metrics: ControllerMetrics,
    leadership: Leadership,
    backoff: Backoff,
    bucket: TokenBucket,
    workers: NonZeroUsize,
}

/// Decides whether this replica may write the policy.
#[derive(Clone)]
pub enum Leadership {
    /// This replica is the only writer.
    Unconditional,

    /// This replica writes only while it holds the lease.
    Lease {
        claims: watch::Receiver<Arc<Claim>>,
        claimant: String,
    },
}

struct Worker<S> {
    store: Arc<S>,
    queue: Arc<Queue>,
    metrics: ControllerMetrics,
    leadership: Leadership,
    backoff: Backoff,
    bucket: Arc<Mutex<TokenBucket>>,
}

// === impl Leadership ===

impl Leadership {
    /// How long a replica that does not hold the lease waits before checking
    /// again.
    const POLL_INTERVAL: time::Duration = time::Duration::from_secs(1);

    pub fn is_leader(&mut self) -> bool {
        match self {
            Self::Unconditional => true,
            Self::Lease { claims, claimant } => {
                let claim = claims.borrow_and_update();
                claim.holder == *claimant && claim.expiry > chrono::Utc::now()
            }
        }
    }

    /// Completes when a new claim is observed. Never completes for
    /// unconditional leadership.
    async fn changed(&mut self) {
        match self {
            Self::Unconditional => futures::future::pending::<()>().await,
            Self::Lease { claims, .. } => {
                if claims.changed().await.is_err() {
                    // The lease manager is gone; fall back to polling.
                    futures::future::pending::<()>().await;
                }
            }
        }
    }
}

// === impl Controller ===

impl<S: Store> Controller<S> {
    pub fn new(store: Arc<S>, queue: Arc<Queue>, metrics: ControllerMetrics) -> Self {
        Self {
            store,
            queue,
            metrics,
            leadership: Leadership::Unconditional,
            backoff: Backoff::default(),
            bucket: TokenBucket::default(),
            workers: NonZeroUsize::MIN,
        }
    }

    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Limits the overall rate of retries across all keys.
    pub fn with_rate_limit(mut self, bucket: TokenBucket) -> Self {
        self.bucket = bucket;
        self
    }

    pub fn with_leadership(mut self, leadership: Leadership) -> Self {
        self.leadership = leadership;
        self
    }

    /// Runs the workers until `shutdown` completes.
    ///
    /// Workers stop taking keys once `shutdown` completes; reconciliations
    /// that are already running finish first. The output of `shutdown` is
    /// held until then, so a drain handle can be released after the last
    /// write.
    pub async fn run<F: Future>(self, shutdown: F) {
        let Self {
            store,
            queue,
            metrics,
            leadership,
            backoff,
            bucket,
            workers,
        } = self;

        let bucket = Arc::new(Mutex::new(bucket));
        let (stop_tx, stop_rx) = watch::channel(false);
        let tasks = (0..workers.get())
            .map(|id| {
                let worker = Worker {
                    store: store.clone(),
                    queue: queue.clone(),
                    metrics: metrics.clone(),
                    leadership: leadership.clone(),
                    backoff,
                    bucket: bucket.clone(),
                };
                tokio::spawn(
                    worker
                        .run(stop_rx.clone())
                        .instrument(tracing::info_span!("worker", id)),
                )
            })
            .collect::<Vec<_>>();
        info!(workers = workers.get(), "Started");

        let release = shutdown.await;
        debug!("Stopping workers");
        let _ = stop_tx.send(true);
        for res in futures::future::join_all(tasks).await {
            if let Err(error) = res {
                warn!(%error, "Worker failed");
            }
        }
        drop(release);
        info!("Stopped");
    }
}

// === impl Worker ===

impl<S: Store> Worker<S> {
    async fn run(mut self, mut stop: watch::Receiver<bool>) {
        loop {
            if *stop.borrow_and_update() {
                return;
            }

            if !self.leadership.is_leader() {
                tokio::select! {
                    _ = stop.changed() => {}
                    _ = self.leadership.changed() => {}
                    _ = time::sleep(Leadership::POLL_INTERVAL) => {}
                }
                continue;
            }

            let key = tokio::select! {
                biased;
                _ = stop.changed() => continue,
                key = self.queue.pop() => key,
            };

            // The lease may have been lost while waiting for a key.
            if !self.leadership.is_leader() {
                debug!(%key, "Not the leader; returning key");
                self.queue.requeue(key);
                continue;
            }

            self.process(key).await;
        }
    }

    async fn process(&self, key: String) {
        let started = time::Instant::now();
        let result = reconcile(&*self.store, &key).await;
        self.metrics.observe(&result, started.elapsed());

        match result {
            Ok(outcome) => {
                debug!(%key, ?outcome, "Reconciled");
                self.queue.forget(&key);
                self.queue.done(&key);
            }
            Err(error) => {
                let failures = self.queue.record_failure(&key);
                let throttle = self.bucket.lock().reserve(time::Instant::now().into_std());
                let delay = self.backoff.delay(failures).max(throttle);
                if error.is_conflict() {
                    debug!(%key, %error, failures, ?delay, "Requeueing after conflict");
                } else {
                    warn!(%key, %error, failures, ?delay, "Failed to reconcile; requeueing");
                }
                self.metrics.requeued();
                self.queue.retry_after(key, delay);
            }
        }
        self.metrics.set_queue_depth(self.queue.len());
    }
}
