//! Keeps the service export `ClusterPropagationPolicy` targeting exactly the
//! set of live member clusters.
//!
//! `Cluster` events are admitted only when a cluster appears, disappears, or
//! flips between live and deleting; deletion of the policy itself is mapped to
//! a sentinel key. Admitted events become keys on a deduplicating [`Queue`],
//! and a pool of workers runs [`reconcile`] for each key:
//!
//! ```text
//! [ Cluster ] --admit--> (name) ---------\
//!                                         +--> [ Queue ] --> reconcile(key) --> [ ClusterPropagationPolicy ]
//! [ ClusterPropagationPolicy ] --delete--> (sentinel) ---/
//! ```
//!
//! Reconciliation is stateless: each attempt reads the cluster and the policy,
//! and performs at most one write. Writes rely on the API server's optimistic
//! concurrency; a conflicting write fails the attempt and the key is retried
//! with backoff from a fresh read.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod admission;
mod controller;
mod error;
mod metrics;
mod queue;
mod reconcile;
mod store;
mod watch;


pub use self::{
    admission::{admit_cluster, admit_policy, policy_to_keys, Event},
    controller::{Controller, Leadership},
    error::{Error, Result},
    metrics::ControllerMetrics,
    queue::Queue,
    reconcile::{reconcile, service_export_policy, Outcome},
    store::{KubeStore, Store},
    watch::{ClusterEvents, PolicyEvents},
};
