use crate::{admit_cluster, admit_policy, policy_to_keys, Event, Queue};
use ahash::AHashMap as HashMap;
use multicluster_controller_k8s_api::{
    Cluster, ClusterPropagationPolicy, PropagationSpec, ResourceExt,
};
use parking_lot::RwLock;
use std::sync::Arc;

/// Turns `Cluster` watch updates into reconciliation keys.
///
/// The watch only reports the current state of an object, so the last state
/// of each cluster is remembered to tell creates from updates and to compare
/// liveness across an update.
pub struct ClusterEvents {
    queue: Arc<Queue>,
    clusters: HashMap<String, Cluster>,
}

/// Turns deletions of the service export policy into the sentinel key.
pub struct PolicyEvents {
    queue: Arc<Queue>,
    policies: HashMap<String, ClusterPropagationPolicy>,
}

// === impl ClusterEvents ===

impl ClusterEvents {
    pub fn shared(queue: Arc<Queue>) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(Self {
            queue,
            clusters: HashMap::new(),
        }))
    }
}

impl kubert::index::IndexClusterResource<Cluster> for ClusterEvents {
    fn apply(&mut self, cluster: Cluster) {
        let name = cluster.name_unchecked();
        let admitted = match self.clusters.get(&name) {
            Some(old) => admit_cluster(&Event::Updated { old, new: &cluster }),
            None => admit_cluster(&Event::Created(&cluster)),
        };
        if admitted {
            tracing::debug!(%name, live = cluster.is_live(), "Cluster changed");
            self.queue.push(name.clone());
        }
        self.clusters.insert(name, cluster);
    }

    fn delete(&mut self, name: String) {
        let admitted = match self.clusters.remove(&name) {
            Some(cluster) => admit_cluster(&Event::Deleted(&cluster)),
            // A cluster that was never observed may still be listed in the
            // policy.
            None => true,
        };
        if admitted {
            tracing::debug!(%name, "Cluster deleted");
            self.queue.push(name);
        }
    }
}

// === impl PolicyEvents ===

impl PolicyEvents {
    pub fn shared(queue: Arc<Queue>) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(Self {
            queue,
            policies: HashMap::new(),
        }))
    }
}

impl kubert::index::IndexClusterResource<ClusterPropagationPolicy> for PolicyEvents {
    fn apply(&mut self, policy: ClusterPropagationPolicy) {
        let name = policy.name_unchecked();
        let admitted = match self.policies.get(&name) {
            Some(old) => admit_policy(&Event::Updated { old, new: &policy }),
            None => admit_policy(&Event::Created(&policy)),
        };
        if admitted {
            self.queue.extend(policy_to_keys(&policy));
        }
        self.policies.insert(name, policy);
    }

    fn delete(&mut self, name: String) {
        let policy = self
            .policies
            .remove(&name)
            .unwrap_or_else(|| ClusterPropagationPolicy::new(&name, PropagationSpec::default()));
        if admit_policy(&Event::Deleted(&policy)) {
            tracing::info!(%name, "Policy deleted; recreating");
            self.queue.extend(policy_to_keys(&policy));
        }
    }
}
