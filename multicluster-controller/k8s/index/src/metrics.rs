use crate::SharedIndex;
use kube::ResourceExt;
use kubert::index::IndexNamespacedResource;
use multicluster_controller_k8s_api::MultiClusterIngress;
use parking_lot::RwLock;
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, gauge::Gauge},
    registry::Registry,
};
use std::sync::Arc;

/// Feeds a [`SharedIndex`] from a watch while recording, per namespace, how
/// many ingresses and service references it holds.
pub struct IndexMetrics {
    index: SharedIndex,

    ingresses: Family<NamespaceLabels, Gauge>,
    service_refs: Family<NamespaceLabels, Gauge>,
    applies: Family<NamespaceLabels, Counter>,
    deletes: Family<NamespaceLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct NamespaceLabels {
    namespace: String,
}

// === impl IndexMetrics ===

impl IndexMetrics {
    pub fn register(index: SharedIndex, prom: &mut Registry) -> Self {
        let ingresses = Family::default();
        prom.register(
            "index_size",
            "Number of MultiClusterIngresses in the index",
            ingresses.clone(),
        );

        let service_refs = Family::default();
        prom.register(
            "index_service_refs",
            "Number of service references held by indexed MultiClusterIngresses",
            service_refs.clone(),
        );

        let applies = Family::default();
        prom.register(
            "index_applies",
            "Count of MultiClusterIngress updates applied to the index",
            applies.clone(),
        );

        let deletes = Family::default();
        prom.register(
            "index_deletes",
            "Count of MultiClusterIngress deletions applied to the index",
            deletes.clone(),
        );

        Self {
            index,
            ingresses,
            service_refs,
            applies,
            deletes,
        }
    }

    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    fn observe(&self, labels: &NamespaceLabels) {
        let (ingresses, refs) = self.index.read().namespace_totals(&labels.namespace);
        self.ingresses.get_or_create(labels).set(ingresses as i64);
        self.service_refs.get_or_create(labels).set(refs as i64);
    }
}

impl IndexNamespacedResource<MultiClusterIngress> for IndexMetrics {
    fn apply(&mut self, mci: MultiClusterIngress) {
        let labels = NamespaceLabels {
            namespace: mci.namespace().unwrap_or_default(),
        };
        self.applies.get_or_create(&labels).inc();
        self.index.write().apply(mci);
        self.observe(&labels);
    }

    fn delete(&mut self, namespace: String, name: String) {
        let labels = NamespaceLabels {
            namespace: namespace.clone(),
        };
        self.deletes.get_or_create(&labels).inc();
        self.index.write().delete(namespace, name);
        self.observe(&labels);
    }
}
