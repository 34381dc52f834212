use crate::{build_service_refs, ResourceId};
use ahash::AHashMap as HashMap;
use kube::ResourceExt;
use multicluster_controller_k8s_api::MultiClusterIngress;
use parking_lot::RwLock;
use std::{collections::BTreeSet, sync::Arc};

pub type SharedIndex = Arc<RwLock<Index>>;

/// Indexes `MultiClusterIngress` resources by the services they reference.
#[derive(Debug, Default)]
pub struct Index {
    /// The service names referenced by each ingress.
    ingresses: HashMap<ResourceId, Vec<String>>,

    /// The ingresses referencing each service name.
    services: HashMap<String, BTreeSet<ResourceId>>,

    /// Running totals per namespace.
    namespaces: HashMap<String, NamespaceTotals>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct NamespaceTotals {
    ingresses: usize,
    refs: usize,
}

// === impl Index ===

impl Index {
    pub fn shared() -> SharedIndex {
        Arc::new(RwLock::new(Self::default()))
    }

    /// Returns the ingresses, in any namespace, that reference a service with
    /// the given name.
    pub fn referencing(&self, service: &str) -> BTreeSet<ResourceId> {
        self.services.get(service).cloned().unwrap_or_default()
    }

    /// Returns the ingresses in `namespace` that reference the given service.
    pub fn referencing_in(&self, namespace: &str, service: &str) -> BTreeSet<ResourceId> {
        self.services
            .get(service)
            .into_iter()
            .flatten()
            .filter(|id| id.namespace == namespace)
            .cloned()
            .collect()
    }

    /// Returns the sorted service names referenced by an ingress.
    pub fn references_of(&self, id: &ResourceId) -> &[String] {
        self.ingresses
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.ingresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingresses.is_empty()
    }

    /// Counts the ingresses in `namespace` and the service references they
    /// hold.
    pub fn namespace_totals(&self, namespace: &str) -> (usize, usize) {
        self.namespaces
            .get(namespace)
            .map_or((0, 0), |totals| (totals.ingresses, totals.refs))
    }

    fn update(&mut self, id: ResourceId, refs: Vec<String>) {
        if self.ingresses.get(&id) == Some(&refs) {
            return;
        }

        self.remove(&id);
        for service in &refs {
            self.services
                .entry(service.clone())
                .or_default()
                .insert(id.clone());
        }
        let totals = self.namespaces.entry(id.namespace.clone()).or_default();
        totals.ingresses += 1;
        totals.refs += refs.len();
        self.ingresses.insert(id, refs);
    }

    fn remove(&mut self, id: &ResourceId) {
        let Some(old) = self.ingresses.remove(id) else {
            return;
        };

        for service in &old {
            if let Some(ids) = self.services.get_mut(service) {
                ids.remove(id);
                if ids.is_empty() {
                    self.services.remove(service);
                }
            }
        }

        if let Some(totals) = self.namespaces.get_mut(&id.namespace) {
            totals.ingresses -= 1;
            totals.refs -= old.len();
            if totals.ingresses == 0 {
                self.namespaces.remove(&id.namespace);
            }
        }
    }
}

impl kubert::index::IndexNamespacedResource<MultiClusterIngress> for Index {
    fn apply(&mut self, mci: MultiClusterIngress) {
        let namespace = mci
            .namespace()
            .expect("MultiClusterIngress must have a namespace");
        let name = mci.name_unchecked();
        let refs = build_service_refs(&mci);
        tracing::debug!(%namespace, %name, services = ?refs, "Indexing MultiClusterIngress");
        self.update(ResourceId::new(namespace, name), refs);
    }

    fn delete(&mut self, namespace: String, name: String) {
        tracing::debug!(%namespace, %name, "Removing MultiClusterIngress");
        self.remove(&ResourceId::new(namespace, name));
    }

    // Each apply reindexes a single ingress, so resets need no special
    // handling.
}
