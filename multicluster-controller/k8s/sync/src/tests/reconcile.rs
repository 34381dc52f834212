use super::{deleting, mk_cluster, names, store::MemoryStore};
use crate::{reconcile, service_export_policy, Error, Outcome};
use multicluster_controller_core::SENTINEL_CLUSTER_NAME;
use multicluster_controller_k8s_api::{SERVICE_EXPORT_CRD_NAME, SERVICE_EXPORT_POLICY_NAME};

#[tokio::test]
async fn bootstraps_from_live_clusters() {
    let store = MemoryStore::with_clusters([
        mk_cluster("a"),
        mk_cluster("b"),
        deleting(mk_cluster("x")),
    ]);

    let outcome = reconcile(&store, "a").await.expect("reconcile must succeed");
    assert_eq!(
        outcome,
        Outcome::Created {
            clusters: names(&["a", "b"])
        }
    );

    let policy = store.policy().expect("policy must be created");
    assert_eq!(policy.metadata.name.as_deref(), Some(SERVICE_EXPORT_POLICY_NAME));
    assert_eq!(policy.cluster_names(), names(&["a", "b"]));
    let selectors = &policy.spec.resource_selectors;
    assert_eq!(selectors.len(), 1);
    assert_eq!(selectors[0].api_version, "apiextensions.k8s.io/v1");
    assert_eq!(selectors[0].kind, "CustomResourceDefinition");
    assert_eq!(selectors[0].name.as_deref(), Some(SERVICE_EXPORT_CRD_NAME));
}

#[tokio::test]
async fn bootstraps_empty_policy() {
    let store = MemoryStore::default();
    let outcome = reconcile(&store, "gone").await.expect("reconcile must succeed");
    assert_eq!(outcome, Outcome::Created { clusters: vec![] });
    assert_eq!(store.policy_clusters(), Some(vec![]));
}

#[tokio::test]
async fn second_reconcile_is_noop() {
    let store = MemoryStore::with_clusters([mk_cluster("a")]);
    store.put_policy(service_export_policy(vec![]));

    assert_eq!(reconcile(&store, "a").await.unwrap(), Outcome::Added);
    assert_eq!(store.writes(), (0, 1));

    assert_eq!(reconcile(&store, "a").await.unwrap(), Outcome::Unchanged);
    assert_eq!(store.writes(), (0, 1));
}

#[tokio::test]
async fn removes_deleting_cluster() {
    let store = MemoryStore::with_clusters([mk_cluster("a"), deleting(mk_cluster("b"))]);
    store.put_policy(service_export_policy(names(&["a", "b", "c"])));

    assert_eq!(reconcile(&store, "b").await.unwrap(), Outcome::Removed);
    assert_eq!(store.policy_clusters(), Some(names(&["a", "c"])));

    assert_eq!(reconcile(&store, "b").await.unwrap(), Outcome::Unchanged);
}

#[tokio::test]
async fn removes_missing_cluster() {
    let store = MemoryStore::with_clusters([mk_cluster("a")]);
    store.put_policy(service_export_policy(names(&["a", "b"])));

    assert_eq!(reconcile(&store, "b").await.unwrap(), Outcome::Removed);
    assert_eq!(store.policy_clusters(), Some(names(&["a"])));
}

#[tokio::test]
async fn policy_without_affinity() {
    let store = MemoryStore::with_clusters([mk_cluster("a")]);
    let mut policy = service_export_policy(vec![]);
    policy.spec.placement.cluster_affinity = None;
    store.put_policy(policy);

    assert_eq!(reconcile(&store, "b").await.unwrap(), Outcome::Unchanged);
    assert_eq!(store.writes(), (0, 0));

    assert_eq!(reconcile(&store, "a").await.unwrap(), Outcome::Added);
    assert_eq!(store.policy_clusters(), Some(names(&["a"])));
}

#[tokio::test]
async fn sentinel_recreates_deleted_policy() {
    let store = MemoryStore::with_clusters([mk_cluster("a"), mk_cluster("c")]);
    store.put_policy(service_export_policy(names(&["a", "c"])));
    store.delete_policy();

    let outcome = reconcile(&store, SENTINEL_CLUSTER_NAME).await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Created {
            clusters: names(&["a", "c"])
        }
    );
    assert_eq!(store.policy_clusters(), Some(names(&["a", "c"])));
}

#[tokio::test]
async fn sentinel_never_enters_policy() {
    let store = MemoryStore::with_clusters([mk_cluster("a")]);
    store.put_policy(service_export_policy(names(&["a"])));

    assert_eq!(
        reconcile(&store, SENTINEL_CLUSTER_NAME).await.unwrap(),
        Outcome::Unchanged
    );
    assert_eq!(store.policy_clusters(), Some(names(&["a"])));
}

#[tokio::test]
async fn duplicate_entries_removed_one_at_a_time() {
    let store = MemoryStore::default();
    store.put_policy(service_export_policy(names(&["a", "b", "a"])));

    assert_eq!(reconcile(&store, "a").await.unwrap(), Outcome::Removed);
    assert_eq!(store.policy_clusters(), Some(names(&["b", "a"])));

    assert_eq!(reconcile(&store, "a").await.unwrap(), Outcome::Removed);
    assert_eq!(store.policy_clusters(), Some(names(&["b"])));
}

#[tokio::test]
async fn conflict_is_surfaced() {
    let store = MemoryStore::with_clusters([mk_cluster("a")]);
    store.put_policy(service_export_policy(vec![]));
    store.inject_conflicts(1);

    let error = reconcile(&store, "a").await.expect_err("update must conflict");
    assert!(error.is_conflict(), "{error}");
    assert_eq!(store.policy_clusters(), Some(vec![]));

    // A fresh attempt rereads the policy and succeeds.
    assert_eq!(reconcile(&store, "a").await.unwrap(), Outcome::Added);
    assert_eq!(store.policy_clusters(), Some(names(&["a"])));
}

#[tokio::test]
async fn concurrent_bootstrap_conflicts() {
    let store = MemoryStore::with_clusters([mk_cluster("a")]);
    // Another worker created the policy between our lookup and our create.
    store.put_policy(service_export_policy(names(&["a"])));
    let error = crate::Store::create_policy(&store, &service_export_policy(vec![]))
        .await
        .expect_err("create must conflict");
    assert!(error.is_conflict());
}

#[tokio::test]
async fn store_failures_are_surfaced() {
    let store = MemoryStore::with_clusters([mk_cluster("a")]);
    store.inject_timeouts(1);
    let error = reconcile(&store, "a").await.expect_err("lookup must fail");
    assert!(matches!(error, Error::Timeout(_)), "{error}");
    assert!(store.policy().is_none());
}

/// Sources {A, B} live without a policy, then C joins, B leaves and the
/// policy is deleted.
#[tokio::test]
async fn end_to_end() {
    let store = MemoryStore::with_clusters([mk_cluster("a"), mk_cluster("b")]);

    reconcile(&store, "a").await.unwrap();
    assert_eq!(store.policy_clusters(), Some(names(&["a", "b"])));

    store.put_cluster(mk_cluster("c"));
    reconcile(&store, "c").await.unwrap();
    assert_eq!(store.policy_clusters(), Some(names(&["a", "b", "c"])));

    store.put_cluster(deleting(mk_cluster("b")));
    reconcile(&store, "b").await.unwrap();
    assert_eq!(store.policy_clusters(), Some(names(&["a", "c"])));

    store.delete_policy();
    reconcile(&store, SENTINEL_CLUSTER_NAME).await.unwrap();
    assert_eq!(store.policy_clusters(), Some(names(&["a", "c"])));

    // Once B is fully gone nothing changes.
    store.remove_cluster("b");
    assert_eq!(reconcile(&store, "b").await.unwrap(), Outcome::Unchanged);
}

#[tokio::test]
async fn update_keeps_untyped_policy_fields() {
    let store = MemoryStore::with_clusters([mk_cluster("a")]);
    let policy = serde_json::from_value(serde_json::json!({
        "apiVersion": "policy.karmada.io/v1alpha1",
        "kind": "ClusterPropagationPolicy",
        "metadata": { "name": SERVICE_EXPORT_POLICY_NAME },
        "spec": {
            "schedulerName": "default-scheduler",
            "resourceSelectors": [{
                "apiVersion": "apiextensions.k8s.io/v1",
                "kind": "CustomResourceDefinition",
                "name": SERVICE_EXPORT_CRD_NAME,
            }],
            "placement": {
                "clusterTolerations": [{ "key": "not-ready", "operator": "Exists" }],
                "clusterAffinity": { "clusterNames": [], "exclude": ["b"] },
            },
        },
    }))
    .expect("policy must deserialize");
    store.put_policy(policy);

    assert_eq!(reconcile(&store, "a").await.unwrap(), Outcome::Added);

    let written = serde_json::to_value(store.policy().expect("policy must exist"))
        .expect("policy must serialize");
    assert_eq!(written["spec"]["schedulerName"], "default-scheduler");
    assert_eq!(
        written["spec"]["placement"]["clusterTolerations"],
        serde_json::json!([{ "key": "not-ready", "operator": "Exists" }])
    );
    assert_eq!(
        written["spec"]["placement"]["clusterAffinity"],
        serde_json::json!({ "clusterNames": ["a"], "exclude": ["b"] })
    );
}
