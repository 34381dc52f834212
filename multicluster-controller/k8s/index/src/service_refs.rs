use multicluster_controller_k8s_api::MultiClusterIngress;
use std::collections::BTreeSet;

/// The key under which the backend service names of a `MultiClusterIngress`
/// are indexed.
pub const INDEX_KEY_SERVICE_REF_NAME: &str = "mci.serviceRef.name";

/// Returns the names of all services referenced by an ingress, sorted and
/// without duplicates.
///
/// Both the default backend and the backends of every HTTP rule path are
/// considered. Absent fields and backends that reference something other than
/// a service contribute nothing.
pub fn build_service_refs(mci: &MultiClusterIngress) -> Vec<String> {
    let spec = &mci.spec.ingress;
    let default = spec.default_backend.iter();
    let paths = spec
        .rules
        .iter()
        .flatten()
        .filter_map(|rule| rule.http.as_ref())
        .flat_map(|http| http.paths.iter().map(|path| &path.backend));

    default
        .chain(paths)
        .filter_map(|backend| backend.service.as_ref())
        .map(|service| service.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use multicluster_controller_k8s_api::networking::{
        HTTPIngressPath, HTTPIngressRuleValue, IngressBackend, IngressRule,
        IngressServiceBackend, IngressSpec, TypedLocalObjectReference,
    };

    fn mci(spec: IngressSpec) -> MultiClusterIngress {
        MultiClusterIngress::new("mci", spec.into())
    }

    fn service(name: &str) -> IngressBackend {
        IngressBackend {
            service: Some(IngressServiceBackend {
                name: name.to_string(),
                port: None,
            }),
            resource: None,
        }
    }

    fn rule(backends: &[IngressBackend]) -> IngressRule {
        IngressRule {
            host: None,
            http: Some(HTTPIngressRuleValue {
                paths: backends
                    .iter()
                    .map(|backend| HTTPIngressPath {
                        path: Some("/".to_string()),
                        path_type: "Prefix".to_string(),
                        backend: backend.clone(),
                    })
                    .collect(),
            }),
        }
    }

    #[test]
    fn empty_spec_has_no_refs() {
        assert!(build_service_refs(&mci(IngressSpec::default())).is_empty());

        let spec = IngressSpec {
            rules: Some(vec![
                IngressRule::default(),
                IngressRule {
                    host: Some("example.com".to_string()),
                    http: Some(HTTPIngressRuleValue::default()),
                },
            ]),
            ..Default::default()
        };
        assert!(build_service_refs(&mci(spec)).is_empty());
    }

    #[test]
    fn dedups_default_and_paths() {
        let spec = IngressSpec {
            default_backend: Some(service("web")),
            rules: Some(vec![rule(&[service("web")]), rule(&[service("web")])]),
            ..Default::default()
        };
        assert_eq!(build_service_refs(&mci(spec)), vec!["web".to_string()]);
    }

    #[test]
    fn sorted_lexically() {
        let spec = IngressSpec {
            default_backend: Some(service("zeta")),
            rules: Some(vec![
                rule(&[service("mu"), service("alpha")]),
                IngressRule::default(),
                rule(&[service("beta")]),
            ]),
            ..Default::default()
        };
        assert_eq!(
            build_service_refs(&mci(spec)),
            vec![
                "alpha".to_string(),
                "beta".to_string(),
                "mu".to_string(),
                "zeta".to_string()
            ]
        );
    }

    #[test]
    fn ignores_resource_backends() {
        let bucket = IngressBackend {
            service: None,
            resource: Some(TypedLocalObjectReference {
                api_group: Some("storage.example.com".to_string()),
                kind: "Bucket".to_string(),
                name: "static".to_string(),
            }),
        };
        let spec = IngressSpec {
            default_backend: Some(bucket.clone()),
            rules: Some(vec![rule(&[bucket, service("api")])]),
            ..Default::default()
        };
        assert_eq!(build_service_refs(&mci(spec)), vec!["api".to_string()]);
    }
}
