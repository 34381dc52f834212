use once_cell::sync::Lazy;
use regex::Regex;

/// A reconciliation key that never names a real cluster.
///
/// Deleting the aggregate policy enqueues this key so that the standard
/// reconcile path runs and rebuilds the policy from scratch. Cluster names are
/// RFC 1123 subdomains, which cannot start with `@`, so this key is disjoint
/// from every cluster name the API server will accept.
pub const SENTINEL_CLUSTER_NAME: &str = "@serviceexport-policy-deleted";

const MAX_SUBDOMAIN_LEN: usize = 253;

static DNS_1123_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("subdomain regex must compile")
});

/// Tests whether `name` is a valid RFC 1123 DNS subdomain, which is what the
/// API server requires of a `Cluster` name.
pub fn is_valid_cluster_name(name: &str) -> bool {
    name.len() <= MAX_SUBDOMAIN_LEN && DNS_1123_SUBDOMAIN.is_match(name)
}
