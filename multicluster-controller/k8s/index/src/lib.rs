//! Reverse lookup of the services referenced by `MultiClusterIngress`
//! resources.
//!
//! Each ingress names backend services in its default backend and in the
//! paths of its HTTP rules. [`build_service_refs`] extracts the sorted set of
//! those names, and [`Index`] inverts it so that callers interested in a
//! service can find every ingress that routes to it without scanning all
//! ingresses:
//!
//! ```text
//! [ MultiClusterIngress ] -> [ service name ] <- (lookup) <- caller
//! ```
//!
//! The index is rebuilt incrementally from watch events: every apply
//! recomputes the references of a single ingress and every delete drops them.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod index;
mod metrics;
mod resource_id;
mod service_refs;


pub use self::{
    index::{Index, SharedIndex},
    metrics::IndexMetrics,
    resource_id::ResourceId,
    service_refs::{build_service_refs, INDEX_KEY_SERVICE_REF_NAME},
};
