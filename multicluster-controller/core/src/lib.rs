#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod backoff;
pub mod membership;
mod name;
mod token_bucket;

pub use self::{
    backoff::Backoff,
    membership::{apply_intent, Intent},
    name::{is_valid_cluster_name, SENTINEL_CLUSTER_NAME},
    token_bucket::TokenBucket,
};

/// The name used by the membership synchronizer when it reports itself, e.g.
/// as a field manager.
pub const CONTROLLER_NAME: &str = "crd-synchronizer";
