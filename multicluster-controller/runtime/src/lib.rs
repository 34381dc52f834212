#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use multicluster_controller_core as core;
pub use multicluster_controller_k8s_api as k8s;
pub use multicluster_controller_k8s_index as index;
pub use multicluster_controller_k8s_sync as sync;

mod args;
mod controllers;
mod lease;

pub use self::{args::Args, controllers::Controllers};
