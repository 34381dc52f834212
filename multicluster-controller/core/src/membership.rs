//! Mutation of a cluster membership list.
//!
//! A membership list is an ordered `Vec` of cluster names that is treated as
//! a set. Entries are appended at the end so that updates produce minimal
//! diffs, and removal preserves the relative order of the remaining entries.

/// What a reconciliation wants to be true of a single cluster's entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// The cluster is live and must be listed.
    Ensure,
    /// The cluster is gone (or going) and must not be listed.
    Remove,
}

/// Applies `intent` for `name` to `names`, returning true iff the list was
/// modified.
///
/// Removal only drops the first matching entry. Lists maintained through this
/// function never hold duplicates, so any further occurrences can only have
/// been written by someone else and are left for them to deal with.
pub fn apply_intent(names: &mut Vec<String>, name: &str, intent: Intent) -> bool {
    let pos = names.iter().position(|n| n == name);
    match (intent, pos) {
        (Intent::Ensure, Some(_)) | (Intent::Remove, None) => false,
        (Intent::Ensure, None) => {
            names.push(name.to_string());
            true
        }
        (Intent::Remove, Some(idx)) => {
            names.remove(idx);
            true
        }
    }
}
