use std::time::Duration;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures talking to the API server. All of them are transient: the failed
/// key is requeued and reconciled again from a fresh read.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A write raced with another writer.
    #[error("conflicting write to ClusterPropagationPolicy {name}")]
    Conflict { name: String },

    #[error("API request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API request failed: {0}")]
    Api(#[source] kube::Error),
}

// === impl Error ===

impl Error {
    /// Classifies the failure of a write to the named object. The API server
    /// rejects stale updates and duplicate creates with a 409.
    pub(crate) fn write(name: &str, error: kube::Error) -> Self {
        match error {
            kube::Error::Api(response) if response.code == 409 => Self::Conflict {
                name: name.to_string(),
            },
            error => Self::Api(error),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Conflict { .. } => "conflict",
            Self::Timeout(_) => "timeout",
            Self::Api(_) => "api",
        }
    }
}

impl From<kube::Error> for Error {
    fn from(error: kube::Error) -> Self {
        Self::Api(error)
    }
}
