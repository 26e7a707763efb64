use std::fmt;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A read operation issued against the cluster, with the identifiers it targeted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    ListNamespaces,
    GetNamespace { name: String },
    ListPods { namespace: String },
    GetPod { namespace: String, name: String },
    ListAllPods,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListNamespaces => write!(f, "list namespaces"),
            Self::GetNamespace { name } => write!(f, "get namespace {}", name),
            Self::ListPods { namespace } => write!(f, "list pods in namespace {}", namespace),
            Self::GetPod { namespace, name } => {
                write!(f, "get pod {} in namespace {}", name, namespace)
            }
            Self::ListAllPods => write!(f, "list all pods"),
        }
    }
}

/// Errors surfaced by the repository and service layers.
///
/// The set is closed: the HTTP layer maps each variant to exactly one status.
#[derive(Debug, Error)]
pub enum KubeOpsError {
    /// The requested resource does not exist in the cluster.
    #[error("{operation}: not found ({source})")]
    NotFound {
        operation: Operation,
        #[source]
        source: BoxError,
    },

    /// The cluster connection could not satisfy the call.
    #[error("failed to {operation}: {source}")]
    Upstream {
        operation: Operation,
        #[source]
        source: BoxError,
    },

    /// A dependency handle could not be constructed at startup.
    #[error("failed to initialize {dependency} connection: {source}")]
    ConnectionInit {
        dependency: String,
        #[source]
        source: BoxError,
    },
}

impl KubeOpsError {
    pub fn not_found(operation: Operation, source: impl Into<BoxError>) -> Self {
        Self::NotFound {
            operation,
            source: source.into(),
        }
    }

    pub fn upstream(operation: Operation, source: impl Into<BoxError>) -> Self {
        Self::Upstream {
            operation,
            source: source.into(),
        }
    }

    pub fn connection_init(dependency: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::ConnectionInit {
            dependency: dependency.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The operation that failed, if the error came from a cluster read.
    pub fn operation(&self) -> Option<&Operation> {
        match self {
            Self::NotFound { operation, .. } | Self::Upstream { operation, .. } => Some(operation),
            Self::ConnectionInit { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_carries_cause() {
        let err = KubeOpsError::upstream(
            Operation::ListPods {
                namespace: "dev".to_string(),
            },
            "connection refused",
        );
        assert_eq!(
            err.to_string(),
            "failed to list pods in namespace dev: connection refused"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_message() {
        let err = KubeOpsError::not_found(
            Operation::GetPod {
                namespace: "default".to_string(),
                name: "missing".to_string(),
            },
            "pods \"missing\" not found",
        );
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("get pod missing in namespace default"));
    }
}
