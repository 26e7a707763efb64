use std::sync::Arc;

use k8s_openapi::api::core::v1::{Namespace, Pod};
use tracing::debug;

use kubeops_types::{KubeOpsError, NamespaceInfo, Operation, PodInfo, PodPhase};

use crate::client::ClusterApi;

/// Classify a failed single-object read. A 404 from the API server means the
/// object does not exist; anything else is an upstream failure.
fn get_error(operation: Operation, err: kube::Error) -> KubeOpsError {
    let missing = matches!(&err, kube::Error::Api(response) if response.code == 404);
    if missing {
        KubeOpsError::not_found(operation, err)
    } else {
        KubeOpsError::upstream(operation, err)
    }
}

/// List calls never report not-found; every failure is upstream.
fn list_error(operation: Operation, err: kube::Error) -> KubeOpsError {
    KubeOpsError::upstream(operation, err)
}

/// Convert a k8s Namespace to NamespaceInfo
fn namespace_to_info(ns: Namespace) -> NamespaceInfo {
    let name = ns.metadata.name.unwrap_or_default();
    let status = ns
        .status
        .and_then(|s| s.phase)
        .unwrap_or_else(|| "Unknown".to_string());
    NamespaceInfo::new(name, status)
}

/// Convert a k8s Pod to PodInfo
fn pod_to_info(pod: Pod) -> PodInfo {
    let name = pod.metadata.name.unwrap_or_default();
    let namespace = pod.metadata.namespace.unwrap_or_default();
    let phase = pod
        .status
        .and_then(|s| s.phase)
        .as_deref()
        .map(PodPhase::from)
        .unwrap_or(PodPhase::Unknown);

    PodInfo::new(name, namespace).with_phase(phase)
}

/// Read access to namespaces
#[derive(Clone)]
pub struct NamespaceRepository {
    cluster: Arc<dyn ClusterApi>,
}

impl NamespaceRepository {
    pub fn new(cluster: Arc<dyn ClusterApi>) -> Self {
        Self { cluster }
    }

    /// All namespaces, in upstream order
    pub async fn list_all(&self) -> Result<Vec<NamespaceInfo>, KubeOpsError> {
        let namespaces = self
            .cluster
            .list_namespaces()
            .await
            .map_err(|e| list_error(Operation::ListNamespaces, e))?;

        debug!(count = namespaces.len(), "listed namespaces");

        Ok(namespaces.into_iter().map(namespace_to_info).collect())
    }

    pub async fn get_by_name(&self, name: &str) -> Result<NamespaceInfo, KubeOpsError> {
        let namespace = self.cluster.get_namespace(name).await.map_err(|e| {
            get_error(
                Operation::GetNamespace {
                    name: name.to_string(),
                },
                e,
            )
        })?;

        Ok(namespace_to_info(namespace))
    }
}

/// Read access to pods
#[derive(Clone)]
pub struct PodRepository {
    cluster: Arc<dyn ClusterApi>,
}

impl PodRepository {
    pub fn new(cluster: Arc<dyn ClusterApi>) -> Self {
        Self { cluster }
    }

    /// Pods in a single namespace.
    ///
    /// The namespace itself is not validated: an unknown namespace yields an
    /// empty list, the same as a namespace without pods.
    pub async fn list_by_namespace(&self, namespace: &str) -> Result<Vec<PodInfo>, KubeOpsError> {
        let pods = self
            .cluster
            .list_pods(Some(namespace))
            .await
            .map_err(|e| {
                list_error(
                    Operation::ListPods {
                        namespace: namespace.to_string(),
                    },
                    e,
                )
            })?;

        debug!(namespace, count = pods.len(), "listed pods");

        Ok(pods.into_iter().map(pod_to_info).collect())
    }

    pub async fn get_by_name(&self, namespace: &str, name: &str) -> Result<PodInfo, KubeOpsError> {
        let pod = self.cluster.get_pod(namespace, name).await.map_err(|e| {
            get_error(
                Operation::GetPod {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                },
                e,
            )
        })?;

        Ok(pod_to_info(pod))
    }

    /// Pods across every namespace, in upstream order
    pub async fn list_all(&self) -> Result<Vec<PodInfo>, KubeOpsError> {
        let pods = self
            .cluster
            .list_pods(None)
            .await
            .map_err(|e| list_error(Operation::ListAllPods, e))?;

        debug!(count = pods.len(), "listed pods across all namespaces");

        Ok(pods.into_iter().map(pod_to_info).collect())
    }
}
