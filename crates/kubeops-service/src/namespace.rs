use kubeops_k8s::NamespaceRepository;
use kubeops_types::{KubeOpsError, ReservedNamespaces};
use tracing::debug;

/// Namespace listing and lookup
#[derive(Clone)]
pub struct NamespaceService {
    repo: NamespaceRepository,
}

impl NamespaceService {
    pub fn new(repo: NamespaceRepository) -> Self {
        Self { repo }
    }

    /// Names of all namespaces except the reserved ones, in upstream order
    pub async fn list_namespaces(&self) -> Result<Vec<String>, KubeOpsError> {
        let namespaces = self.repo.list_all().await?;
        let total = namespaces.len();

        let names: Vec<String> = namespaces
            .into_iter()
            .map(|ns| ns.name)
            .filter(|name| !ReservedNamespaces::contains(name))
            .collect();

        debug!(total, visible = names.len(), "filtered reserved namespaces");

        Ok(names)
    }

    /// Confirms the namespace exists and returns its name.
    ///
    /// Reserved namespaces are not filtered here: they stay fetchable by name
    /// even though [`Self::list_namespaces`] hides them.
    pub async fn get_namespace(&self, name: &str) -> Result<String, KubeOpsError> {
        let namespace = self.repo.get_by_name(name).await?;
        Ok(namespace.name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use kubeops_k8s::fake::FakeCluster;

    fn service(cluster: FakeCluster) -> NamespaceService {
        NamespaceService::new(NamespaceRepository::new(Arc::new(cluster)))
    }

    fn cluster_with(names: &[&str]) -> FakeCluster {
        names
            .iter()
            .fold(FakeCluster::new(), |cluster, name| cluster.with_namespace(name))
    }

    #[tokio::test]
    async fn test_list_excludes_reserved_and_keeps_order() {
        let svc = service(cluster_with(&[
            "default",
            "kube-system",
            "dev",
            "kube-public",
            "staging",
        ]));
        assert_eq!(
            svc.list_namespaces().await.unwrap(),
            vec!["default", "dev", "staging"]
        );
    }

    #[tokio::test]
    async fn test_list_excludes_node_lease_and_matches_case_sensitively() {
        let svc = service(cluster_with(&["kube-node-lease", "KUBE-SYSTEM", "prod"]));
        assert_eq!(
            svc.list_namespaces().await.unwrap(),
            vec!["KUBE-SYSTEM", "prod"]
        );
    }

    #[tokio::test]
    async fn test_list_of_only_reserved_is_empty() {
        let svc = service(cluster_with(&["kube-system", "kube-public"]));
        assert!(svc.list_namespaces().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reserved_namespace_is_fetchable_by_name() {
        let svc = service(cluster_with(&["default", "kube-system"]));
        assert_eq!(svc.get_namespace("kube-system").await.unwrap(), "kube-system");
        assert!(
            !svc.list_namespaces()
                .await
                .unwrap()
                .contains(&"kube-system".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_missing_namespace_is_not_found() {
        let svc = service(cluster_with(&["default"]));
        assert!(svc.get_namespace("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_upstream_error_passes_through() {
        let svc = service(cluster_with(&["default"]).failing(503, "apiserver unavailable"));
        let err = svc.list_namespaces().await.unwrap_err();
        assert!(matches!(err, KubeOpsError::Upstream { .. }));
    }
}
