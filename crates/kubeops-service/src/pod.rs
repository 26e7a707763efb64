use kubeops_k8s::PodRepository;
use kubeops_types::{KubeOpsError, PodSummary};

/// Pod listing and lookup
#[derive(Clone)]
pub struct PodService {
    repo: PodRepository,
}

impl PodService {
    pub fn new(repo: PodRepository) -> Self {
        Self { repo }
    }

    /// Pod names in one namespace, in upstream order.
    /// Unknown and empty namespaces both yield an empty list.
    pub async fn list_pods_in_namespace(&self, namespace: &str) -> Result<Vec<String>, KubeOpsError> {
        let pods = self.repo.list_by_namespace(namespace).await?;
        Ok(pods.into_iter().map(|pod| pod.name).collect())
    }

    pub async fn get_pod(&self, namespace: &str, name: &str) -> Result<String, KubeOpsError> {
        let pod = self.repo.get_by_name(namespace, name).await?;
        Ok(pod.name)
    }

    /// Every pod in the cluster as namespace, name and phase.
    ///
    /// Pods in reserved namespaces are included; only the namespace listing
    /// hides those.
    pub async fn list_all_pods(&self) -> Result<Vec<PodSummary>, KubeOpsError> {
        let pods = self.repo.list_all().await?;
        Ok(pods.into_iter().map(PodSummary::from).collect())
    }
}
