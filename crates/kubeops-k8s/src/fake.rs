//! In-memory [`ClusterApi`] for tests

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, NamespaceStatus, Pod, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::ErrorResponse;

use crate::client::ClusterApi;

/// Build the error the API server returns for a failed request
pub fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    })
}

pub fn namespace(name: &str) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        status: Some(NamespaceStatus {
            phase: Some("Active".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn pod(namespace: &str, name: &str, phase: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// A fixed cluster snapshot, optionally failing every call
#[derive(Clone, Debug, Default)]
pub struct FakeCluster {
    namespaces: Vec<Namespace>,
    pods: Vec<Pod>,
    failure: Option<(u16, String)>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, name: &str) -> Self {
        self.namespaces.push(namespace(name));
        self
    }

    pub fn with_pod(mut self, namespace: &str, name: &str, phase: &str) -> Self {
        self.pods.push(pod(namespace, name, phase));
        self
    }

    /// Make every call fail with the given API status code
    pub fn failing(mut self, code: u16, message: &str) -> Self {
        self.failure = Some((code, message.to_string()));
        self
    }

    fn check(&self) -> Result<(), kube::Error> {
        match &self.failure {
            Some((code, message)) => Err(api_error(*code, "InternalError", message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, kube::Error> {
        self.check()?;
        Ok(self.namespaces.clone())
    }

    async fn get_namespace(&self, name: &str) -> Result<Namespace, kube::Error> {
        self.check()?;
        self.namespaces
            .iter()
            .find(|ns| ns.metadata.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| {
                api_error(
                    404,
                    "NotFound",
                    &format!("namespaces \"{}\" not found", name),
                )
            })
    }

    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, kube::Error> {
        self.check()?;
        Ok(self
            .pods
            .iter()
            .filter(|p| namespace.is_none() || p.metadata.namespace.as_deref() == namespace)
            .cloned()
            .collect())
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, kube::Error> {
        self.check()?;
        self.pods
            .iter()
            .find(|p| {
                p.metadata.namespace.as_deref() == Some(namespace)
                    && p.metadata.name.as_deref() == Some(name)
            })
            .cloned()
            .ok_or_else(|| api_error(404, "NotFound", &format!("pods \"{}\" not found", name)))
    }

    async fn server_version(&self) -> Result<String, kube::Error> {
        self.check()?;
        Ok("v1.31.0".to_string())
    }
}
