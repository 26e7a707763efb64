#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kubeops_api::{ApiState, run};
use kubeops_health::{ClusterProbe, HealthAggregator, Probe};
use kubeops_k8s::fake::FakeCluster;
use kubeops_k8s::{ClusterApi, NamespaceRepository, PodRepository};
use kubeops_service::{NamespaceService, PodService};
use kubeops_types::BoxError;

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    server_handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl TestApp {
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", &self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

/// Spawns the API against `cluster`, with the cluster as the only health dependency.
pub async fn spawn_test_app(cluster: FakeCluster) -> TestApp {
    let cluster: Arc<dyn ClusterApi> = Arc::new(cluster);
    let health = HealthAggregator::default().with_probe(Arc::new(ClusterProbe::new(cluster.clone())));
    spawn_test_app_with(cluster, health).await
}

pub async fn spawn_test_app_with(cluster: Arc<dyn ClusterApi>, health: HealthAggregator) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let state = ApiState {
        namespaces: NamespaceService::new(NamespaceRepository::new(cluster.clone())),
        pods: PodService::new(PodRepository::new(cluster)),
        health,
        service_name: "kubeops".to_string(),
    };

    let server = run(listener, state).expect("failed to build server");
    let server_handle = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
        api_client: reqwest::Client::new(),
        server_handle,
    }
}

/// Probe with a fixed outcome, optionally slow
pub struct StaticProbe {
    pub name: &'static str,
    pub healthy: bool,
    pub delay: Option<Duration>,
}

impl StaticProbe {
    pub fn ok(name: &'static str) -> Arc<dyn Probe> {
        Arc::new(Self {
            name,
            healthy: true,
            delay: None,
        })
    }

    pub fn down(name: &'static str) -> Arc<dyn Probe> {
        Arc::new(Self {
            name,
            healthy: false,
            delay: None,
        })
    }

    pub fn hanging(name: &'static str) -> Arc<dyn Probe> {
        Arc::new(Self {
            name,
            healthy: true,
            delay: Some(Duration::from_secs(60)),
        })
    }
}

#[async_trait]
impl Probe for StaticProbe {
    fn name(&self) -> &str {
        self.name
    }

    async fn ping(&self) -> Result<(), BoxError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.healthy {
            Ok(())
        } else {
            Err("connection refused".into())
        }
    }
}
