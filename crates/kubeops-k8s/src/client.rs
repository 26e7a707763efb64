use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::Api;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::{debug, info};

use kubeops_types::KubeOpsError;

/// Dependency name used for the cluster in errors and health reports.
const DEPENDENCY: &str = "kubernetes";

/// Timeout for connecting to the K8s API
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reading K8s API responses
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Read capability over the cluster control plane.
///
/// Repositories and probes only depend on this trait, so a test double can
/// stand in for a live cluster. Failures are returned as raw [`kube::Error`]s
/// and classified by the caller.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Lists every namespace, in the order the API server returns them.
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, kube::Error>;

    /// Fetches a single namespace by name.
    async fn get_namespace(&self, name: &str) -> Result<Namespace, kube::Error>;

    /// Lists pods in one namespace, or across all namespaces when `None`.
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, kube::Error>;

    /// Fetches a single pod.
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, kube::Error>;

    /// Returns the API server version. Used as a cheap liveness check.
    async fn server_version(&self) -> Result<String, kube::Error>;
}

/// Settings used to build the cluster connection
#[derive(Clone, Debug)]
pub struct ConnectOptions {
    /// Explicit kubeconfig file. When unset, in-cluster credentials are tried
    /// first and the default kubeconfig second.
    pub kubeconfig: Option<PathBuf>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// [`ClusterApi`] backed by a live kube-rs client
#[derive(Clone)]
pub struct KubeCluster {
    client: kube::Client,
}

impl KubeCluster {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    /// Resolve credentials and build an authenticated client
    pub async fn connect(options: &ConnectOptions) -> Result<Self, KubeOpsError> {
        let mut config = match &options.kubeconfig {
            Some(path) => {
                info!(kubeconfig = %path.display(), "using kubeconfig file");
                let kubeconfig = Kubeconfig::read_from(path)
                    .map_err(|e| KubeOpsError::connection_init(DEPENDENCY, e))?;
                kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| KubeOpsError::connection_init(DEPENDENCY, e))?
            }
            None => match kube::Config::incluster() {
                Ok(config) => {
                    info!("using in-cluster configuration");
                    config
                }
                Err(e) => {
                    debug!(error = %e, "in-cluster configuration unavailable");
                    info!("falling back to default kubeconfig");
                    kube::Config::from_kubeconfig(&KubeConfigOptions::default())
                        .await
                        .map_err(|e| KubeOpsError::connection_init(DEPENDENCY, e))?
                }
            },
        };

        config.connect_timeout = Some(options.connect_timeout);
        config.read_timeout = Some(options.read_timeout);

        let client = kube::Client::try_from(config)
            .map_err(|e| KubeOpsError::connection_init(DEPENDENCY, e))?;

        Ok(Self::new(client))
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, kube::Error> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn get_namespace(&self, name: &str) -> Result<Namespace, kube::Error> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        namespaces.get(name).await
    }

    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, kube::Error> {
        let pods: Api<Pod> = match namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        };
        let list = pods.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, kube::Error> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        pods.get(name).await
    }

    async fn server_version(&self) -> Result<String, kube::Error> {
        let info = self.client.apiserver_version().await?;
        Ok(info.git_version)
    }
}
