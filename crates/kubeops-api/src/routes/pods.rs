use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::StatusCode,
    web::{Data, Json, Path},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kubeops_service::PodService;
use kubeops_types::{KubeOpsError, PodSummary};

use crate::routes::{error_response, status_for};

#[derive(Debug, Error)]
pub enum PodError {
    #[error("Failed to list pods")]
    List(#[source] KubeOpsError),

    #[error("Failed to get pod")]
    Get(#[source] KubeOpsError),

    #[error("Failed to list all pods")]
    ListAll(#[source] KubeOpsError),
}

impl PodError {
    fn source_error(&self) -> &KubeOpsError {
        match self {
            PodError::List(e) | PodError::Get(e) | PodError::ListAll(e) => e,
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            PodError::Get(e) if e.is_not_found() => "Pod not found".to_string(),
            e => e.to_string(),
        }
    }
}

impl ResponseError for PodError {
    fn status_code(&self) -> StatusCode {
        status_for(self.source_error())
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self.status_code(), &self.to_message(), self.source_error())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadPodsResponse {
    pub data: Vec<String>,
    pub namespace: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadPodResponse {
    pub data: String,
    pub namespace: String,
}

#[derive(Debug, Serialize)]
pub struct ReadAllPodsResponse {
    pub data: Vec<PodSummary>,
}

#[get("/namespaces/{namespace}/pods")]
pub async fn read_pods(
    service: Data<PodService>,
    namespace: Path<String>,
) -> Result<impl Responder, PodError> {
    let namespace = namespace.into_inner();
    let data = service
        .list_pods_in_namespace(&namespace)
        .await
        .map_err(PodError::List)?;

    Ok(Json(ReadPodsResponse { data, namespace }))
}

#[get("/namespaces/{namespace}/pods/{name}")]
pub async fn read_pod(
    service: Data<PodService>,
    path: Path<(String, String)>,
) -> Result<impl Responder, PodError> {
    let (namespace, name) = path.into_inner();
    let data = service
        .get_pod(&namespace, &name)
        .await
        .map_err(PodError::Get)?;

    Ok(Json(ReadPodResponse { data, namespace }))
}

/// Pods across every namespace, reserved namespaces included
#[get("/pods")]
pub async fn read_all_pods(service: Data<PodService>) -> Result<impl Responder, PodError> {
    let data = service.list_all_pods().await.map_err(PodError::ListAll)?;

    Ok(Json(ReadAllPodsResponse { data }))
}
