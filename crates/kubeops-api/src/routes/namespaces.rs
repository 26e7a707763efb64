use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::StatusCode,
    web::{Data, Json, Path},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kubeops_service::NamespaceService;
use kubeops_types::KubeOpsError;

use crate::routes::{error_response, status_for};

#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("Failed to list namespaces")]
    List(#[source] KubeOpsError),

    #[error("Failed to get namespace")]
    Get(#[source] KubeOpsError),
}

impl NamespaceError {
    fn source_error(&self) -> &KubeOpsError {
        match self {
            NamespaceError::List(e) | NamespaceError::Get(e) => e,
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            NamespaceError::Get(e) if e.is_not_found() => "Namespace not found".to_string(),
            e => e.to_string(),
        }
    }
}

impl ResponseError for NamespaceError {
    fn status_code(&self) -> StatusCode {
        status_for(self.source_error())
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self.status_code(), &self.to_message(), self.source_error())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadNamespacesResponse {
    pub data: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadNamespaceResponse {
    pub data: String,
}

/// Namespaces visible to operators; reserved ones are excluded
#[get("/namespaces")]
pub async fn read_all_namespaces(
    service: Data<NamespaceService>,
) -> Result<impl Responder, NamespaceError> {
    let data = service
        .list_namespaces()
        .await
        .map_err(NamespaceError::List)?;

    Ok(Json(ReadNamespacesResponse { data }))
}

#[get("/namespaces/{name}")]
pub async fn read_namespace(
    service: Data<NamespaceService>,
    name: Path<String>,
) -> Result<impl Responder, NamespaceError> {
    let name = name.into_inner();
    let data = service
        .get_namespace(&name)
        .await
        .map_err(NamespaceError::Get)?;

    Ok(Json(ReadNamespaceResponse { data }))
}
