use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, get, web::Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use kubeops_types::KubeOpsError;

pub mod health_check;
pub mod namespaces;
pub mod pods;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub error: String,
    pub details: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

/// Status for an error coming out of the service layer
pub(crate) fn status_for(err: &KubeOpsError) -> StatusCode {
    match err {
        KubeOpsError::NotFound { .. } => StatusCode::NOT_FOUND,
        KubeOpsError::Upstream { .. } | KubeOpsError::ConnectionInit { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Build the `{error, details}` body shared by every failing route
pub(crate) fn error_response(status: StatusCode, error: &str, source: &KubeOpsError) -> HttpResponse {
    if status.is_server_error() {
        warn!(error = %source, "request failed upstream");
    }

    json_error(status, error, source.to_string())
}

fn json_error(status: StatusCode, error: &str, details: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorMessage {
        error: error.to_string(),
        details,
    })
}

#[get("/ping")]
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong".to_string(),
    })
}

/// Fallback for paths no route matches
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    json_error(StatusCode::NOT_FOUND, "Not found", req.path().to_string())
}
