use std::collections::BTreeMap;

use actix_web::{HttpResponse, Responder, get, http::StatusCode, web::Data};
use serde::Serialize;

use kubeops_health::{HealthAggregator, HealthStatus, ProbeOutcome};

/// Name reported in the `service` field of health responses
#[derive(Clone, Debug)]
pub struct ServiceName(pub String);

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub details: BTreeMap<String, ProbeOutcome>,
}

/// Probes every configured dependency; 503 when any is unreachable
#[get("/health")]
pub async fn health_check(
    aggregator: Data<HealthAggregator>,
    service_name: Data<ServiceName>,
) -> impl Responder {
    let report = aggregator.check().await;

    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    HttpResponse::build(status).json(HealthResponse {
        status: report.status,
        service: service_name.0.clone(),
        details: report.details,
    })
}
