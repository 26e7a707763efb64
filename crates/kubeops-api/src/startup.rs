use std::net::TcpListener;
use std::time::Duration;

use actix_web::{App, HttpServer, dev::Server, web};
use tracing::info;
use tracing_actix_web::TracingLogger;

use kubeops_health::HealthAggregator;
use kubeops_service::{NamespaceService, PodService};

use crate::routes::{
    health_check::{ServiceName, health_check},
    namespaces::{read_all_namespaces, read_namespace},
    not_found, ping,
    pods::{read_all_pods, read_pod, read_pods},
};

/// How long in-flight requests get to finish once shutdown starts
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handles shared by every request, built once at startup
pub struct ApiState {
    pub namespaces: NamespaceService,
    pub pods: PodService,
    pub health: HealthAggregator,
    pub service_name: String,
}

/// Build the HTTP server on an already bound listener.
///
/// Signal handling is left to the caller, which stops the server through
/// [`Server::handle`].
pub fn run(listener: TcpListener, state: ApiState) -> Result<Server, std::io::Error> {
    let namespaces = web::Data::new(state.namespaces);
    let pods = web::Data::new(state.pods);
    let health = web::Data::new(state.health);
    let service_name = web::Data::new(ServiceName(state.service_name));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .service(health_check)
            .service(
                web::scope("/api/v1")
                    .service(ping)
                    .service(read_all_namespaces)
                    .service(read_namespace)
                    .service(read_pods)
                    .service(read_pod)
                    .service(read_all_pods),
            )
            .default_service(web::route().to(not_found))
            .app_data(namespaces.clone())
            .app_data(pods.clone())
            .app_data(health.clone())
            .app_data(service_name.clone())
    })
    .listen(listener)?
    .disable_signals()
    .shutdown_timeout(SHUTDOWN_TIMEOUT.as_secs())
    .run();

    info!("routes registered successfully");

    Ok(server)
}
