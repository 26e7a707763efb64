use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use kubeops_api::ApiState;
use kubeops_health::{ClusterProbe, HealthAggregator, PostgresProbe, Probe, RedisProbe};
use kubeops_k8s::{ClusterApi, ConnectOptions, KubeCluster, NamespaceRepository, PodRepository};
use kubeops_service::{NamespaceService, PodService};
use kubeops_types::{BoxError, KubeOpsError};

mod config;

use config::{Args, Config, Environment, PostgresConfig, RedisConfig};

/// Startup connectivity check deadlines
const POSTGRES_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args)?;

    init_tracing(config.environment);

    let result = run(config).await;

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }

    result
}

fn init_tracing(environment: Environment) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match environment {
        Environment::Production => builder.json().init(),
        Environment::Development => builder.init(),
    }
}

async fn run(config: Config) -> Result<()> {
    info!(
        host = config.host,
        port = config.port,
        environment = %config.environment,
        service_name = config.service_name,
        health_timeout_ms = config.health_timeout.as_millis() as u64,
        postgres = config.postgres.is_some(),
        redis = config.redis.is_some(),
        "kubeops starting"
    );

    let cluster = KubeCluster::connect(&ConnectOptions {
        kubeconfig: config.kubeconfig.clone(),
        ..Default::default()
    })
    .await?;
    info!("kubernetes client initialized");

    let cluster: Arc<dyn ClusterApi> = Arc::new(cluster);
    let mut health = HealthAggregator::new(config.health_timeout)
        .with_probe(Arc::new(ClusterProbe::new(cluster.clone())));

    let postgres_pool = match &config.postgres {
        Some(postgres) => {
            let pool = connect_postgres(postgres).await?;
            health = health.with_probe(Arc::new(PostgresProbe::new(pool.clone())));
            Some(pool)
        }
        None => None,
    };

    if let Some(redis) = &config.redis {
        let probe = connect_redis(redis).await?;
        health = health.with_probe(Arc::new(probe));
    }

    let state = ApiState {
        namespaces: NamespaceService::new(NamespaceRepository::new(cluster.clone())),
        pods: PodService::new(PodRepository::new(cluster)),
        health,
        service_name: config.service_name.clone(),
    };

    let listener = TcpListener::bind((config.host.as_str(), config.port))?;
    info!(
        address = %listener.local_addr()?,
        environment = %config.environment,
        "starting kubeops server"
    );

    let server = kubeops_api::run(listener, state)?;
    let server_handle = server.handle();
    let mut server_task = tokio::spawn(server);

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    tokio::select! {
        result = &mut server_task => {
            result??;
        }
        _ = shutdown.cancelled() => {
            info!("shutting down server...");
            server_handle.stop(true).await;
        }
    }

    if let Some(pool) = postgres_pool {
        pool.close().await;
    }

    info!("server exited");

    Ok(())
}

/// Build the pool lazily, then make sure the database answers before serving
async fn connect_postgres(config: &PostgresConfig) -> Result<PgPool, KubeOpsError> {
    info!(
        host = config.host,
        port = config.port,
        dbname = config.database,
        username = config.user,
        "pg database options",
    );

    let pool = PgPoolOptions::new()
        .acquire_timeout(POSTGRES_CONNECT_TIMEOUT)
        .connect_lazy_with(config.connect_options());

    let probe = PostgresProbe::new(pool.clone());
    tokio::time::timeout(POSTGRES_CONNECT_TIMEOUT, probe.ping())
        .await
        .map_err(|e| KubeOpsError::connection_init("postgres", e))?
        .map_err(|e| KubeOpsError::connection_init("postgres", e))?;

    info!("connected to postgres");

    Ok(pool)
}

async fn connect_redis(config: &RedisConfig) -> Result<RedisProbe, KubeOpsError> {
    info!(host = config.host, port = config.port, db = config.db, "redis options");

    let client = redis::Client::open(config.connection_info())
        .map_err(|e| KubeOpsError::connection_init("redis", e))?;

    let probe = tokio::time::timeout(REDIS_CONNECT_TIMEOUT, async {
        let probe = RedisProbe::connect(client).await?;
        probe.ping().await?;
        Ok::<_, BoxError>(probe)
    })
    .await
    .map_err(|e| KubeOpsError::connection_init("redis", e))?
    .map_err(|e| KubeOpsError::connection_init("redis", e))?;

    info!("connected to redis");

    Ok(probe)
}

/// Cancel `token` on SIGINT or SIGTERM
async fn wait_for_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    token.cancel();
}
