//! Service configuration
//!
//! Values come from command-line flags, then environment variables (both
//! handled by clap), then an optional TOML file, then built-in defaults.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SERVICE_NAME: &str = "kubeops";
const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 2000;
const DEFAULT_POSTGRES_PORT: u16 = 5432;
const DEFAULT_POSTGRES_SSLMODE: &str = "disable";
const DEFAULT_REDIS_PORT: u16 = 6379;

/// Kubeops - A read-only HTTP API over a Kubernetes cluster
#[derive(Parser, Debug, Default)]
#[command(name = "kubeops")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Optional TOML configuration file
    #[arg(long, env = "KUBEOPS_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "KUBEOPS_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Deployment environment; `production` switches logs to JSON
    #[arg(long = "env", env = "ENV")]
    pub environment: Option<String>,

    /// Kubeconfig file (defaults to in-cluster credentials, then ~/.kube/config)
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Name reported by the health endpoint
    #[arg(long, env = "SERVICE_NAME")]
    pub service_name: Option<String>,

    /// Deadline shared by all health probes, in milliseconds
    #[arg(long, env = "HEALTH_TIMEOUT_MS")]
    pub health_timeout_ms: Option<u64>,

    /// PostgreSQL host; enables the postgres health probe
    #[arg(long, env = "POSTGRES_HOST")]
    pub postgres_host: Option<String>,

    #[arg(long, env = "POSTGRES_PORT")]
    pub postgres_port: Option<u16>,

    #[arg(long, env = "POSTGRES_USER")]
    pub postgres_user: Option<String>,

    #[arg(long, env = "POSTGRES_PASSWORD", hide_env_values = true)]
    pub postgres_password: Option<String>,

    #[arg(long = "postgres-db", env = "POSTGRES_DB")]
    pub postgres_database: Option<String>,

    #[arg(long, env = "POSTGRES_SSLMODE")]
    pub postgres_sslmode: Option<String>,

    /// Redis address as host:port; enables the redis health probe
    #[arg(long, env = "REDIS_ADDR")]
    pub redis_addr: Option<String>,

    #[arg(long, env = "REDIS_PASSWORD", hide_env_values = true)]
    pub redis_password: Option<String>,

    #[arg(long, env = "REDIS_DB")]
    pub redis_db: Option<i64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required parameters: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid postgres sslmode: {0}")]
    InvalidSslMode(String),

    #[error("invalid redis address: {0}")]
    InvalidRedisAddr(String),
}

/// Contents of the optional TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub environment: Option<String>,
    pub kubeconfig: Option<PathBuf>,
    pub service_name: Option<String>,
    pub health_timeout_ms: Option<u64>,
    pub postgres: FilePostgres,
    pub redis: FileRedis,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilePostgres {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub sslmode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileRedis {
    pub addr: Option<String>,
    pub password: Option<String>,
    pub db: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl From<&str> for Environment {
    fn from(s: &str) -> Self {
        match s {
            "production" => Self::Production,
            _ => Self::Development,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<SecretString>,
    pub database: String,
    pub ssl_mode: PgSslMode,
}

impl PostgresConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database)
            .ssl_mode(self.ssl_mode);

        match &self.password {
            Some(password) => options.password(password.expose_secret()),
            None => options,
        }
    }
}

#[derive(Debug)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<SecretString>,
    pub db: i64,
}

impl RedisConfig {
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: self.db,
                password: self
                    .password
                    .as_ref()
                    .map(|p| p.expose_secret().to_string()),
                ..Default::default()
            },
        }
    }
}

/// Fully resolved configuration
#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub kubeconfig: Option<PathBuf>,
    pub service_name: String,
    pub health_timeout: Duration,
    pub postgres: Option<PostgresConfig>,
    pub redis: Option<RedisConfig>,
}

impl Config {
    /// Resolve configuration from parsed arguments and the optional file they name
    pub fn load(args: Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                toml::from_str(&content)?
            }
            None => FileConfig::default(),
        };

        Self::merge(args, file)
    }

    fn merge(args: Args, file: FileConfig) -> Result<Self, ConfigError> {
        let postgres = resolve_postgres(&args, file.postgres)?;
        let redis = resolve_redis(&args, file.redis)?;

        let environment = args
            .environment
            .or(file.environment)
            .map(|e| Environment::from(e.as_str()))
            .unwrap_or_default();

        Ok(Self {
            host: args
                .host
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            environment,
            kubeconfig: args.kubeconfig.or(file.kubeconfig),
            service_name: args
                .service_name
                .or(file.service_name)
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            health_timeout: Duration::from_millis(
                args.health_timeout_ms
                    .or(file.health_timeout_ms)
                    .unwrap_or(DEFAULT_HEALTH_TIMEOUT_MS),
            ),
            postgres,
            redis,
        })
    }
}

/// Postgres is configured iff a host is given; user and database are then required.
fn resolve_postgres(args: &Args, file: FilePostgres) -> Result<Option<PostgresConfig>, ConfigError> {
    let Some(host) = args.postgres_host.clone().or(file.host) else {
        return Ok(None);
    };

    let user = args.postgres_user.clone().or(file.user);
    let database = args.postgres_database.clone().or(file.database);

    let mut missing = Vec::new();
    if user.is_none() {
        missing.push("--postgres-user/POSTGRES_USER");
    }
    if database.is_none() {
        missing.push("--postgres-db/POSTGRES_DB");
    }
    let (Some(user), Some(database)) = (user, database) else {
        return Err(ConfigError::Missing(missing));
    };

    let ssl_mode = args
        .postgres_sslmode
        .clone()
        .or(file.sslmode)
        .unwrap_or_else(|| DEFAULT_POSTGRES_SSLMODE.to_string());
    let ssl_mode =
        PgSslMode::from_str(&ssl_mode).map_err(|_| ConfigError::InvalidSslMode(ssl_mode))?;

    Ok(Some(PostgresConfig {
        host,
        port: args
            .postgres_port
            .or(file.port)
            .unwrap_or(DEFAULT_POSTGRES_PORT),
        user,
        password: args
            .postgres_password
            .clone()
            .or(file.password)
            .map(SecretString::from),
        database,
        ssl_mode,
    }))
}

fn resolve_redis(args: &Args, file: FileRedis) -> Result<Option<RedisConfig>, ConfigError> {
    let Some(addr) = args.redis_addr.clone().or(file.addr) else {
        return Ok(None);
    };

    let (host, port) = match addr.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidRedisAddr(addr.clone()))?;
            (host.to_string(), port)
        }
        None => (addr.clone(), DEFAULT_REDIS_PORT),
    };
    if host.is_empty() {
        return Err(ConfigError::InvalidRedisAddr(addr));
    }

    Ok(Some(RedisConfig {
        host,
        port,
        password: args
            .redis_password
            .clone()
            .or(file.password)
            .map(SecretString::from),
        db: args.redis_db.or(file.db).unwrap_or(0),
    }))
}
