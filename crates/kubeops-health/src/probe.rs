use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use sqlx::PgPool;

use kubeops_k8s::ClusterApi;
use kubeops_types::BoxError;

/// A liveness check against one dependency
#[async_trait]
pub trait Probe: Send + Sync {
    /// Key under which the outcome is reported
    fn name(&self) -> &str;

    /// Reachability check. Any error marks the dependency unreachable.
    async fn ping(&self) -> Result<(), BoxError>;
}

/// Checks the cluster control plane by asking for its version
pub struct ClusterProbe {
    cluster: Arc<dyn ClusterApi>,
}

impl ClusterProbe {
    pub fn new(cluster: Arc<dyn ClusterApi>) -> Self {
        Self { cluster }
    }
}

#[async_trait]
impl Probe for ClusterProbe {
    fn name(&self) -> &str {
        "kubernetes"
    }

    async fn ping(&self) -> Result<(), BoxError> {
        self.cluster.server_version().await?;
        Ok(())
    }
}

pub struct PostgresProbe {
    pool: PgPool,
}

impl PostgresProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Probe for PostgresProbe {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), BoxError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Reconnect attempts a broken Redis connection gets before a ping fails
const REDIS_RECONNECT_RETRIES: usize = 2;

/// Pings Redis over one shared multiplexed connection.
///
/// The connection is opened once by [`RedisProbe::connect`]; clones of the
/// manager reuse it and re-establish it after a drop.
pub struct RedisProbe {
    connection: ConnectionManager,
}

impl RedisProbe {
    pub async fn connect(client: redis::Client) -> Result<Self, redis::RedisError> {
        let config =
            ConnectionManagerConfig::new().set_number_of_retries(REDIS_RECONNECT_RETRIES);
        let connection = ConnectionManager::new_with_config(client, config).await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl Probe for RedisProbe {
    fn name(&self) -> &str {
        "redis"
    }

    async fn ping(&self) -> Result<(), BoxError> {
        let mut conn = self.connection.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use kubeops_k8s::fake::FakeCluster;
    use sqlx::postgres::PgPoolOptions;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_cluster_probe_reports_reachability() {
        let ok = ClusterProbe::new(Arc::new(FakeCluster::new()));
        assert_eq!(ok.name(), "kubernetes");
        assert!(ok.ping().await.is_ok());

        let down = ClusterProbe::new(Arc::new(FakeCluster::new().failing(503, "unavailable")));
        assert!(down.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_postgres_probe_fails_on_closed_port() {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("postgres://u@127.0.0.1:1/db")
            .unwrap();
        let probe = PostgresProbe::new(pool);
        assert_eq!(probe.name(), "postgres");
        assert!(probe.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_redis_connect_fails_on_closed_port() {
        // Port 1 is reserved and never listening in test environments.
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        assert!(RedisProbe::connect(client).await.is_err());
    }

    /// Reads one `*N` array of bulk strings from the front of `buf`,
    /// returning its length in bytes once it is complete.
    fn command_len(buf: &[u8]) -> Option<usize> {
        fn line(buf: &[u8], prefix: u8) -> Option<(usize, usize)> {
            let end = buf.windows(2).position(|w| w == b"\r\n")?;
            let (first, digits) = buf[..end].split_first()?;
            if *first != prefix {
                return None;
            }
            let value = std::str::from_utf8(digits).ok()?.parse().ok()?;
            Some((value, end + 2))
        }

        let (args, mut pos) = line(buf, b'*')?;
        for _ in 0..args {
            let (len, used) = line(&buf[pos..], b'$')?;
            pos += used + len + 2;
            if buf.len() < pos {
                return None;
            }
        }
        Some(pos)
    }

    /// Minimal RESP server answering `+PONG` to every command and counting
    /// accepted sockets.
    async fn spawn_counting_redis() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    loop {
                        let n = match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => n,
                        };
                        buf.extend_from_slice(&chunk[..n]);
                        while let Some(len) = command_len(&buf) {
                            buf.drain(..len);
                            if socket.write_all(b"+PONG\r\n").await.is_err() {
                                return;
                            }
                        }
                    }
                });
            }
        });

        (format!("redis://{addr}/"), accepted)
    }

    #[tokio::test]
    async fn test_redis_probe_reuses_one_connection() {
        let (url, accepted) = spawn_counting_redis().await;
        let client = redis::Client::open(url.as_str()).unwrap();
        let probe = RedisProbe::connect(client).await.unwrap();

        for _ in 0..3 {
            probe.ping().await.unwrap();
        }

        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }
}
