use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use kubeops_types::{HealthReport, ProbeOutcome};

use crate::probe::Probe;

/// Deadline shared by every probe of a single health check
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs every configured probe and reduces the outcomes to one report
#[derive(Clone)]
pub struct HealthAggregator {
    probes: Vec<Arc<dyn Probe>>,
    timeout: Duration,
}

impl Default for HealthAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl HealthAggregator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            probes: Vec::new(),
            timeout,
        }
    }

    /// Register a probe. A probe with the same name replaces the earlier one,
    /// so each dependency contributes at most one outcome.
    pub fn with_probe(mut self, probe: Arc<dyn Probe>) -> Self {
        self.probes.retain(|p| p.name() != probe.name());
        self.probes.push(probe);
        self
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.probes.iter().map(|p| p.name())
    }

    /// Probe every dependency concurrently under one deadline
    pub async fn check(&self) -> HealthReport {
        let deadline = Instant::now() + self.timeout;

        let outcomes = join_all(self.probes.iter().map(|probe| async move {
            let outcome = match timeout_at(deadline, probe.ping()).await {
                Ok(Ok(())) => ProbeOutcome::Ok,
                Ok(Err(e)) => {
                    warn!(dependency = probe.name(), error = %e, "health probe failed");
                    ProbeOutcome::Unreachable
                }
                Err(_) => {
                    warn!(
                        dependency = probe.name(),
                        timeout_ms = self.timeout.as_millis() as u64,
                        "health probe timed out"
                    );
                    ProbeOutcome::Unreachable
                }
            };
            (probe.name().to_string(), outcome)
        }))
        .await;

        let report = HealthReport::from_outcomes(outcomes.into_iter().collect::<BTreeMap<_, _>>());
        debug!(status = report.status.as_str(), "health check finished");

        report
    }
}
