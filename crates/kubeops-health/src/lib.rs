//! Dependency health aggregation for kubeops
//!
//! Each dependency is checked by a [`Probe`]. The [`HealthAggregator`] runs
//! every probe concurrently under one shared deadline and folds the outcomes
//! into a [`HealthReport`]. Probe failures never escape the aggregator; they
//! are recorded as `unreachable`.

mod aggregator;
mod probe;

pub use aggregator::{DEFAULT_PROBE_TIMEOUT, HealthAggregator};
pub use probe::{ClusterProbe, PostgresProbe, Probe, RedisProbe};

// Re-export types used in our public API
pub use kubeops_types::{HealthReport, HealthStatus, ProbeOutcome};
