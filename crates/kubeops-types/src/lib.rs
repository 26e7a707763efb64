//! Shared types for kubeops
//!
//! This crate contains the transient projections of cluster state that flow
//! between the repository, service and HTTP layers, plus the health data model
//! and the error taxonomy shared by every layer.

mod error;

pub use error::{BoxError, KubeOpsError, Operation};

use serde::Serialize;
use std::collections::BTreeMap;

// ============================================================================
// Kubernetes Resource Types
// ============================================================================

/// Namespace information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceInfo {
    pub name: String,
    /// Phase reported by the cluster. Carried along but never surfaced by the services.
    pub status: String,
}

impl NamespaceInfo {
    pub fn new(name: String, status: String) -> Self {
        Self { name, status }
    }
}

/// Pod information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub phase: PodPhase,
}

impl PodInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            phase: PodPhase::Unknown,
        }
    }

    pub fn with_phase(mut self, phase: PodPhase) -> Self {
        self.phase = phase;
        self
    }
}

/// Coarse lifecycle state reported for a pod
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    #[default]
    Unknown,
}

impl PodPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<&str> for PodPhase {
    fn from(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Cross-namespace listing entry.
///
/// `status` is the normalized [`PodPhase`], not the raw string the cluster
/// reported: a missing phase or one outside the known set serializes as
/// `"Unknown"` rather than being passed through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PodSummary {
    pub namespace: String,
    pub name: String,
    #[serde(rename = "status")]
    pub phase: PodPhase,
}

impl From<PodInfo> for PodSummary {
    fn from(pod: PodInfo) -> Self {
        Self {
            namespace: pod.namespace,
            name: pod.name,
            phase: pod.phase,
        }
    }
}

/// Namespaces owned by the cluster platform itself
#[derive(Clone, Copy, Debug, Default)]
pub struct ReservedNamespaces;

impl ReservedNamespaces {
    pub const NAMES: [&'static str; 3] = ["kube-system", "kube-public", "kube-node-lease"];

    /// Exact, case-sensitive membership test
    pub fn contains(name: &str) -> bool {
        Self::NAMES.iter().any(|reserved| *reserved == name)
    }
}

// ============================================================================
// Health Types
// ============================================================================

/// Outcome of probing a single dependency
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeOutcome {
    Ok,
    Unreachable,
}

impl ProbeOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Overall status derived from every probe outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// Aggregate of every configured probe, built per request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub details: BTreeMap<String, ProbeOutcome>,
}

impl HealthReport {
    /// Healthy iff every dependency probed ok; vacuously healthy when empty.
    pub fn from_outcomes(details: BTreeMap<String, ProbeOutcome>) -> Self {
        let status = if details.values().all(ProbeOutcome::is_ok) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        Self { status, details }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
