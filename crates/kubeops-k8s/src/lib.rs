//! Kubernetes data access for kubeops
//!
//! This crate provides the cluster capability the rest of the service is
//! written against, its kube-rs implementation, and the namespace and pod
//! repositories that translate reads into cluster API calls.

mod client;
mod repository;

#[cfg(any(test, feature = "test-utils"))]
pub mod fake;

pub use client::{ClusterApi, ConnectOptions, KubeCluster};
pub use repository::{NamespaceRepository, PodRepository};

// Re-export types that are used in our public API
pub use kubeops_types::{KubeOpsError, NamespaceInfo, Operation, PodInfo, PodPhase};
