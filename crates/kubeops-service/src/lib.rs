//! Business rules for kubeops
//!
//! Services sit between the HTTP mapper and the repositories. They apply
//! reserved-namespace filtering and reduce resources to the response shapes
//! the API exposes. Repository errors pass through unchanged.

mod namespace;
mod pod;

pub use namespace::NamespaceService;
pub use pod::PodService;
