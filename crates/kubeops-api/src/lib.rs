//! HTTP API for kubeops
//!
//! Maps inbound requests onto the namespace, pod and health services and
//! translates their results and errors into the JSON contract.

pub mod routes;
pub mod startup;

pub use startup::{ApiState, run};
