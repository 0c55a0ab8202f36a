//! Download configuration values and store them as Kubernetes manifests.
//!
//! Values are declared in a `.konfigurator.yaml` file, resolved through
//! [`inputs`] and written by one of the [`outputs`].

pub mod commands;
pub mod config;
pub mod inputs;
pub mod outputs;
pub mod telemetry;
