//! Reading, updating and writing Kubernetes manifests.
//!
//! A manifest file is a stream of YAML documents. One typed object (a
//! Secret, ConfigMap or Deployment) is located in it, modified in memory,
//! serialized into a canonical form and written back in place of the
//! original document; every other document is written back byte for byte.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use konfigurator_k8s::{read_deployment, update_deployment, write_deployment};
//! # fn run(
//! # 	config_map: &k8s_openapi::api::core::v1::ConfigMap,
//! # 	secret: &k8s_openapi::api::core::v1::Secret,
//! # 	variables: &[konfigurator_k8s::VariableDef],
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let path = Path::new("deployment.yaml");
//! let (mut deployment, leftovers) = read_deployment(path)?;
//! update_deployment(&mut deployment, config_map, secret, "app", variables, false)?;
//! write_deployment(path, &deployment, &leftovers)?;
//! # Ok(())
//! # }
//! ```

pub mod diff;
pub mod document;
pub mod inject;
pub mod locate;
pub mod serialize;
pub mod variable;
pub mod write;

pub use diff::{diff_deployments, diff_manifests, DiffError};
pub use document::{split, Leftovers, SEPARATOR};
pub use inject::{update_deployment, InjectError};
pub use locate::{
	locate, read_config_map, read_deployment, read_manifest, read_secret, LocateError,
};
pub use serialize::{to_manifest_yaml, SerializeError};
pub use variable::{VariableDef, VariableKind};
pub use write::{write_config_map, write_deployment, write_manifest, write_secret, WriteError};
