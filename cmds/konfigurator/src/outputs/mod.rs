//! Outputs store resolved variables somewhere on disk.

mod k8s_yaml;

use std::{io::Write, path::Path};

use anyhow::Result;
use konfigurator_k8s::VariableDef;

pub use self::k8s_yaml::K8sYaml;
use crate::config::Config;

/// Name of the output used when none is given on the command line.
pub const DEFAULT_OUTPUT: &str = K8S_YAML;

pub const K8S_YAML: &str = "k8s-yaml";

/// A formatter that persists variables under a destination directory.
pub trait Output {
	/// Store `variables` for the application `name` under `destination`.
	///
	/// Human readable change reports, such as diffs, go to `out`.
	fn save(
		&self,
		name: &str,
		destination: &Path,
		variables: &[VariableDef],
		out: &mut dyn Write,
	) -> Result<()>;
}

/// Build the output registered under `format`.
pub fn get(format: &str, config: &Config, colored: bool) -> Option<Box<dyn Output>> {
	match format {
		K8S_YAML => Some(Box::new(K8sYaml::new(config, colored))),
		_ => None,
	}
}

pub fn registered_names() -> Vec<&'static str> {
	vec![K8S_YAML]
}
