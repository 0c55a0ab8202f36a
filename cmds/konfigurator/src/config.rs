//! Configuration file support for konfigurator
//!
//! A `.konfigurator.yaml` file names the application, lists the variables to
//! download and optionally points at a Deployment manifest to update. It is
//! searched for from the working directory upward to the filesystem root.

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use konfigurator_k8s::VariableKind;
use serde::Deserialize;

/// The name of the config file konfigurator looks for
pub const CONFIG_FILE_NAME: &str = ".konfigurator.yaml";

/// Input used by definitions that do not name one.
pub const DEFAULT_SOURCE: &str = "simple";

/// Root configuration structure for .konfigurator.yaml
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
	/// Logical name, used as the ConfigMap and Secret name
	pub name: String,

	/// Namespace stamped on newly created objects
	#[serde(default)]
	pub namespace: Option<String>,

	#[serde(default)]
	pub definitions: Vec<Definition>,

	/// Deployment to point at the generated objects
	#[serde(default)]
	pub deployment: Option<DeploymentTarget>,
}

/// One variable as declared in the config file, before its value is resolved.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
	pub name: String,

	#[serde(rename = "type")]
	pub kind: VariableKind,

	/// Name of the input that resolves `value`
	#[serde(default = "default_source")]
	pub source: String,

	/// Input specific payload: a literal for `simple`, a variable name for `env`
	#[serde(default)]
	pub value: serde_json::Value,
}

fn default_source() -> String {
	DEFAULT_SOURCE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTarget {
	/// Manifest path, relative paths are resolved against the destination
	pub path: PathBuf,

	/// Container whose environment is updated
	pub container: String,

	/// Drop the container's existing environment first
	#[serde(default)]
	pub overwrite: bool,
}

impl DeploymentTarget {
	pub fn resolve_path(&self, destination: &Path) -> PathBuf {
		if self.path.is_absolute() {
			self.path.clone()
		} else {
			destination.join(&self.path)
		}
	}
}

impl Config {
	/// Load config by searching from the given directory upward
	pub fn load_from_directory(start_dir: &Path) -> Result<Option<Self>> {
		if let Some(config_path) = find_config_file(start_dir) {
			let config = Self::load_from_file(&config_path)?;
			Ok(Some(config))
		} else {
			Ok(None)
		}
	}

	/// Load config from a specific file path
	pub fn load_from_file(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)
			.with_context(|| format!("failed to read config file: {}", path.display()))?;
		let config: Config = serde_yaml_with_quirks::from_str(&content)
			.with_context(|| format!("failed to parse config file: {}", path.display()))?;
		if config.name.is_empty() {
			anyhow::bail!("config file {} has an empty name", path.display());
		}
		Ok(config)
	}

	/// Load `explicit` if given, otherwise search upward from `working_dir`.
	pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<Self> {
		match explicit {
			Some(path) => Self::load_from_file(path),
			None => Self::load_from_directory(working_dir)?.with_context(|| {
				format!(
					"no {CONFIG_FILE_NAME} found in {} or any parent directory",
					working_dir.display()
				)
			}),
		}
	}
}

/// Search for a config file starting from `start_dir` and walking up to the filesystem root
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
	let mut current = start_dir.to_path_buf();

	if let Ok(canonical) = current.canonicalize() {
		current = canonical;
	}

	loop {
		let config_path = current.join(CONFIG_FILE_NAME);
		if config_path.is_file() {
			return Some(config_path);
		}

		match current.parent() {
			Some(parent) if parent != current => current = parent.to_path_buf(),
			_ => return None,
		}
	}
}
