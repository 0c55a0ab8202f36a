//! Stores variables as ConfigMap and Secret manifests and points a
//! Deployment at them.

use std::{
	collections::BTreeMap,
	fs,
	io::Write,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use k8s_openapi::{
	api::core::v1::{ConfigMap, Secret},
	apimachinery::pkg::apis::meta::v1::ObjectMeta,
	ByteString, Metadata, Resource,
};
use konfigurator_k8s::{
	diff_deployments, locate, read_deployment, split, update_deployment, write_config_map,
	write_deployment, write_secret, Leftovers, LocateError, VariableDef, VariableKind,
};
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

use super::Output;
use crate::config::{Config, DeploymentTarget};

pub struct K8sYaml {
	namespace: Option<String>,
	deployment: Option<DeploymentTarget>,
	colored: bool,
}

impl K8sYaml {
	pub fn new(config: &Config, colored: bool) -> Self {
		Self {
			namespace: config.namespace.clone(),
			deployment: config.deployment.clone(),
			colored,
		}
	}

	/// Read the `K` object stored at `path`, or start a new one named `name`.
	fn load_or_create<K>(&self, path: &Path, name: &str) -> Result<(K, Leftovers)>
	where
		K: Resource + Metadata<Ty = ObjectMeta> + DeserializeOwned + Default,
	{
		let contents = match fs::read(path) {
			Ok(contents) => contents,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				info!(path = %path.display(), kind = K::KIND, "creating new manifest");
				return Ok((self.create(name), Leftovers::default()));
			}
			Err(err) => {
				return Err(err).with_context(|| format!("failed to read {}", path.display()))
			}
		};

		let documents = split(&contents);
		match locate::<K>(&documents) {
			Ok(found) => Ok(found),
			Err(LocateError::NotFound { .. }) => {
				info!(path = %path.display(), kind = K::KIND, "no existing object, appending a new one");
				Ok((self.create(name), Leftovers::appending(&documents)))
			}
			Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
		}
	}

	fn create<K>(&self, name: &str) -> K
	where
		K: Metadata<Ty = ObjectMeta> + Default,
	{
		let mut object = K::default();
		let metadata = object.metadata_mut();
		metadata.name = Some(name.to_string());
		metadata.namespace.clone_from(&self.namespace);
		object
	}

	fn save_config_map(&self, path: &Path, name: &str, variables: &[VariableDef]) -> Result<ConfigMap> {
		let (mut config_map, leftovers) = self.load_or_create::<ConfigMap>(path, name)?;
		let data: BTreeMap<String, String> = variables_of(variables, VariableKind::ConfigMap)
			.map(|variable| (variable.data_key(), variable.value.clone()))
			.collect();
		config_map.data = (!data.is_empty()).then_some(data);

		write_config_map(path, &config_map, &leftovers)?;
		Ok(config_map)
	}

	fn save_secret(&self, path: &Path, name: &str, variables: &[VariableDef]) -> Result<Secret> {
		let (mut secret, leftovers) = self.load_or_create::<Secret>(path, name)?;
		let data: BTreeMap<String, ByteString> = variables_of(variables, VariableKind::Secret)
			.map(|variable| {
				(
					variable.data_key(),
					ByteString(variable.value.as_bytes().to_vec()),
				)
			})
			.collect();
		secret.data = (!data.is_empty()).then_some(data);
		if secret.type_.is_none() {
			secret.type_ = Some("Opaque".to_string());
		}

		write_secret(path, &secret, &leftovers)?;
		Ok(secret)
	}

	#[instrument(skip_all, fields(path = %path.display(), container = %target.container))]
	fn save_deployment(
		&self,
		path: &Path,
		target: &DeploymentTarget,
		config_map: &ConfigMap,
		secret: &Secret,
		variables: &[VariableDef],
		out: &mut dyn Write,
	) -> Result<()> {
		let (original, leftovers) = read_deployment(path)?;

		let mut updated = original.clone();
		update_deployment(
			&mut updated,
			config_map,
			secret,
			&target.container,
			variables,
			target.overwrite,
		)?;

		let changed = diff_deployments(out, &original, &updated, self.colored)?;
		info!(changed, "updating deployment");
		write_deployment(path, &updated, &leftovers)?;
		Ok(())
	}
}

fn variables_of(variables: &[VariableDef], kind: VariableKind) -> impl Iterator<Item = &VariableDef> {
	variables.iter().filter(move |variable| variable.kind == kind)
}

fn manifest_path(destination: &Path, name: &str, suffix: &str) -> PathBuf {
	destination.join(format!("{name}-{suffix}.yaml"))
}

impl Output for K8sYaml {
	#[instrument(skip(self, variables, out), fields(destination = %destination.display(), variables = variables.len()))]
	fn save(
		&self,
		name: &str,
		destination: &Path,
		variables: &[VariableDef],
		out: &mut dyn Write,
	) -> Result<()> {
		fs::create_dir_all(destination)
			.with_context(|| format!("failed to create {}", destination.display()))?;

		let config_map = self.save_config_map(
			&manifest_path(destination, name, "configmap"),
			name,
			variables,
		)?;
		let secret = self.save_secret(&manifest_path(destination, name, "secret"), name, variables)?;

		if let Some(target) = &self.deployment {
			let path = target.resolve_path(destination);
			self.save_deployment(&path, target, &config_map, &secret, variables, out)?;
		}

		Ok(())
	}
}
