//! Injecting variables into a Deployment container's environment.

use k8s_openapi::api::{
	apps::v1::Deployment,
	core::v1::{
		ConfigMap, ConfigMapKeySelector, Container, EnvVar, EnvVarSource, ObjectFieldSelector,
		Secret, SecretKeySelector,
	},
};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::variable::{VariableDef, VariableKind};

/// Errors that can occur while updating a Deployment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InjectError {
	#[error("could not find container '{0}' in deployment")]
	ContainerNotFound(String),

	#[error("variable with an empty name")]
	EmptyName,

	#[error("reference variable '{0}' has an empty field path")]
	EmptyFieldPath(String),
}

fn find_container<'a>(deployment: &'a mut Deployment, name: &str) -> Option<&'a mut Container> {
	deployment
		.spec
		.as_mut()?
		.template
		.spec
		.as_mut()?
		.containers
		.iter_mut()
		.find(|container| container.name == name)
}

fn validate(variables: &[VariableDef]) -> Result<(), InjectError> {
	for variable in variables {
		if variable.name.is_empty() {
			return Err(InjectError::EmptyName);
		}
		if variable.kind == VariableKind::Reference && variable.value.is_empty() {
			return Err(InjectError::EmptyFieldPath(variable.name.clone()));
		}
	}
	Ok(())
}

/// Build the source a container reads `variable` from.
pub fn env_source(variable: &VariableDef, config_map: &ConfigMap, secret: &Secret) -> EnvVarSource {
	match variable.kind {
		VariableKind::ConfigMap => EnvVarSource {
			config_map_key_ref: Some(ConfigMapKeySelector {
				key: variable.data_key(),
				name: config_map.metadata.name.clone().unwrap_or_default(),
				..Default::default()
			}),
			..Default::default()
		},
		VariableKind::Secret => EnvVarSource {
			secret_key_ref: Some(SecretKeySelector {
				key: variable.data_key(),
				name: secret.metadata.name.clone().unwrap_or_default(),
				..Default::default()
			}),
			..Default::default()
		},
		VariableKind::Reference => EnvVarSource {
			field_ref: Some(ObjectFieldSelector {
				field_path: variable.value.clone(),
				..Default::default()
			}),
			..Default::default()
		},
	}
}

/// Point the environment of `container` at `config_map`, `secret` and pod fields.
///
/// Every variable becomes an upper-cased env entry. An existing entry with the
/// same name is rewritten in place, otherwise a new entry is appended. With
/// `overwrite` the existing environment is dropped first. Nothing is modified
/// when an error is returned.
#[instrument(skip(deployment, config_map, secret, variables), fields(variables = variables.len()))]
pub fn update_deployment(
	deployment: &mut Deployment,
	config_map: &ConfigMap,
	secret: &Secret,
	container: &str,
	variables: &[VariableDef],
	overwrite: bool,
) -> Result<(), InjectError> {
	validate(variables)?;

	let target = find_container(deployment, container)
		.ok_or_else(|| InjectError::ContainerNotFound(container.to_string()))?;

	let mut env = if overwrite {
		Vec::new()
	} else {
		target.env.take().unwrap_or_default()
	};

	for variable in variables {
		let name = variable.env_name();
		let source = env_source(variable, config_map, secret);

		match env.iter_mut().find(|entry| entry.name == name) {
			Some(entry) => {
				debug!(name = %name, "replacing env entry");
				entry.value = None;
				entry.value_from = Some(source);
			}
			None => {
				debug!(name = %name, "adding env entry");
				env.push(EnvVar {
					name,
					value: None,
					value_from: Some(source),
				});
			}
		}
	}

	target.env = if env.is_empty() { None } else { Some(env) };
	Ok(())
}

#[cfg(test)]
mod tests {
	use k8s_openapi::{
		api::{
			apps::v1::DeploymentSpec,
			core::v1::{PodSpec, PodTemplateSpec},
		},
		apimachinery::pkg::apis::meta::v1::ObjectMeta,
	};

	use super::*;

	fn meta(name: &str) -> ObjectMeta {
		ObjectMeta {
			name: Some(name.to_string()),
			..Default::default()
		}
	}

	fn config_map() -> ConfigMap {
		ConfigMap {
			metadata: meta("svc-config"),
			..Default::default()
		}
	}

	fn secret() -> Secret {
		Secret {
			metadata: meta("svc-secret"),
			..Default::default()
		}
	}

	fn literal(name: &str, value: &str) -> EnvVar {
		EnvVar {
			name: name.to_string(),
			value: Some(value.to_string()),
			value_from: None,
		}
	}

	fn deployment(env: Option<Vec<EnvVar>>) -> Deployment {
		Deployment {
			metadata: meta("app"),
			spec: Some(DeploymentSpec {
				template: PodTemplateSpec {
					metadata: None,
					spec: Some(PodSpec {
						containers: vec![
							Container {
								name: "sidecar".to_string(),
								..Default::default()
							},
							Container {
								name: "app".to_string(),
								env,
								..Default::default()
							},
						],
						..Default::default()
					}),
				},
				..Default::default()
			}),
			status: None,
		}
	}

	fn app_env(deployment: &Deployment) -> Vec<EnvVar> {
		let spec = deployment.spec.as_ref().unwrap().template.spec.as_ref().unwrap();
		spec.containers[1].env.clone().unwrap_or_default()
	}

	fn secret_ref(name: &str, key: &str) -> Option<EnvVarSource> {
		Some(EnvVarSource {
			secret_key_ref: Some(SecretKeySelector {
				name: name.to_string(),
				key: key.to_string(),
				..Default::default()
			}),
			..Default::default()
		})
	}

	#[test]
	fn test_append_secret_variable() {
		let mut deployment = deployment(None);
		let variables = [VariableDef::new("api_key", VariableKind::Secret, "s3cr3t")];

		update_deployment(
			&mut deployment,
			&config_map(),
			&secret(),
			"app",
			&variables,
			false,
		)
		.unwrap();

		assert_eq!(
			app_env(&deployment),
			vec![EnvVar {
				name: "API_KEY".to_string(),
				value: None,
				value_from: secret_ref("svc-secret", "api_key"),
			}]
		);
	}

	#[test]
	fn test_existing_entry_is_rewritten_in_place() {
		let mut deployment = deployment(Some(vec![
			literal("LOG_LEVEL", "debug"),
			literal("API_KEY", "plaintext"),
		]));
		let variables = [VariableDef::new("api_key", VariableKind::Secret, "s3cr3t")];

		update_deployment(
			&mut deployment,
			&config_map(),
			&secret(),
			"app",
			&variables,
			false,
		)
		.unwrap();

		let env = app_env(&deployment);
		assert_eq!(env.len(), 2);
		assert_eq!(env[0], literal("LOG_LEVEL", "debug"));
		assert_eq!(env[1].name, "API_KEY");
		assert_eq!(env[1].value, None);
		assert_eq!(env[1].value_from, secret_ref("svc-secret", "api_key"));
	}

	#[test]
	fn test_overwrite_clears_existing_environment() {
		let mut deployment = deployment(Some(vec![
			literal("A", "1"),
			literal("B", "2"),
			literal("C", "3"),
		]));
		let variables = [VariableDef::new("db_host", VariableKind::ConfigMap, "db.local")];

		update_deployment(
			&mut deployment,
			&config_map(),
			&secret(),
			"app",
			&variables,
			true,
		)
		.unwrap();

		let env = app_env(&deployment);
		assert_eq!(env.len(), 1);
		assert_eq!(env[0].name, "DB_HOST");
		assert_eq!(
			env[0].value_from,
			Some(EnvVarSource {
				config_map_key_ref: Some(ConfigMapKeySelector {
					name: "svc-config".to_string(),
					key: "db_host".to_string(),
					..Default::default()
				}),
				..Default::default()
			})
		);
	}

	#[test]
	fn test_field_reference() {
		let mut deployment = deployment(None);
		let variables = [VariableDef::new(
			"pod_ip",
			VariableKind::Reference,
			"status.podIP",
		)];

		update_deployment(
			&mut deployment,
			&config_map(),
			&secret(),
			"app",
			&variables,
			false,
		)
		.unwrap();

		let env = app_env(&deployment);
		assert_eq!(env[0].name, "POD_IP");
		let field_ref = env[0]
			.value_from
			.as_ref()
			.and_then(|source| source.field_ref.as_ref())
			.unwrap();
		assert_eq!(field_ref.field_path, "status.podIP");
	}

	#[test]
	fn test_duplicate_variables_last_write_wins() {
		let mut deployment = deployment(None);
		let variables = [
			VariableDef::new("token", VariableKind::ConfigMap, "a"),
			VariableDef::new("TOKEN", VariableKind::Secret, "b"),
		];

		update_deployment(
			&mut deployment,
			&config_map(),
			&secret(),
			"app",
			&variables,
			false,
		)
		.unwrap();

		let env = app_env(&deployment);
		assert_eq!(env.len(), 1);
		assert_eq!(env[0].value_from, secret_ref("svc-secret", "token"));
	}

	#[test]
	fn test_missing_container_leaves_deployment_untouched() {
		let mut deployment = deployment(Some(vec![literal("A", "1")]));
		let original = deployment.clone();
		let variables = [VariableDef::new("api_key", VariableKind::Secret, "s3cr3t")];

		let result = update_deployment(
			&mut deployment,
			&config_map(),
			&secret(),
			"worker",
			&variables,
			true,
		);

		assert_eq!(result, Err(InjectError::ContainerNotFound("worker".to_string())));
		assert!(result.unwrap_err().to_string().contains("'worker'"));
		assert_eq!(deployment, original);
	}

	#[test]
	fn test_invalid_variables_are_rejected_before_mutation() {
		let mut deployment = deployment(Some(vec![literal("A", "1")]));
		let original = deployment.clone();

		let result = update_deployment(
			&mut deployment,
			&config_map(),
			&secret(),
			"app",
			&[
				VariableDef::new("ok", VariableKind::Secret, "x"),
				VariableDef::new("pod_ip", VariableKind::Reference, ""),
			],
			true,
		);

		assert_eq!(result, Err(InjectError::EmptyFieldPath("pod_ip".to_string())));
		assert_eq!(deployment, original);

		let result = update_deployment(
			&mut deployment,
			&config_map(),
			&secret(),
			"app",
			&[VariableDef::new("", VariableKind::Secret, "x")],
			false,
		);
		assert_eq!(result, Err(InjectError::EmptyName));
	}

	#[test]
	fn test_overwrite_without_variables_drops_env() {
		let mut deployment = deployment(Some(vec![literal("A", "1")]));

		update_deployment(&mut deployment, &config_map(), &secret(), "app", &[], true).unwrap();

		let spec = deployment.spec.unwrap().template.spec.unwrap();
		assert_eq!(spec.containers[1].env, None);
	}
}
