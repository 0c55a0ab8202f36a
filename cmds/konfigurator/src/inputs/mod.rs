//! Inputs resolve the value of each configured definition.
//!
//! Every definition names an input through its `source` field. The input
//! turns the definition's payload into the string stored in the ConfigMap
//! or Secret (or the field path of a reference).

mod env;
mod simple;

use konfigurator_k8s::{VariableDef, VariableKind};
use thiserror::Error;
use tracing::{debug, instrument};

pub use self::{env::EnvInput, simple::SimpleInput};
use crate::config::Definition;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
	#[error("variable '{variable}' uses unknown input '{input}', available: {}", registered_names().join(", "))]
	UnknownInput { variable: String, input: String },

	#[error("variable '{variable}' has a value of type {found} that cannot be stored as a string")]
	UnsupportedValue {
		variable: String,
		found: &'static str,
	},

	#[error("environment variable '{name}' for variable '{variable}' is not set")]
	MissingEnv { variable: String, name: String },

	#[error("variable with an empty name")]
	EmptyName,

	#[error("reference variable '{0}' has an empty field path")]
	EmptyFieldPath(String),
}

/// A provider of variable values.
pub trait Input {
	/// Name used in the `source` field of a definition.
	fn name(&self) -> &'static str;

	fn resolve(&self, definition: &Definition) -> Result<String, InputError>;
}

static INPUTS: &[&(dyn Input + Sync)] = &[&SimpleInput, &EnvInput];

/// Look up an input by name.
pub fn get(name: &str) -> Option<&'static dyn Input> {
	INPUTS
		.iter()
		.find(|input| input.name() == name)
		.map(|input| *input as &dyn Input)
}

pub fn registered_names() -> Vec<&'static str> {
	INPUTS.iter().map(|input| input.name()).collect()
}

/// Resolve every definition, in order, through the input it names.
#[instrument(skip_all, fields(definitions = definitions.len()))]
pub fn process(definitions: &[Definition]) -> Result<Vec<VariableDef>, InputError> {
	definitions
		.iter()
		.map(|definition| {
			if definition.name.is_empty() {
				return Err(InputError::EmptyName);
			}
			let input = get(&definition.source).ok_or_else(|| InputError::UnknownInput {
				variable: definition.name.clone(),
				input: definition.source.clone(),
			})?;
			let value = input.resolve(definition)?;
			if definition.kind == VariableKind::Reference && value.is_empty() {
				return Err(InputError::EmptyFieldPath(definition.name.clone()));
			}
			debug!(name = %definition.name, kind = %definition.kind, input = input.name(), "resolved variable");
			Ok(VariableDef::new(definition.name.clone(), definition.kind, value))
		})
		.collect()
}

pub(crate) fn value_type(value: &serde_json::Value) -> &'static str {
	match value {
		serde_json::Value::Null => "null",
		serde_json::Value::Bool(_) => "boolean",
		serde_json::Value::Number(_) => "number",
		serde_json::Value::String(_) => "string",
		serde_json::Value::Array(_) => "array",
		serde_json::Value::Object(_) => "object",
	}
}

#[cfg(test)]
pub(crate) fn definition(
	name: &str,
	kind: VariableKind,
	source: &str,
	value: serde_json::Value,
) -> Definition {
	Definition {
		name: name.to_string(),
		kind,
		source: source.to_string(),
		value,
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use serde_json::json;

	use super::*;

	#[test]
	fn test_registry() {
		assert_eq!(registered_names(), ["simple", "env"]);
		assert_eq!(get("env").map(|input| input.name()), Some("env"));
		assert!(get("vault").is_none());
	}

	#[test]
	fn test_process_keeps_order() {
		let variables = process(&[
			definition("db_host", VariableKind::ConfigMap, "simple", json!("db.local")),
			definition("replicas", VariableKind::ConfigMap, "simple", json!(3)),
			definition("pod_ip", VariableKind::Reference, "simple", json!("status.podIP")),
		])
		.unwrap();

		assert_eq!(
			variables,
			vec![
				VariableDef::new("db_host", VariableKind::ConfigMap, "db.local"),
				VariableDef::new("replicas", VariableKind::ConfigMap, "3"),
				VariableDef::new("pod_ip", VariableKind::Reference, "status.podIP"),
			]
		);
	}

	#[test]
	fn test_unknown_input() {
		let err = process(&[definition("token", VariableKind::Secret, "vault", json!("x"))])
			.unwrap_err();

		assert_eq!(
			err,
			InputError::UnknownInput {
				variable: "token".to_string(),
				input: "vault".to_string(),
			}
		);
		assert!(err.to_string().ends_with("available: simple, env"));
	}

	#[test]
	fn test_reference_needs_field_path() {
		let result = process(&[definition("pod_ip", VariableKind::Reference, "simple", json!(""))]);
		assert_matches!(result, Err(InputError::EmptyFieldPath(name)) if name == "pod_ip");
	}

	#[test]
	fn test_empty_name() {
		let result = process(&[definition("", VariableKind::Secret, "simple", json!("x"))]);
		assert_eq!(result, Err(InputError::EmptyName));
	}
}
