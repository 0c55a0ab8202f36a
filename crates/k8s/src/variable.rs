//! Resolved configuration variables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a variable's value is stored and how a container reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
	/// Stored in the ConfigMap, read through a `configMapKeyRef`.
	#[serde(alias = "configMap")]
	ConfigMap,
	/// Stored in the Secret, read through a `secretKeyRef`.
	Secret,
	/// Not stored anywhere; the value is a pod field path read through a `fieldRef`.
	#[serde(alias = "fieldRef")]
	Reference,
}

impl fmt::Display for VariableKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			VariableKind::ConfigMap => write!(f, "configmap"),
			VariableKind::Secret => write!(f, "secret"),
			VariableKind::Reference => write!(f, "reference"),
		}
	}
}

/// A variable whose value has already been resolved by an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDef {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: VariableKind,
	/// The value for ConfigMap and Secret variables, the field path for references.
	pub value: String,
}

impl VariableDef {
	pub fn new(name: impl Into<String>, kind: VariableKind, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind,
			value: value.into(),
		}
	}

	/// Name of the container environment variable.
	pub fn env_name(&self) -> String {
		self.name.to_uppercase()
	}

	/// Key inside ConfigMap or Secret data.
	pub fn data_key(&self) -> String {
		self.name.to_lowercase()
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case::configmap("configmap", VariableKind::ConfigMap)]
	#[case::configmap_camel("configMap", VariableKind::ConfigMap)]
	#[case::secret("secret", VariableKind::Secret)]
	#[case::reference("reference", VariableKind::Reference)]
	#[case::field_ref("fieldRef", VariableKind::Reference)]
	fn test_kind_names(#[case] name: &str, #[case] expected: VariableKind) {
		let kind: VariableKind = serde_json::from_value(serde_json::json!(name)).unwrap();
		assert_eq!(kind, expected);
	}

	#[test]
	fn test_unknown_kind_is_rejected() {
		let result: Result<VariableKind, _> = serde_json::from_value(serde_json::json!("vault"));
		assert!(result.is_err());
	}

	#[test]
	fn test_name_casing() {
		let var = VariableDef::new("Api_Key", VariableKind::Secret, "s3cr3t");
		assert_eq!(var.env_name(), "API_KEY");
		assert_eq!(var.data_key(), "api_key");
	}
}
