use serde_json::Value;

use super::{value_type, Input, InputError};
use crate::config::Definition;

/// Takes the value written in the config file as is.
pub struct SimpleInput;

impl Input for SimpleInput {
	fn name(&self) -> &'static str {
		"simple"
	}

	fn resolve(&self, definition: &Definition) -> Result<String, InputError> {
		match &definition.value {
			Value::String(value) => Ok(value.clone()),
			Value::Number(value) => Ok(value.to_string()),
			Value::Bool(value) => Ok(value.to_string()),
			other => Err(InputError::UnsupportedValue {
				variable: definition.name.clone(),
				found: value_type(other),
			}),
		}
	}
}
