use std::env;

use serde_json::Value;

use super::{value_type, Input, InputError};
use crate::config::Definition;

/// Reads the value from the process environment; the payload names the variable.
pub struct EnvInput;

impl Input for EnvInput {
	fn name(&self) -> &'static str {
		"env"
	}

	fn resolve(&self, definition: &Definition) -> Result<String, InputError> {
		let Value::String(name) = &definition.value else {
			return Err(InputError::UnsupportedValue {
				variable: definition.name.clone(),
				found: value_type(&definition.value),
			});
		};

		env::var(name).map_err(|_| InputError::MissingEnv {
			variable: definition.name.clone(),
			name: name.clone(),
		})
	}
}
