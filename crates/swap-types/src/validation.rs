//! Configuration validation utilities for the swap pipeline.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// Error that occurs when a required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// Error that occurs when a field has an invalid value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// Error that occurs when field type is incorrect.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	Integer { min: Option<i64>, max: Option<i64> },
	Boolean,
}

/// Type alias for field validator functions.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A field definition with name and type.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	/// Creates a new field with the given name and type.
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Adds a custom validator to this field.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}
}

/// Schema definition with required and optional fields.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	/// Creates a new schema with required and optional fields.
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			validate_field(field, value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				validate_field(field, value)?;
			}
		}

		Ok(())
	}
}

fn validate_field(field: &Field, value: &toml::Value) -> Result<(), ValidationError> {
	validate_field_type(&field.name, value, &field.field_type)?;

	if let Some(validator) = &field.validator {
		validator(value).map_err(|msg| ValidationError::InvalidValue {
			field: field.name.clone(),
			message: msg,
		})?;
	}

	Ok(())
}

/// Validates that a value matches the expected field type.
fn validate_field_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::String => {
			if !value.is_str() {
				return Err(ValidationError::TypeMismatch {
					field: field_name.to_string(),
					expected: "string".to_string(),
					actual: value.type_str().to_string(),
				});
			}
		}
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| ValidationError::TypeMismatch {
					field: field_name.to_string(),
					expected: "integer".to_string(),
					actual: value.type_str().to_string(),
				})?;

			if let Some(min_val) = min {
				if int_val < *min_val {
					return Err(ValidationError::InvalidValue {
						field: field_name.to_string(),
						message: format!("Value {} is less than minimum {}", int_val, min_val),
					});
				}
			}

			if let Some(max_val) = max {
				if int_val > *max_val {
					return Err(ValidationError::InvalidValue {
						field: field_name.to_string(),
						message: format!("Value {} is greater than maximum {}", int_val, max_val),
					});
				}
			}
		}
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(ValidationError::TypeMismatch {
					field: field_name.to_string(),
					expected: "boolean".to_string(),
					actual: value.type_str().to_string(),
				});
			}
		}
	}

	Ok(())
}

/// Trait defining a configuration schema that can validate TOML values.
pub trait ConfigSchema: Send + Sync {
	/// Validates a TOML configuration value against this schema.
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn schema() -> Schema {
		Schema::new(
			vec![
				Field::new("rpc_url", FieldType::String).with_validator(|value| {
					let url = value.as_str().unwrap();
					if url.starts_with("http://") || url.starts_with("https://") {
						Ok(())
					} else {
						Err("URL must start with http:// or https://".to_string())
					}
				}),
				Field::new(
					"max_attempts",
					FieldType::Integer {
						min: Some(1),
						max: None,
					},
				),
			],
			vec![Field::new("skip_preflight", FieldType::Boolean)],
		)
	}

	#[test]
	fn accepts_valid_config() {
		let config: toml::Value = toml::from_str(
			r#"
			rpc_url = "https://api.mainnet-beta.solana.com"
			max_attempts = 20
			skip_preflight = false
			"#,
		)
		.unwrap();
		assert!(schema().validate(&config).is_ok());
	}

	#[test]
	fn reports_missing_required_field() {
		let config: toml::Value = toml::from_str(r#"max_attempts = 20"#).unwrap();
		assert!(matches!(
			schema().validate(&config),
			Err(ValidationError::MissingField(f)) if f == "rpc_url"
		));
	}

	#[test]
	fn enforces_integer_minimum() {
		let config: toml::Value = toml::from_str(
			r#"
			rpc_url = "https://api.mainnet-beta.solana.com"
			max_attempts = 0
			"#,
		)
		.unwrap();
		assert!(matches!(
			schema().validate(&config),
			Err(ValidationError::InvalidValue { field, .. }) if field == "max_attempts"
		));
	}

	#[test]
	fn runs_custom_validators() {
		let config: toml::Value = toml::from_str(
			r#"
			rpc_url = "ftp://example.com"
			max_attempts = 20
			"#,
		)
		.unwrap();
		assert!(matches!(
			schema().validate(&config),
			Err(ValidationError::InvalidValue { field, .. }) if field == "rpc_url"
		));
	}
}
