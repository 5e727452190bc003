// swap-config/src/lib.rs

use std::env;
use std::path::Path;

use thiserror::Error;

use swap_types::CommitmentLevel;

mod types;

pub use types::{Config, ConfirmationSettings, ProviderConfig, SwapSettings};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution.
///
/// `${VAR}` references in the file are replaced before parsing, so
/// secrets like the signing key can live in the environment rather than
/// on disk. Prefixed environment variables override individual fields
/// after parsing.
#[derive(Default)]
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "SWAP_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<Config, ConfigError> {
		let mut config = if let Some(file_path) = &self.file_path {
			self.load_from_file(file_path).await?
		} else {
			return Err(ConfigError::FileNotFound(
				"No configuration file specified".to_string(),
			));
		};

		self.apply_env_overrides(&mut config);

		self.validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<Config, ConfigError> {
		let content = tokio::fs::read_to_string(file_path).await?;

		let substituted_content = self.substitute_env_vars(&content)?;

		let config: Config = toml::from_str(&substituted_content)
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		Ok(config)
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static pattern");

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut Config) {
		if let Ok(url) = env::var(format!("{}RPC_URL", self.env_prefix)) {
			set_provider_field(&mut config.delivery, "url", url);
		}

		if let Ok(key) = env::var(format!("{}PRIVATE_KEY", self.env_prefix)) {
			set_provider_field(&mut config.account, "private_key", key);
		}

		if let Ok(endpoint) = env::var(format!("{}QUOTE_ENDPOINT", self.env_prefix)) {
			set_provider_field(&mut config.quote, "endpoint", endpoint);
		}
	}

	fn validate_config(&self, config: &Config) -> Result<(), ConfigError> {
		for (section, provider) in [
			("account", &config.account),
			("quote", &config.quote),
			("delivery", &config.delivery),
		] {
			if provider.provider.is_empty() {
				return Err(ConfigError::ValidationError(format!(
					"{} provider must not be empty",
					section
				)));
			}
		}

		if config.confirmation.max_attempts == 0 {
			return Err(ConfigError::ValidationError(
				"confirmation.max_attempts must be at least 1".to_string(),
			));
		}

		if config.confirmation.poll_interval_secs == 0 {
			return Err(ConfigError::ValidationError(
				"confirmation.poll_interval_secs must be at least 1".to_string(),
			));
		}

		// `processed` only means one node has seen the transaction; it is
		// not a settlement signal and must not drive confirmation.
		if config.confirmation.commitment == CommitmentLevel::Processed {
			return Err(ConfigError::ValidationError(
				"confirmation.commitment must be 'confirmed' or 'finalized'".to_string(),
			));
		}

		Ok(())
	}
}

fn set_provider_field(provider: &mut ProviderConfig, key: &str, value: String) {
	if let Some(table) = provider.config.as_table_mut() {
		table.insert(key.to_string(), toml::Value::String(value));
	}
}
