//! Jupiter v6 aggregator implementation of the quote interface.
//!
//! Two endpoints are used: `GET /quote` with query parameters, and
//! `POST /swap` carrying the quote response back verbatim. The aggregator
//! owns all routing decisions; this client only moves payloads.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use swap_types::{
	ConfigSchema, Field, FieldType, QuoteRequest, QuoteResponse, Schema, SwapRequest,
	SwapResponse, ValidationError,
};

use crate::{QuoteError, QuoteInterface};

const DEFAULT_ENDPOINT: &str = "https://quote-api.jup.ag/v6";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Jupiter v6 quote API.
pub struct JupiterClient {
	client: reqwest::Client,
	endpoint: String,
}

impl JupiterClient {
	pub fn new(endpoint: &str) -> Result<Self, QuoteError> {
		let client = reqwest::Client::builder()
			.timeout(REQUEST_TIMEOUT)
			.build()
			.map_err(|e| QuoteError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			client,
			endpoint: endpoint.trim_end_matches('/').to_string(),
		})
	}

	async fn decode<T: serde::de::DeserializeOwned>(
		response: reqwest::Response,
	) -> Result<T, QuoteError> {
		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(QuoteError::Api {
				status: status.as_u16(),
				body,
			});
		}
		response
			.json::<T>()
			.await
			.map_err(|e| QuoteError::Malformed(e.to_string()))
	}
}

#[async_trait]
impl QuoteInterface for JupiterClient {
	async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, QuoteError> {
		let url = format!("{}/quote", self.endpoint);
		debug!(%url, amount = request.amount, "requesting quote");

		let response = self
			.client
			.get(&url)
			.header(reqwest::header::ACCEPT, "application/json")
			.query(request)
			.send()
			.await
			.map_err(|e| QuoteError::Network(e.to_string()))?;

		Self::decode(response).await
	}

	async fn swap_transaction(&self, request: &SwapRequest) -> Result<SwapResponse, QuoteError> {
		let url = format!("{}/swap", self.endpoint);
		debug!(%url, user = %request.user_public_key, "requesting swap transaction");

		let response = self
			.client
			.post(&url)
			.header(reqwest::header::ACCEPT, "application/json")
			.json(request)
			.send()
			.await
			.map_err(|e| QuoteError::Network(e.to_string()))?;

		Self::decode(response).await
	}
}

/// Configuration schema for the Jupiter quote provider.
pub struct JupiterSchema;

impl ConfigSchema for JupiterSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![Field::new("endpoint", FieldType::String).with_validator(|value| {
				let url = value.as_str().unwrap();
				if url.starts_with("http://") || url.starts_with("https://") {
					Ok(())
				} else {
					Err("Endpoint must start with http:// or https://".to_string())
				}
			})],
		);

		schema.validate(config)
	}
}

/// Factory function to create a Jupiter client from configuration.
///
/// The `endpoint` field is optional and defaults to the public v6 API.
pub fn create_jupiter_quote(config: &toml::Value) -> Result<Box<dyn QuoteInterface>, QuoteError> {
	JupiterSchema
		.validate(config)
		.map_err(|e| QuoteError::Config(e.to_string()))?;

	let endpoint = config
		.get("endpoint")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_ENDPOINT);

	Ok(Box::new(JupiterClient::new(endpoint)?))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn endpoint_trailing_slash_is_normalized() {
		let client = JupiterClient::new("https://quote-api.jup.ag/v6/").unwrap();
		assert_eq!(client.endpoint, "https://quote-api.jup.ag/v6");
	}

	#[test]
	fn factory_defaults_endpoint() {
		let config: toml::Value = toml::from_str("").unwrap();
		assert!(create_jupiter_quote(&config).is_ok());
	}

	#[test]
	fn factory_rejects_non_http_endpoint() {
		let config: toml::Value = toml::from_str(r#"endpoint = "ws://example.com""#).unwrap();
		assert!(matches!(
			create_jupiter_quote(&config),
			Err(QuoteError::Config(_))
		));
	}
}
