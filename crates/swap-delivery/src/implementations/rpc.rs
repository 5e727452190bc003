//! JSON-RPC delivery implementation.
//!
//! Talks to a node's HTTP JSON-RPC endpoint directly: `sendTransaction`
//! for submission, `getTransaction` for status lookups, `getBalance` and
//! `getTokenAccountsByOwner` for balance reads. Request and response
//! shapes are modeled with serde; no SDK sits in between.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use swap_types::{
	CommitmentLevel, ConfigSchema, Field, FieldType, Pubkey, Schema, TransactionSignature,
	TransactionStatus, ValidationError,
};

use crate::{DeliveryError, DeliveryInterface};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Delivery implementation backed by a node's JSON-RPC endpoint.
pub struct RpcDelivery {
	client: reqwest::Client,
	url: String,
}

/// JSON-RPC request structure
#[derive(Serialize)]
struct JsonRpcRequest<T> {
	jsonrpc: &'static str,
	id: u64,
	method: &'static str,
	params: T,
}

/// JSON-RPC response structure
#[derive(Deserialize)]
struct JsonRpcResponse<T> {
	result: Option<T>,
	error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
	code: i64,
	message: String,
}

/// `getTransaction` result body. Only the metadata the poller inspects is
/// modeled; the transaction payload itself is ignored.
#[derive(Deserialize)]
struct TransactionLookup {
	slot: u64,
	meta: Option<TransactionMeta>,
}

#[derive(Deserialize)]
struct TransactionMeta {
	err: Option<serde_json::Value>,
}

/// Wrapper the node puts around account queries.
#[derive(Deserialize)]
struct RpcValue<T> {
	value: T,
}

#[derive(Deserialize)]
struct TokenAccount {
	account: TokenAccountData,
}

#[derive(Deserialize)]
struct TokenAccountData {
	data: ParsedAccountData,
}

#[derive(Deserialize)]
struct ParsedAccountData {
	parsed: ParsedTokenInfo,
}

#[derive(Deserialize)]
struct ParsedTokenInfo {
	info: TokenInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenInfo {
	token_amount: TokenAmount,
}

#[derive(Deserialize)]
struct TokenAmount {
	amount: String,
}

impl RpcDelivery {
	pub fn new(url: &str, timeout: Duration) -> Result<Self, DeliveryError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| DeliveryError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			client,
			url: url.to_string(),
		})
	}

	/// Issues one JSON-RPC call. A `null` result deserializes to `None`;
	/// callers decide whether that is an error for their method.
	async fn call<P: Serialize, R: DeserializeOwned>(
		&self,
		method: &'static str,
		params: P,
	) -> Result<Option<R>, DeliveryError> {
		let request = JsonRpcRequest {
			jsonrpc: "2.0",
			id: 1,
			method,
			params,
		};

		debug!(method, url = %self.url, "rpc call");

		let response = self
			.client
			.post(&self.url)
			.json(&request)
			.send()
			.await
			.map_err(|e| DeliveryError::Network(e.to_string()))?;

		let body: JsonRpcResponse<R> = response
			.json()
			.await
			.map_err(|e| DeliveryError::Malformed(e.to_string()))?;

		if let Some(error) = body.error {
			return Err(DeliveryError::Rpc {
				code: error.code,
				message: error.message,
			});
		}

		Ok(body.result)
	}
}

#[async_trait]
impl DeliveryInterface for RpcDelivery {
	async fn submit_transaction(
		&self,
		wire: &[u8],
		preflight: CommitmentLevel,
	) -> Result<TransactionSignature, DeliveryError> {
		let encoded = base64::engine::general_purpose::STANDARD.encode(wire);
		let params = json!([
			encoded,
			{
				"encoding": "base64",
				"skipPreflight": false,
				"preflightCommitment": preflight.as_str(),
			}
		]);

		let signature: Option<String> = self.call("sendTransaction", params).await?;
		let signature = signature
			.ok_or_else(|| DeliveryError::Malformed("sendTransaction returned null".to_string()))?;

		Ok(TransactionSignature(signature))
	}

	async fn transaction_status(
		&self,
		signature: &TransactionSignature,
		commitment: CommitmentLevel,
	) -> Result<TransactionStatus, DeliveryError> {
		let params = json!([
			signature.0.as_str(),
			{
				"encoding": "json",
				"commitment": commitment.as_str(),
				"maxSupportedTransactionVersion": 0,
			}
		]);

		let lookup: Option<TransactionLookup> = self.call("getTransaction", params).await?;
		// A null result means the node has not indexed the transaction at
		// this commitment level (or dropped it); the poller retries.
		let lookup = lookup.ok_or(DeliveryError::NotIndexed { commitment })?;
		let meta = lookup
			.meta
			.ok_or_else(|| DeliveryError::Malformed("transaction meta missing".to_string()))?;

		Ok(TransactionStatus {
			slot: lookup.slot,
			err: meta.err,
		})
	}

	async fn balance(&self, pubkey: &Pubkey) -> Result<u64, DeliveryError> {
		let params = json!([pubkey.to_string()]);
		let result: Option<RpcValue<u64>> = self.call("getBalance", params).await?;
		let result =
			result.ok_or_else(|| DeliveryError::Malformed("getBalance returned null".to_string()))?;
		Ok(result.value)
	}

	async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64, DeliveryError> {
		let params = json!([
			owner.to_string(),
			{ "mint": mint.to_string() },
			{ "encoding": "jsonParsed" }
		]);

		let result: Option<RpcValue<Vec<TokenAccount>>> =
			self.call("getTokenAccountsByOwner", params).await?;
		let accounts = result
			.ok_or_else(|| {
				DeliveryError::Malformed("getTokenAccountsByOwner returned null".to_string())
			})?
			.value;

		// An owner can hold the mint across several token accounts.
		let mut total: u64 = 0;
		for account in accounts {
			let amount = account.account.data.parsed.info.token_amount.amount;
			let amount: u64 = amount
				.parse()
				.map_err(|_| DeliveryError::Malformed(format!("bad token amount: {}", amount)))?;
			total = total.saturating_add(amount);
		}

		Ok(total)
	}
}

/// Configuration schema for the JSON-RPC delivery provider.
pub struct RpcDeliverySchema;

impl ConfigSchema for RpcDeliverySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("url", FieldType::String).with_validator(|value| {
				let url = value.as_str().unwrap();
				if url.starts_with("http://") || url.starts_with("https://") {
					Ok(())
				} else {
					Err("RPC URL must start with http:// or https://".to_string())
				}
			})],
			vec![Field::new(
				"timeout_secs",
				FieldType::Integer {
					min: Some(1),
					max: None,
				},
			)],
		);

		schema.validate(config)
	}
}

/// Factory function to create a JSON-RPC delivery provider from
/// configuration. Required: `url`. Optional: `timeout_secs`.
pub fn create_rpc_delivery(
	config: &toml::Value,
) -> Result<Box<dyn DeliveryInterface>, DeliveryError> {
	RpcDeliverySchema
		.validate(config)
		.map_err(|e| DeliveryError::Config(e.to_string()))?;

	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| DeliveryError::Config("url is required".to_string()))?;

	let timeout_secs = config
		.get("timeout_secs")
		.and_then(|v| v.as_integer())
		.unwrap_or(DEFAULT_TIMEOUT_SECS as i64) as u64;

	Ok(Box::new(RpcDelivery::new(
		url,
		Duration::from_secs(timeout_secs),
	)?))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn transaction_lookup_reads_success_meta() {
		let body = r#"{
			"jsonrpc": "2.0",
			"id": 1,
			"result": {
				"slot": 277930122,
				"meta": { "err": null, "fee": 5000 },
				"transaction": { "signatures": ["sig"] }
			}
		}"#;
		let response: JsonRpcResponse<TransactionLookup> = serde_json::from_str(body).unwrap();
		let lookup = response.result.unwrap();
		assert_eq!(lookup.slot, 277930122);
		assert!(lookup.meta.unwrap().err.is_none());
	}

	#[test]
	fn transaction_lookup_reads_on_chain_error() {
		let body = r#"{
			"jsonrpc": "2.0",
			"id": 1,
			"result": {
				"slot": 277930122,
				"meta": { "err": { "InstructionError": [3, { "Custom": 6001 }] } }
			}
		}"#;
		let response: JsonRpcResponse<TransactionLookup> = serde_json::from_str(body).unwrap();
		let lookup = response.result.unwrap();
		assert!(lookup.meta.unwrap().err.is_some());
	}

	#[test]
	fn null_result_deserializes_to_none() {
		let body = r#"{"jsonrpc": "2.0", "id": 1, "result": null}"#;
		let response: JsonRpcResponse<TransactionLookup> = serde_json::from_str(body).unwrap();
		assert!(response.result.is_none());
		assert!(response.error.is_none());
	}

	#[test]
	fn rpc_error_object_is_surfaced() {
		let body = r#"{
			"jsonrpc": "2.0",
			"id": 1,
			"error": { "code": -32602, "message": "invalid params" }
		}"#;
		let response: JsonRpcResponse<TransactionLookup> = serde_json::from_str(body).unwrap();
		let error = response.error.unwrap();
		assert_eq!(error.code, -32602);
		assert_eq!(error.message, "invalid params");
	}

	#[test]
	fn token_accounts_parse_and_sum() {
		let body = r#"{
			"value": [
				{ "account": { "data": { "parsed": { "info": { "tokenAmount": { "amount": "150" } } } } } },
				{ "account": { "data": { "parsed": { "info": { "tokenAmount": { "amount": "50" } } } } } }
			]
		}"#;
		let parsed: RpcValue<Vec<TokenAccount>> = serde_json::from_str(body).unwrap();
		let total: u64 = parsed
			.value
			.into_iter()
			.map(|a| a.account.data.parsed.info.token_amount.amount.parse::<u64>().unwrap())
			.sum();
		assert_eq!(total, 200);
	}

	#[test]
	fn factory_rejects_missing_url() {
		let config: toml::Value = toml::from_str("timeout_secs = 10").unwrap();
		assert!(matches!(
			create_rpc_delivery(&config),
			Err(DeliveryError::Config(_))
		));
	}

	#[test]
	fn factory_accepts_minimal_config() {
		let config: toml::Value =
			toml::from_str(r#"url = "https://api.mainnet-beta.solana.com""#).unwrap();
		assert!(create_rpc_delivery(&config).is_ok());
	}
}
