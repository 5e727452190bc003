//! Quote and swap-transaction payloads for the aggregator API.
//!
//! The aggregator computes routing and builds the transaction; these types
//! only carry its request/response shapes. The quote response is passed
//! back verbatim when requesting the swap transaction, so unrecognized
//! fields are retained rather than dropped.

use serde::{Deserialize, Serialize};

use crate::account::Pubkey;

/// Parameters for a quote lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
	pub input_mint: Pubkey,
	pub output_mint: Pubkey,
	/// Input amount in the mint's base units (lamports for SOL).
	pub amount: u64,
	pub slippage_bps: u16,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub only_direct_routes: Option<bool>,
}

/// A priced route returned by the aggregator.
///
/// Only the fields the pipeline reads are typed; the route plan and any
/// fields the aggregator adds later ride along in `extra` so the response
/// can be echoed back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
	pub input_mint: Pubkey,
	pub output_mint: Pubkey,
	pub in_amount: String,
	pub out_amount: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub price_impact_pct: Option<String>,
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Request for a prebuilt swap transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
	pub user_public_key: Pubkey,
	pub wrap_and_unwrap_sol: bool,
	pub use_shared_accounts: bool,
	pub quote_response: QuoteResponse,
}

/// The prebuilt swap transaction, unsigned, base64-encoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
	pub swap_transaction: String,
	#[serde(default)]
	pub last_valid_block_height: Option<u64>,
}
