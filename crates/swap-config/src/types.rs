//! Configuration types for the swap pipeline.

use serde::Deserialize;

use swap_types::CommitmentLevel;

/// Complete pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// Signer configuration.
	pub account: ProviderConfig,
	/// Aggregator (quote API) configuration.
	pub quote: ProviderConfig,
	/// Node (RPC) configuration.
	pub delivery: ProviderConfig,
	/// Confirmation poller budget.
	#[serde(default)]
	pub confirmation: ConfirmationSettings,
	/// Swap behavior defaults.
	#[serde(default)]
	pub swap: SwapSettings,
}

/// A named provider with its implementation-specific settings.
///
/// The `config` table is passed verbatim to the provider's factory, which
/// validates it against its own schema.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
	/// Implementation selector, e.g. `local`, `jupiter`, `rpc`.
	pub provider: String,
	/// Implementation-specific settings.
	#[serde(default = "empty_table")]
	pub config: toml::Value,
}

fn empty_table() -> toml::Value {
	toml::Value::Table(toml::map::Map::new())
}

/// Retry budget for transaction confirmation.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationSettings {
	/// Upper bound on status lookups per confirmation.
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	/// Seconds to wait between lookups.
	#[serde(default = "default_poll_interval_secs")]
	pub poll_interval_secs: u64,
	/// Commitment level for status lookups. `processed` is rejected at
	/// load time; it would report transactions the network can still drop.
	#[serde(default = "default_commitment")]
	pub commitment: CommitmentLevel,
}

impl Default for ConfirmationSettings {
	fn default() -> Self {
		Self {
			max_attempts: default_max_attempts(),
			poll_interval_secs: default_poll_interval_secs(),
			commitment: default_commitment(),
		}
	}
}

fn default_max_attempts() -> u32 {
	20
}

fn default_poll_interval_secs() -> u64 {
	3
}

fn default_commitment() -> CommitmentLevel {
	CommitmentLevel::Confirmed
}

/// Swap behavior defaults, overridable per invocation on the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapSettings {
	/// Default slippage tolerance in basis points.
	#[serde(default = "default_slippage_bps")]
	pub slippage_bps: u16,
	/// Wrap and unwrap native SOL around the swap.
	#[serde(default = "default_true")]
	pub wrap_and_unwrap_sol: bool,
	/// Use the aggregator's shared intermediate accounts.
	#[serde(default = "default_true")]
	pub use_shared_accounts: bool,
	/// Restrict quotes to single-hop routes.
	#[serde(default)]
	pub only_direct_routes: bool,
}

impl Default for SwapSettings {
	fn default() -> Self {
		Self {
			slippage_bps: default_slippage_bps(),
			wrap_and_unwrap_sol: true,
			use_shared_accounts: true,
			only_direct_routes: false,
		}
	}
}

fn default_slippage_bps() -> u16 {
	500
}

fn default_true() -> bool {
	true
}
