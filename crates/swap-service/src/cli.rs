//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use swap_types::Pubkey;

#[derive(Parser, Debug)]
#[command(name = "jup-swap")]
#[command(about = "Aggregator swap pipeline with transaction confirmation", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
	/// Path to configuration file
	#[arg(short, long, value_name = "FILE", env = "SWAP_CONFIG", default_value = "config/swap.toml")]
	pub config: PathBuf,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(long, env = "SWAP_LOG_LEVEL", default_value = "info")]
	pub log_level: String,

	/// Subcommand to execute
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Fetch a quote without executing anything
	Quote {
		/// Mint being sold
		input_mint: Pubkey,
		/// Mint being bought
		output_mint: Pubkey,
		/// Input amount in the mint's base units
		amount: u64,
		/// Slippage tolerance in basis points
		#[arg(long)]
		slippage_bps: Option<u16>,
	},

	/// Execute a swap between two mints
	Swap {
		/// Mint being sold
		input_mint: Pubkey,
		/// Mint being bought
		output_mint: Pubkey,
		/// Input amount in the mint's base units
		amount: u64,
		/// Slippage tolerance in basis points
		#[arg(long)]
		slippage_bps: Option<u16>,
	},

	/// Buy a token with native SOL
	Buy {
		/// Mint being bought
		mint: Pubkey,
		/// SOL amount to spend
		sol: f64,
		/// Slippage tolerance in basis points
		#[arg(long)]
		slippage_bps: Option<u16>,
	},

	/// Sell a held token back to native SOL
	Sell {
		/// Mint being sold
		mint: Pubkey,
		/// Percentage of the held balance to sell (1-100)
		#[arg(long, default_value_t = 100)]
		percentage: u8,
		/// Slippage tolerance in basis points
		#[arg(long)]
		slippage_bps: Option<u16>,
	},

	/// Show the signing account's balance
	Balance {
		/// Token mint to query; native SOL when omitted
		mint: Option<Pubkey>,
	},

	/// Poll confirmation status for a submitted transaction signature
	Confirm {
		/// Base58 transaction signature
		signature: String,
	},

	/// Validate the configuration file
	Validate,
}
