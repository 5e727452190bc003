use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swap_account::implementations::local::create_local_account;
use swap_config::{Config, ConfigLoader};
use swap_core::{SwapBuilder, SwapEngine, SwapReport};
use swap_delivery::implementations::rpc::create_rpc_delivery;
use swap_quote::implementations::jupiter::create_jupiter_quote;
use swap_types::{ConfirmationResult, TransactionSignature, LAMPORTS_PER_SOL};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level);

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")?;

	if let Command::Validate = cli.command {
		return validate_config(&config);
	}

	let default_slippage = config.swap.slippage_bps;
	let engine = build_engine(config).context("Failed to build swap engine")?;

	match cli.command {
		Command::Quote {
			input_mint,
			output_mint,
			amount,
			slippage_bps,
		} => {
			let quote = engine
				.quote(
					input_mint,
					output_mint,
					amount,
					slippage_bps.unwrap_or(default_slippage),
				)
				.await?;
			println!("{}", serde_json::to_string_pretty(&quote)?);
			Ok(())
		}

		Command::Swap {
			input_mint,
			output_mint,
			amount,
			slippage_bps,
		} => {
			let report = engine
				.swap(
					input_mint,
					output_mint,
					amount,
					slippage_bps.unwrap_or(default_slippage),
				)
				.await?;
			report_outcome(&report)
		}

		Command::Buy {
			mint,
			sol,
			slippage_bps,
		} => {
			let report = engine
				.buy(mint, sol, slippage_bps.unwrap_or(default_slippage))
				.await?;
			report_outcome(&report)
		}

		Command::Sell {
			mint,
			percentage,
			slippage_bps,
		} => {
			let report = engine
				.sell(mint, percentage, slippage_bps.unwrap_or(default_slippage))
				.await?;
			report_outcome(&report)
		}

		Command::Balance { mint } => {
			match mint {
				Some(mint) => {
					let balance = engine.token_balance(mint).await?;
					println!("{}", balance);
				}
				None => {
					let lamports = engine.balance().await?;
					println!(
						"{} lamports ({} SOL)",
						lamports,
						lamports as f64 / LAMPORTS_PER_SOL as f64
					);
				}
			}
			Ok(())
		}

		Command::Confirm { signature } => {
			let signature = TransactionSignature(signature);
			let result = engine.confirm(&signature).await;
			println!("{}: {}", signature, result);
			if result == ConfirmationResult::Failed {
				bail!("Transaction failed on chain");
			}
			Ok(())
		}

		Command::Validate => unreachable!("handled before engine construction"),
	}
}

fn build_engine(config: Config) -> Result<SwapEngine> {
	let engine = SwapBuilder::new(config)
		.with_account_factory("local", create_local_account)
		.with_quote_factory("jupiter", create_jupiter_quote)
		.with_delivery_factory("rpc", create_rpc_delivery)
		.build()?;
	Ok(engine)
}

/// Prints the swap outcome and maps it to the process result.
///
/// `Unknown` exits successfully with a warning: the budget ran out before
/// the network reported a verdict, which is not proof of failure.
/// Resubmitting on `Unknown` risks doubling a swap that landed.
fn report_outcome(report: &SwapReport) -> Result<()> {
	println!(
		"{} ({} -> {}): {}",
		report.signature, report.in_amount, report.out_amount, report.confirmation
	);

	match report.confirmation {
		ConfirmationResult::Confirmed => {
			info!(signature = %report.signature, "swap confirmed");
			Ok(())
		}
		ConfirmationResult::Failed => bail!("Transaction failed on chain"),
		ConfirmationResult::Unknown => {
			warn!(
				signature = %report.signature,
				"confirmation budget exhausted; transaction not verified"
			);
			Ok(())
		}
	}
}

fn validate_config(config: &Config) -> Result<()> {
	info!("Configuration is valid");
	info!("  Account provider: {}", config.account.provider);
	info!("  Quote provider: {}", config.quote.provider);
	info!("  Delivery provider: {}", config.delivery.provider);
	info!(
		"  Confirmation: {} attempts every {}s at {} commitment",
		config.confirmation.max_attempts,
		config.confirmation.poll_interval_secs,
		config.confirmation.commitment
	);
	Ok(())
}

fn setup_tracing(log_level: &str) {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();
}
