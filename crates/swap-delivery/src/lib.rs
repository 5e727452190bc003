//! Transaction delivery for the swap pipeline.
//!
//! This crate owns the two halves of getting a signed transaction onto the
//! chain: a single submission attempt, and the confirmation poller that
//! watches the opaque signature until the network reports a terminal
//! outcome or the retry budget runs out.
//!
//! Submission is never retried; a transport failure there surfaces
//! immediately at the call site. The poller, by contrast, absorbs lookup
//! failures: a node that has not yet indexed a fresh transaction is
//! indistinguishable from a transient network blip, so both consume an
//! attempt and wait. Only an on-chain verdict stops the loop early.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use swap_types::{
	AttemptOutcome, CommitmentLevel, ConfirmationResult, Pubkey, TransactionSignature,
	TransactionStatus,
};

/// Re-export implementations
pub mod implementations {
	pub mod rpc;
}

/// Errors that can occur during delivery operations.
///
/// The variants distinguish transport failures from not-yet-indexed
/// lookups and malformed bodies so callers *can* tell them apart, but the
/// confirmation poller deliberately treats all three as a failed lookup.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Transport-level failure reaching the node.
	#[error("Network error: {0}")]
	Network(String),
	/// The node answered with a JSON-RPC error object.
	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },
	/// The node has no record of the transaction at the requested
	/// commitment level.
	#[error("Transaction not indexed at {commitment} commitment")]
	NotIndexed { commitment: CommitmentLevel },
	/// The response body did not match the expected shape.
	#[error("Malformed response: {0}")]
	Malformed(String),
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Trait defining the node operations the pipeline depends on.
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	/// Submits signed transaction bytes, returning the opaque signature
	/// the node assigns. `preflight` is the commitment level the node
	/// simulates against before accepting.
	async fn submit_transaction(
		&self,
		wire: &[u8],
		preflight: CommitmentLevel,
	) -> Result<TransactionSignature, DeliveryError>;

	/// Looks up the status of a submitted transaction at the given
	/// commitment level. Fails if the node has not indexed it yet.
	async fn transaction_status(
		&self,
		signature: &TransactionSignature,
		commitment: CommitmentLevel,
	) -> Result<TransactionStatus, DeliveryError>;

	/// Native balance of an account, in lamports.
	async fn balance(&self, pubkey: &Pubkey) -> Result<u64, DeliveryError>;

	/// Total balance held by `owner` for `mint`, in the mint's base units.
	async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64, DeliveryError>;
}

/// Retry budget for the confirmation poller.
#[derive(Debug, Clone)]
pub struct ConfirmationConfig {
	/// Upper bound on status lookups per confirmation.
	pub max_attempts: u32,
	/// Minimum wait between lookups.
	pub poll_interval: Duration,
	/// Commitment level lookups are made at. Must be `Confirmed` or
	/// stronger; `Processed` would accept transactions the network can
	/// still drop.
	pub commitment: CommitmentLevel,
}

impl Default for ConfirmationConfig {
	fn default() -> Self {
		Self {
			max_attempts: 20,
			poll_interval: Duration::from_secs(3),
			commitment: CommitmentLevel::Confirmed,
		}
	}
}

/// One iteration of the poll loop. Created and discarded per attempt;
/// only feeds the classification and the operator-facing trace output.
#[derive(Debug)]
struct PollAttempt {
	index: u32,
	outcome: AttemptOutcome,
	at: tokio::time::Instant,
}

/// Classifies a single status lookup.
///
/// Every lookup error maps to `LookupFailed` regardless of cause: a node
/// that has not indexed the transaction yet and a transport failure look
/// the same from here, and both are worth another attempt.
fn classify_lookup(lookup: &Result<TransactionStatus, DeliveryError>) -> AttemptOutcome {
	match lookup {
		Ok(status) if status.succeeded() => AttemptOutcome::NoErrorObserved,
		Ok(_) => AttemptOutcome::ErrorObserved,
		Err(_) => AttemptOutcome::LookupFailed,
	}
}

/// High-level delivery service wrapping a node implementation.
///
/// Owns the confirmation poller; each call to [`DeliveryService::confirm`]
/// is self-contained and retains no state afterwards.
pub struct DeliveryService {
	provider: Box<dyn DeliveryInterface>,
	confirmation: ConfirmationConfig,
}

impl DeliveryService {
	pub fn new(provider: Box<dyn DeliveryInterface>, confirmation: ConfirmationConfig) -> Self {
		Self {
			provider,
			confirmation,
		}
	}

	/// Submits signed transaction bytes. A single attempt; submission
	/// failures are not retried.
	pub async fn submit(
		&self,
		wire: &[u8],
		preflight: CommitmentLevel,
	) -> Result<TransactionSignature, DeliveryError> {
		let signature = self.provider.submit_transaction(wire, preflight).await?;
		info!(%signature, "transaction submitted");
		Ok(signature)
	}

	/// Polls for the terminal outcome of a submitted transaction using the
	/// configured budget.
	pub async fn confirm(&self, signature: &TransactionSignature) -> ConfirmationResult {
		self.confirm_with(
			signature,
			self.confirmation.max_attempts,
			self.confirmation.poll_interval,
		)
		.await
	}

	/// Polls for the terminal outcome of a submitted transaction.
	///
	/// Performs at most `max_attempts` status lookups at the configured
	/// commitment level, sleeping `interval` between attempts. Returns
	/// `Confirmed` or `Failed` as soon as the network reports a verdict;
	/// returns `Unknown` once the budget is exhausted. `Unknown` means
	/// "not verified", not "failed" — the transaction may still land.
	pub async fn confirm_with(
		&self,
		signature: &TransactionSignature,
		max_attempts: u32,
		interval: Duration,
	) -> ConfirmationResult {
		let commitment = self.confirmation.commitment;
		let started = tokio::time::Instant::now();

		for index in 1..=max_attempts {
			let lookup = self.provider.transaction_status(signature, commitment).await;
			let attempt = PollAttempt {
				index,
				outcome: classify_lookup(&lookup),
				at: tokio::time::Instant::now(),
			};

			match attempt.outcome {
				AttemptOutcome::NoErrorObserved => {
					info!(
						%signature,
						attempt = attempt.index,
						elapsed_ms = (attempt.at - started).as_millis() as u64,
						"transaction confirmed"
					);
					return ConfirmationResult::Confirmed;
				}
				AttemptOutcome::ErrorObserved => {
					// Processed but rejected on chain; further polling
					// cannot change the verdict.
					warn!(
						%signature,
						attempt = attempt.index,
						"transaction failed on chain"
					);
					return ConfirmationResult::Failed;
				}
				AttemptOutcome::LookupFailed => {
					debug!(
						%signature,
						attempt = attempt.index,
						max_attempts,
						"awaiting confirmation"
					);
				}
			}

			if index < max_attempts {
				tokio::time::sleep(interval).await;
			}
		}

		warn!(
			%signature,
			max_attempts,
			"confirmation budget exhausted; outcome unknown"
		);
		ConfirmationResult::Unknown
	}

	pub async fn balance(&self, pubkey: &Pubkey) -> Result<u64, DeliveryError> {
		self.provider.balance(pubkey).await
	}

	pub async fn token_balance(
		&self,
		owner: &Pubkey,
		mint: &Pubkey,
	) -> Result<u64, DeliveryError> {
		self.provider.token_balance(owner, mint).await
	}
}
