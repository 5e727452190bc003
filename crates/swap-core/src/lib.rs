//! Orchestration of the swap pipeline.
//!
//! The engine wires the three external collaborators together: the
//! aggregator prices the swap and builds the transaction, the account
//! signs it, the node accepts it and answers status lookups. Each swap is
//! one pass through quote → build → sign → submit → confirm; no state
//! survives between calls.

use std::collections::HashMap;
use std::time::Duration;

use base64::Engine as _;
use thiserror::Error;
use tracing::info;

use swap_account::{AccountError, AccountInterface, AccountService};
use swap_config::{Config, SwapSettings};
use swap_delivery::{ConfirmationConfig, DeliveryError, DeliveryInterface, DeliveryService};
use swap_quote::{QuoteError, QuoteInterface, QuoteService};
use swap_types::{
	CommitmentLevel, ConfirmationResult, EnvelopeError, Pubkey, QuoteRequest, QuoteResponse,
	SwapRequest, TransactionEnvelope, TransactionSignature, LAMPORTS_PER_SOL, WRAPPED_SOL_MINT,
};

#[derive(Debug, Error)]
pub enum SwapError {
	#[error("Quote error: {0}")]
	Quote(#[from] QuoteError),
	#[error("Account error: {0}")]
	Account(#[from] AccountError),
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),
	#[error("Transaction envelope error: {0}")]
	Envelope(#[from] EnvelopeError),
	#[error("Invalid input: {0}")]
	InvalidInput(String),
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Outcome of one swap invocation.
///
/// The confirmation field is a classification, not a boolean: `Unknown`
/// means the poll budget ran out, and callers who resubmit on `Unknown`
/// risk doubling a swap that actually landed.
#[derive(Debug, Clone)]
pub struct SwapReport {
	pub signature: TransactionSignature,
	pub confirmation: ConfirmationResult,
	pub in_amount: String,
	pub out_amount: String,
}

/// The assembled pipeline.
pub struct SwapEngine {
	quote: QuoteService,
	account: AccountService,
	delivery: DeliveryService,
	settings: SwapSettings,
}

impl SwapEngine {
	pub fn new(
		quote: QuoteService,
		account: AccountService,
		delivery: DeliveryService,
		settings: SwapSettings,
	) -> Self {
		Self {
			quote,
			account,
			delivery,
			settings,
		}
	}

	fn native_mint() -> Pubkey {
		WRAPPED_SOL_MINT.parse().expect("static mint address")
	}

	/// Fetches a quote without executing anything.
	pub async fn quote(
		&self,
		input_mint: Pubkey,
		output_mint: Pubkey,
		amount: u64,
		slippage_bps: u16,
	) -> Result<QuoteResponse, SwapError> {
		let request = QuoteRequest {
			input_mint,
			output_mint,
			amount,
			slippage_bps,
			only_direct_routes: self.settings.only_direct_routes.then_some(true),
		};
		Ok(self.quote.quote(&request).await?)
	}

	/// Executes a full swap: quote, fetch the prebuilt transaction, sign
	/// it, submit it once, and poll for confirmation.
	pub async fn swap(
		&self,
		input_mint: Pubkey,
		output_mint: Pubkey,
		amount: u64,
		slippage_bps: u16,
	) -> Result<SwapReport, SwapError> {
		if amount == 0 {
			return Err(SwapError::InvalidInput(
				"Swap amount must be positive".to_string(),
			));
		}

		let quote = self
			.quote(input_mint, output_mint, amount, slippage_bps)
			.await?;
		info!(
			input_mint = %quote.input_mint,
			output_mint = %quote.output_mint,
			in_amount = %quote.in_amount,
			out_amount = %quote.out_amount,
			"quote received"
		);

		let user = self.account.pubkey().await?;
		let swap_response = self
			.quote
			.swap_transaction(&SwapRequest {
				user_public_key: user,
				wrap_and_unwrap_sol: self.settings.wrap_and_unwrap_sol,
				use_shared_accounts: self.settings.use_shared_accounts,
				quote_response: quote.clone(),
			})
			.await?;

		let raw = base64::engine::general_purpose::STANDARD
			.decode(&swap_response.swap_transaction)
			.map_err(|e| {
				SwapError::InvalidInput(format!("Swap transaction is not base64: {}", e))
			})?;
		let envelope = TransactionEnvelope::from_bytes(&raw)?;
		let signature = self.account.sign(envelope.message()).await?;
		let wire = envelope.into_signed(&signature);

		let tx_signature = self.delivery.submit(&wire, CommitmentLevel::Processed).await?;
		let confirmation = self.delivery.confirm(&tx_signature).await;

		Ok(SwapReport {
			signature: tx_signature,
			confirmation,
			in_amount: quote.in_amount,
			out_amount: quote.out_amount,
		})
	}

	/// Buys `output_mint` with native SOL.
	pub async fn buy(
		&self,
		output_mint: Pubkey,
		sol_amount: f64,
		slippage_bps: u16,
	) -> Result<SwapReport, SwapError> {
		if sol_amount <= 0.0 {
			return Err(SwapError::InvalidInput(
				"SOL amount must be positive".to_string(),
			));
		}
		let lamports = (sol_amount * LAMPORTS_PER_SOL as f64) as u64;
		self.swap(Self::native_mint(), output_mint, lamports, slippage_bps)
			.await
	}

	/// Sells a percentage of the held `input_mint` balance for SOL.
	///
	/// The balance is read once; it is a plain lookup, not retried.
	pub async fn sell(
		&self,
		input_mint: Pubkey,
		percentage: u8,
		slippage_bps: u16,
	) -> Result<SwapReport, SwapError> {
		if !(1..=100).contains(&percentage) {
			return Err(SwapError::InvalidInput(
				"Percentage must be between 1 and 100".to_string(),
			));
		}

		let owner = self.account.pubkey().await?;
		let balance = self.delivery.token_balance(&owner, &input_mint).await?;
		info!(%input_mint, balance, "token balance");

		if balance == 0 {
			return Err(SwapError::InvalidInput(
				"No token balance available to sell".to_string(),
			));
		}

		let amount = (balance as u128 * percentage as u128 / 100) as u64;
		self.swap(input_mint, Self::native_mint(), amount, slippage_bps)
			.await
	}

	/// Native balance of the signing account, in lamports.
	pub async fn balance(&self) -> Result<u64, SwapError> {
		let owner = self.account.pubkey().await?;
		Ok(self.delivery.balance(&owner).await?)
	}

	/// Token balance of the signing account for `mint`.
	pub async fn token_balance(&self, mint: Pubkey) -> Result<u64, SwapError> {
		let owner = self.account.pubkey().await?;
		Ok(self.delivery.token_balance(&owner, &mint).await?)
	}

	/// Re-runs the confirmation poller for an already-submitted signature.
	pub async fn confirm(&self, signature: &TransactionSignature) -> ConfirmationResult {
		self.delivery.confirm(signature).await
	}

	/// The signing account's public key.
	pub async fn pubkey(&self) -> Result<Pubkey, SwapError> {
		Ok(self.account.pubkey().await?)
	}
}

// Type aliases for factory functions
type AccountFactory =
	Box<dyn Fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> + Send>;
type QuoteFactory = Box<dyn Fn(&toml::Value) -> Result<Box<dyn QuoteInterface>, QuoteError> + Send>;
type DeliveryFactory =
	Box<dyn Fn(&toml::Value) -> Result<Box<dyn DeliveryInterface>, DeliveryError> + Send>;

/// Factory pattern for creating the engine from configuration.
///
/// Each provider section in the config names an implementation; the
/// builder looks the name up in its factory maps and hands the section's
/// `config` table to the factory.
pub struct SwapBuilder {
	config: Config,
	account_factories: HashMap<String, AccountFactory>,
	quote_factories: HashMap<String, QuoteFactory>,
	delivery_factories: HashMap<String, DeliveryFactory>,
}

impl SwapBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			account_factories: HashMap::new(),
			quote_factories: HashMap::new(),
			delivery_factories: HashMap::new(),
		}
	}

	pub fn with_account_factory<F>(mut self, name: &str, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> + Send + 'static,
	{
		self.account_factories
			.insert(name.to_string(), Box::new(factory));
		self
	}

	pub fn with_quote_factory<F>(mut self, name: &str, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn QuoteInterface>, QuoteError> + Send + 'static,
	{
		self.quote_factories
			.insert(name.to_string(), Box::new(factory));
		self
	}

	pub fn with_delivery_factory<F>(mut self, name: &str, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn DeliveryInterface>, DeliveryError> + Send + 'static,
	{
		self.delivery_factories
			.insert(name.to_string(), Box::new(factory));
		self
	}

	pub fn build(self) -> Result<SwapEngine, SwapError> {
		let account_provider = self
			.account_factories
			.get(&self.config.account.provider)
			.ok_or_else(|| {
				SwapError::Config(format!(
					"Unknown account provider: {}",
					self.config.account.provider
				))
			})?(&self.config.account.config)?;

		let quote_provider = self
			.quote_factories
			.get(&self.config.quote.provider)
			.ok_or_else(|| {
				SwapError::Config(format!(
					"Unknown quote provider: {}",
					self.config.quote.provider
				))
			})?(&self.config.quote.config)?;

		let delivery_provider = self
			.delivery_factories
			.get(&self.config.delivery.provider)
			.ok_or_else(|| {
				SwapError::Config(format!(
					"Unknown delivery provider: {}",
					self.config.delivery.provider
				))
			})?(&self.config.delivery.config)?;

		let confirmation = ConfirmationConfig {
			max_attempts: self.config.confirmation.max_attempts,
			poll_interval: Duration::from_secs(self.config.confirmation.poll_interval_secs),
			commitment: self.config.confirmation.commitment,
		};

		Ok(SwapEngine::new(
			QuoteService::new(quote_provider),
			AccountService::new(account_provider),
			DeliveryService::new(delivery_provider, confirmation),
			self.config.swap.clone(),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use base64::Engine as _;
	use std::sync::{Arc, Mutex};
	use swap_types::{Signature, SwapResponse, TransactionStatus};

	const MESSAGE: &[u8] = b"prebuilt swap message";

	fn unsigned_transaction_b64() -> String {
		let mut wire = vec![1u8];
		wire.extend_from_slice(&[0u8; 64]);
		wire.extend_from_slice(MESSAGE);
		base64::engine::general_purpose::STANDARD.encode(wire)
	}

	#[derive(Default)]
	struct MockState {
		quote_requests: Vec<QuoteRequest>,
		signed_messages: Vec<Vec<u8>>,
		submitted_wires: Vec<Vec<u8>>,
	}

	struct MockQuote {
		state: Arc<Mutex<MockState>>,
		swap_transaction: String,
	}

	#[async_trait]
	impl QuoteInterface for MockQuote {
		async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, QuoteError> {
			self.state.lock().unwrap().quote_requests.push(request.clone());
			Ok(QuoteResponse {
				input_mint: request.input_mint,
				output_mint: request.output_mint,
				in_amount: request.amount.to_string(),
				out_amount: "987654".to_string(),
				price_impact_pct: None,
				extra: serde_json::Map::new(),
			})
		}

		async fn swap_transaction(
			&self,
			_request: &SwapRequest,
		) -> Result<SwapResponse, QuoteError> {
			Ok(SwapResponse {
				swap_transaction: self.swap_transaction.clone(),
				last_valid_block_height: None,
			})
		}
	}

	struct MockAccount {
		state: Arc<Mutex<MockState>>,
	}

	#[async_trait]
	impl AccountInterface for MockAccount {
		async fn pubkey(&self) -> Result<Pubkey, AccountError> {
			Ok(Pubkey([3u8; 32]))
		}

		async fn sign_message(&self, message: &[u8]) -> Result<Signature, AccountError> {
			self.state.lock().unwrap().signed_messages.push(message.to_vec());
			Ok(Signature([0x5a; 64]))
		}
	}

	struct MockDelivery {
		state: Arc<Mutex<MockState>>,
		on_chain_err: Option<serde_json::Value>,
		token_balance: u64,
	}

	#[async_trait]
	impl DeliveryInterface for MockDelivery {
		async fn submit_transaction(
			&self,
			wire: &[u8],
			_preflight: CommitmentLevel,
		) -> Result<TransactionSignature, DeliveryError> {
			self.state.lock().unwrap().submitted_wires.push(wire.to_vec());
			Ok(TransactionSignature::from("MockSignature111"))
		}

		async fn transaction_status(
			&self,
			_signature: &TransactionSignature,
			_commitment: CommitmentLevel,
		) -> Result<TransactionStatus, DeliveryError> {
			Ok(TransactionStatus {
				slot: 1,
				err: self.on_chain_err.clone(),
			})
		}

		async fn balance(&self, _pubkey: &Pubkey) -> Result<u64, DeliveryError> {
			Ok(0)
		}

		async fn token_balance(
			&self,
			_owner: &Pubkey,
			_mint: &Pubkey,
		) -> Result<u64, DeliveryError> {
			Ok(self.token_balance)
		}
	}

	fn engine(
		state: Arc<Mutex<MockState>>,
		on_chain_err: Option<serde_json::Value>,
		token_balance: u64,
	) -> SwapEngine {
		SwapEngine::new(
			QuoteService::new(Box::new(MockQuote {
				state: state.clone(),
				swap_transaction: unsigned_transaction_b64(),
			})),
			AccountService::new(Box::new(MockAccount {
				state: state.clone(),
			})),
			DeliveryService::new(
				Box::new(MockDelivery {
					state,
					on_chain_err,
					token_balance,
				}),
				ConfirmationConfig::default(),
			),
			SwapSettings::default(),
		)
	}

	fn mint(byte: u8) -> Pubkey {
		Pubkey([byte; 32])
	}

	#[tokio::test]
	async fn swap_signs_message_and_submits_signed_wire() {
		let state = Arc::new(Mutex::new(MockState::default()));
		let report = engine(state.clone(), None, 0)
			.swap(mint(1), mint(2), 1_000_000, 100)
			.await
			.unwrap();

		assert_eq!(report.confirmation, ConfirmationResult::Confirmed);
		assert_eq!(report.in_amount, "1000000");

		let state = state.lock().unwrap();
		assert_eq!(state.signed_messages, vec![MESSAGE.to_vec()]);

		let wire = &state.submitted_wires[0];
		assert_eq!(wire[0], 1);
		assert_eq!(&wire[1..65], &[0x5a; 64]);
		assert_eq!(&wire[65..], MESSAGE);
	}

	#[tokio::test]
	async fn swap_reports_on_chain_failure() {
		let state = Arc::new(Mutex::new(MockState::default()));
		let report = engine(state, Some(serde_json::json!("AccountInUse")), 0)
			.swap(mint(1), mint(2), 1_000_000, 100)
			.await
			.unwrap();

		assert_eq!(report.confirmation, ConfirmationResult::Failed);
	}

	#[tokio::test]
	async fn swap_rejects_zero_amount() {
		let state = Arc::new(Mutex::new(MockState::default()));
		let result = engine(state.clone(), None, 0).swap(mint(1), mint(2), 0, 100).await;
		assert!(matches!(result, Err(SwapError::InvalidInput(_))));
		assert!(state.lock().unwrap().quote_requests.is_empty());
	}

	#[tokio::test]
	async fn buy_converts_sol_to_lamports() {
		let state = Arc::new(Mutex::new(MockState::default()));
		engine(state.clone(), None, 0)
			.buy(mint(2), 0.5, 100)
			.await
			.unwrap();

		let state = state.lock().unwrap();
		let request = &state.quote_requests[0];
		assert_eq!(request.amount, 500_000_000);
		assert_eq!(request.input_mint.to_string(), WRAPPED_SOL_MINT);
		assert_eq!(request.output_mint, mint(2));
	}

	#[tokio::test]
	async fn sell_takes_percentage_of_balance() {
		let state = Arc::new(Mutex::new(MockState::default()));
		engine(state.clone(), None, 1_000)
			.sell(mint(2), 25, 100)
			.await
			.unwrap();

		let state = state.lock().unwrap();
		let request = &state.quote_requests[0];
		assert_eq!(request.amount, 250);
		assert_eq!(request.input_mint, mint(2));
		assert_eq!(request.output_mint.to_string(), WRAPPED_SOL_MINT);
	}

	#[tokio::test]
	async fn sell_validates_percentage_range() {
		let state = Arc::new(Mutex::new(MockState::default()));
		let engine = engine(state.clone(), None, 1_000);

		assert!(matches!(
			engine.sell(mint(2), 0, 100).await,
			Err(SwapError::InvalidInput(_))
		));
		assert!(matches!(
			engine.sell(mint(2), 101, 100).await,
			Err(SwapError::InvalidInput(_))
		));
		assert!(state.lock().unwrap().quote_requests.is_empty());
	}

	#[tokio::test]
	async fn sell_rejects_empty_balance() {
		let state = Arc::new(Mutex::new(MockState::default()));
		let result = engine(state, None, 0).sell(mint(2), 100, 100).await;
		assert!(matches!(result, Err(SwapError::InvalidInput(_))));
	}
}
