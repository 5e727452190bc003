//! Account abstraction for the swap pipeline.
//!
//! The pipeline never builds transactions itself; it only needs a signer
//! that can produce an ed25519 signature over prebuilt message bytes and
//! report its own public key. Implementations live under
//! `implementations/`.

use async_trait::async_trait;
use thiserror::Error;

use swap_types::{Pubkey, Signature};

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Trait defining the signing capability the pipeline depends on.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// The public key transactions are signed with.
	async fn pubkey(&self) -> Result<Pubkey, AccountError>;

	/// Signs prebuilt message bytes, returning the wire-order signature.
	async fn sign_message(&self, message: &[u8]) -> Result<Signature, AccountError>;
}

/// High-level account service wrapping a signer implementation.
pub struct AccountService {
	provider: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(provider: Box<dyn AccountInterface>) -> Self {
		Self { provider }
	}

	pub async fn pubkey(&self) -> Result<Pubkey, AccountError> {
		self.provider.pubkey().await
	}

	pub async fn sign(&self, message: &[u8]) -> Result<Signature, AccountError> {
		self.provider.sign_message(message).await
	}
}
