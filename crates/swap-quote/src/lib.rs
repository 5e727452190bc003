//! Quote retrieval for the swap pipeline.
//!
//! Routing and pricing are computed by an external aggregator; this crate
//! only wraps its HTTP API. Both operations are single stateless calls:
//! failures surface to the caller, nothing is retried here.

use async_trait::async_trait;
use thiserror::Error;

use swap_types::{QuoteRequest, QuoteResponse, SwapRequest, SwapResponse};

/// Re-export implementations
pub mod implementations {
	pub mod jupiter;
}

/// Errors that can occur during quote operations.
#[derive(Debug, Error)]
pub enum QuoteError {
	/// Transport-level failure reaching the aggregator.
	#[error("Network error: {0}")]
	Network(String),
	/// The aggregator answered with a non-success status.
	#[error("Aggregator returned {status}: {body}")]
	Api { status: u16, body: String },
	/// The response body did not match the expected shape.
	#[error("Malformed response: {0}")]
	Malformed(String),
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Trait defining the aggregator operations the pipeline depends on.
#[async_trait]
pub trait QuoteInterface: Send + Sync {
	/// Fetches a priced route for the requested pair and amount.
	async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, QuoteError>;

	/// Exchanges an accepted quote for a prebuilt, unsigned transaction.
	async fn swap_transaction(&self, request: &SwapRequest) -> Result<SwapResponse, QuoteError>;
}

/// High-level quote service wrapping an aggregator implementation.
pub struct QuoteService {
	provider: Box<dyn QuoteInterface>,
}

impl QuoteService {
	pub fn new(provider: Box<dyn QuoteInterface>) -> Self {
		Self { provider }
	}

	pub async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, QuoteError> {
		self.provider.quote(request).await
	}

	pub async fn swap_transaction(
		&self,
		request: &SwapRequest,
	) -> Result<SwapResponse, QuoteError> {
		self.provider.swap_transaction(request).await
	}
}
