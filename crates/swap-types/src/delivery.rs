//! Transaction delivery types for the swap pipeline.
//!
//! This module defines the opaque transaction signature returned by
//! submission, the commitment levels a node understands, and the terminal
//! classification produced by the confirmation poller.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque signature identifying a submitted transaction.
///
/// Stored as the base58 string the node returns from submission; it is
/// never decoded, only echoed back into status lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionSignature(pub String);

impl fmt::Display for TransactionSignature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for TransactionSignature {
	fn from(s: &str) -> Self {
		TransactionSignature(s.to_string())
	}
}

/// How deeply the network must have settled a transaction before the node
/// reports it.
///
/// Confirmation lookups must use [`CommitmentLevel::Confirmed`] or stronger;
/// `Processed` only means a single node has seen the transaction and is
/// suitable solely as a preflight level at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentLevel {
	Processed,
	Confirmed,
	Finalized,
}

impl CommitmentLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			CommitmentLevel::Processed => "processed",
			CommitmentLevel::Confirmed => "confirmed",
			CommitmentLevel::Finalized => "finalized",
		}
	}
}

impl fmt::Display for CommitmentLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Structured status of a transaction the node has indexed.
///
/// `err == None` means the transaction executed without an on-chain error.
/// A populated `err` carries the node's error object verbatim; the poller
/// only inspects its presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatus {
	/// Slot in which the transaction was processed.
	pub slot: u64,
	/// On-chain error, if the transaction was processed but rejected.
	pub err: Option<serde_json::Value>,
}

impl TransactionStatus {
	pub fn succeeded(&self) -> bool {
		self.err.is_none()
	}
}

/// Terminal classification of a confirmation poll.
///
/// Produced exactly once per poll invocation. `Unknown` means the retry
/// budget ran out before a terminal outcome was observed; callers must
/// treat it as "not verified", never as proof of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationResult {
	/// The transaction executed with no on-chain error.
	Confirmed,
	/// The transaction was processed but rejected on chain.
	Failed,
	/// The retry budget was exhausted without a terminal observation.
	Unknown,
}

impl fmt::Display for ConfirmationResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfirmationResult::Confirmed => f.write_str("confirmed"),
			ConfirmationResult::Failed => f.write_str("failed"),
			ConfirmationResult::Unknown => f.write_str("unknown"),
		}
	}
}

/// Outcome of a single status lookup inside the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
	/// The lookup itself failed (transport error, not yet indexed,
	/// malformed response). Consumes an attempt and retries.
	LookupFailed,
	/// The lookup succeeded and reported no on-chain error.
	NoErrorObserved,
	/// The lookup succeeded and reported an on-chain error.
	ErrorObserved,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn commitment_serializes_lowercase() {
		assert_eq!(
			serde_json::to_string(&CommitmentLevel::Confirmed).unwrap(),
			"\"confirmed\""
		);
		let level: CommitmentLevel = serde_json::from_str("\"finalized\"").unwrap();
		assert_eq!(level, CommitmentLevel::Finalized);
	}

	#[test]
	fn status_success_is_absence_of_error() {
		let ok = TransactionStatus { slot: 42, err: None };
		assert!(ok.succeeded());

		let failed = TransactionStatus {
			slot: 42,
			err: Some(serde_json::json!({"InstructionError": [2, "Custom"]})),
		};
		assert!(!failed.succeeded());
	}
}
