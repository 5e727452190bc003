//! Account-related types for the swap pipeline.
//!
//! This module defines the public key and signature types used for signing
//! and submitting transactions, along with the mint constants the pipeline
//! needs to express SOL-denominated swaps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The mint address of wrapped SOL. Swaps paid in native SOL route
/// through this mint.
pub const WRAPPED_SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Errors that can occur when parsing account material.
#[derive(Debug, Error)]
pub enum ParsePubkeyError {
	/// The string was not valid base58.
	#[error("Invalid base58: {0}")]
	InvalidBase58(String),
	/// The decoded key had the wrong length.
	#[error("Invalid key length: expected 32 bytes, got {0}")]
	InvalidLength(usize),
}

/// An ed25519 public key identifying an on-chain account.
///
/// Stored as raw bytes; displayed and serialized in the base58 form the
/// network APIs expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pubkey(pub [u8; 32]);

impl Pubkey {
	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}
}

impl fmt::Display for Pubkey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&bs58::encode(self.0).into_string())
	}
}

impl FromStr for Pubkey {
	type Err = ParsePubkeyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let bytes = bs58::decode(s)
			.into_vec()
			.map_err(|e| ParsePubkeyError::InvalidBase58(e.to_string()))?;
		let bytes: [u8; 32] = bytes
			.as_slice()
			.try_into()
			.map_err(|_| ParsePubkeyError::InvalidLength(bytes.len()))?;
		Ok(Pubkey(bytes))
	}
}

impl Serialize for Pubkey {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for Pubkey {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

/// An ed25519 signature over a transaction message, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
	pub fn as_bytes(&self) -> &[u8; 64] {
		&self.0
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&bs58::encode(self.0).into_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pubkey_roundtrips_through_base58() {
		let key = Pubkey([7u8; 32]);
		let encoded = key.to_string();
		let decoded: Pubkey = encoded.parse().unwrap();
		assert_eq!(key, decoded);
	}

	#[test]
	fn wrapped_sol_mint_parses() {
		let mint: Pubkey = WRAPPED_SOL_MINT.parse().unwrap();
		assert_eq!(mint.to_string(), WRAPPED_SOL_MINT);
	}

	#[test]
	fn pubkey_rejects_wrong_length() {
		let short = bs58::encode([1u8; 16]).into_string();
		assert!(matches!(
			short.parse::<Pubkey>(),
			Err(ParsePubkeyError::InvalidLength(16))
		));
	}

	#[test]
	fn pubkey_rejects_invalid_base58() {
		assert!(matches!(
			"not-base58-0OIl".parse::<Pubkey>(),
			Err(ParsePubkeyError::InvalidBase58(_))
		));
	}

	#[test]
	fn pubkey_serde_uses_base58_string() {
		let key = Pubkey([9u8; 32]);
		let json = serde_json::to_string(&key).unwrap();
		assert_eq!(json, format!("\"{}\"", key));
		let back: Pubkey = serde_json::from_str(&json).unwrap();
		assert_eq!(back, key);
	}
}
