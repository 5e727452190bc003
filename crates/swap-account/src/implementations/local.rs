//! Local keypair implementation of the account interface.
//!
//! Holds an ed25519 signing key in memory, parsed from the base58 keypair
//! string wallets export. Suitable for a single-operator CLI; key custody
//! beyond that is out of scope.

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey, SECRET_KEY_LENGTH};

use swap_types::{ConfigSchema, Field, FieldType, Pubkey, Schema, Signature, ValidationError};

use crate::{AccountError, AccountInterface};

/// Length of the full keypair encoding: 32-byte seed followed by the
/// 32-byte public key.
const KEYPAIR_LENGTH: usize = 64;

/// Local ed25519 keypair signer.
pub struct LocalKeypair {
	signing_key: SigningKey,
}

impl LocalKeypair {
	/// Parses a base58-encoded keypair string.
	///
	/// Accepts the 64-byte seed-plus-pubkey form wallets export, or a bare
	/// 32-byte seed. For the 64-byte form the embedded public key must
	/// match the one derived from the seed.
	pub fn from_base58(encoded: &str) -> Result<Self, AccountError> {
		let bytes = bs58::decode(encoded.trim())
			.into_vec()
			.map_err(|e| AccountError::InvalidKey(format!("Invalid base58: {}", e)))?;

		let signing_key = match bytes.len() {
			KEYPAIR_LENGTH => {
				let seed: [u8; SECRET_KEY_LENGTH] = bytes[..SECRET_KEY_LENGTH]
					.try_into()
					.expect("slice length checked");
				let signing_key = SigningKey::from_bytes(&seed);
				if signing_key.verifying_key().as_bytes() != &bytes[SECRET_KEY_LENGTH..] {
					return Err(AccountError::InvalidKey(
						"Public half does not match seed".to_string(),
					));
				}
				signing_key
			}
			SECRET_KEY_LENGTH => {
				let seed: [u8; SECRET_KEY_LENGTH] =
					bytes.as_slice().try_into().expect("slice length checked");
				SigningKey::from_bytes(&seed)
			}
			other => {
				return Err(AccountError::InvalidKey(format!(
					"Keypair must be {} or {} bytes, got {}",
					SECRET_KEY_LENGTH, KEYPAIR_LENGTH, other
				)))
			}
		};

		Ok(Self { signing_key })
	}

	fn derived_pubkey(&self) -> Pubkey {
		Pubkey(*self.signing_key.verifying_key().as_bytes())
	}
}

/// Configuration schema for the local keypair signer.
pub struct LocalKeypairSchema;

impl ConfigSchema for LocalKeypairSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("private_key", FieldType::String).with_validator(|value| {
					let key = value.as_str().unwrap();
					let decoded = bs58::decode(key.trim())
						.into_vec()
						.map_err(|e| format!("Private key must be base58: {}", e))?;
					if decoded.len() != SECRET_KEY_LENGTH && decoded.len() != KEYPAIR_LENGTH {
						return Err(format!(
							"Private key must decode to {} or {} bytes",
							SECRET_KEY_LENGTH, KEYPAIR_LENGTH
						));
					}
					Ok(())
				}),
			],
			vec![],
		);

		schema.validate(config)
	}
}

#[async_trait]
impl AccountInterface for LocalKeypair {
	async fn pubkey(&self) -> Result<Pubkey, AccountError> {
		Ok(self.derived_pubkey())
	}

	async fn sign_message(&self, message: &[u8]) -> Result<Signature, AccountError> {
		let signature = self.signing_key.sign(message);
		Ok(Signature(signature.to_bytes()))
	}
}

/// Factory function to create a local keypair signer from configuration.
///
/// Validates the config against [`LocalKeypairSchema`] before parsing the
/// `private_key` field.
pub fn create_local_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	LocalKeypairSchema
		.validate(config)
		.map_err(|e| AccountError::Config(e.to_string()))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.ok_or_else(|| AccountError::Config("private_key is required".to_string()))?;

	Ok(Box::new(LocalKeypair::from_base58(private_key)?))
}
