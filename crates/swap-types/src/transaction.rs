//! Minimal wire handling for prebuilt transactions.
//!
//! The aggregator returns a fully built transaction whose signature section
//! is zero-filled. Only enough of the wire format is modeled here to split
//! that section from the message, sign the message, and reassemble: a
//! compact-u16 signature count, `count * 64` signature bytes, then the
//! message bytes.

use thiserror::Error;

use crate::account::Signature;

/// Length of an ed25519 signature on the wire.
pub const SIGNATURE_LENGTH: usize = 64;

/// Errors that can occur while splitting or reassembling a transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
	/// The byte stream ended before the declared content.
	#[error("Transaction truncated: expected {expected} more bytes, got {remaining}")]
	Truncated { expected: usize, remaining: usize },
	/// The compact-u16 length prefix was malformed.
	#[error("Malformed length prefix")]
	MalformedLength,
	/// The transaction declares no signature slots to fill.
	#[error("Transaction has no signature slots")]
	NoSignatureSlots,
}

/// A deserialized transaction split into signature slots and message.
///
/// The message bytes are exactly what the fee payer signs; they are carried
/// opaque and unmodified.
#[derive(Debug, Clone)]
pub struct TransactionEnvelope {
	signature_slots: usize,
	message: Vec<u8>,
}

impl TransactionEnvelope {
	/// Splits a serialized transaction into its signature section and
	/// message. Any signatures already present are discarded; the slots
	/// are re-filled at signing time.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, EnvelopeError> {
		let (slots, prefix_len) = decode_compact_u16(bytes)?;
		if slots == 0 {
			return Err(EnvelopeError::NoSignatureSlots);
		}
		let sig_section = slots * SIGNATURE_LENGTH;
		let body = &bytes[prefix_len..];
		if body.len() < sig_section {
			return Err(EnvelopeError::Truncated {
				expected: sig_section,
				remaining: body.len(),
			});
		}
		Ok(Self {
			signature_slots: slots,
			message: body[sig_section..].to_vec(),
		})
	}

	/// The message bytes to be signed by the fee payer.
	pub fn message(&self) -> &[u8] {
		&self.message
	}

	/// Number of signature slots the transaction declares.
	pub fn signature_slots(&self) -> usize {
		self.signature_slots
	}

	/// Reassembles the wire form with `signature` in the fee-payer slot.
	/// Remaining slots stay zero-filled, preserving the declared count.
	pub fn into_signed(self, signature: &Signature) -> Vec<u8> {
		let mut wire =
			Vec::with_capacity(3 + self.signature_slots * SIGNATURE_LENGTH + self.message.len());
		encode_compact_u16(self.signature_slots, &mut wire);
		wire.extend_from_slice(signature.as_bytes());
		wire.resize(wire.len() + (self.signature_slots - 1) * SIGNATURE_LENGTH, 0);
		wire.extend_from_slice(&self.message);
		wire
	}
}

/// Decodes a compact-u16 length prefix, returning the value and the number
/// of prefix bytes consumed. At most three bytes encode 16 bits, seven bits
/// per byte with a continuation flag.
fn decode_compact_u16(bytes: &[u8]) -> Result<(usize, usize), EnvelopeError> {
	let mut value: usize = 0;
	for (i, &byte) in bytes.iter().take(3).enumerate() {
		value |= ((byte & 0x7f) as usize) << (7 * i);
		if byte & 0x80 == 0 {
			if value > u16::MAX as usize {
				return Err(EnvelopeError::MalformedLength);
			}
			return Ok((value, i + 1));
		}
	}
	Err(EnvelopeError::MalformedLength)
}

fn encode_compact_u16(mut value: usize, out: &mut Vec<u8>) {
	loop {
		let mut byte = (value & 0x7f) as u8;
		value >>= 7;
		if value != 0 {
			byte |= 0x80;
		}
		out.push(byte);
		if value == 0 {
			break;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn unsigned_wire(slots: usize, message: &[u8]) -> Vec<u8> {
		let mut wire = Vec::new();
		encode_compact_u16(slots, &mut wire);
		wire.resize(wire.len() + slots * SIGNATURE_LENGTH, 0);
		wire.extend_from_slice(message);
		wire
	}

	#[test]
	fn compact_u16_roundtrips() {
		for value in [0usize, 1, 2, 127, 128, 255, 16_383, 16_384, 65_535] {
			let mut buf = Vec::new();
			encode_compact_u16(value, &mut buf);
			let (decoded, consumed) = decode_compact_u16(&buf).unwrap();
			assert_eq!(decoded, value);
			assert_eq!(consumed, buf.len());
		}
	}

	#[test]
	fn compact_u16_rejects_unterminated_prefix() {
		assert_eq!(
			decode_compact_u16(&[0x80, 0x80, 0x80]),
			Err(EnvelopeError::MalformedLength)
		);
		assert_eq!(decode_compact_u16(&[]), Err(EnvelopeError::MalformedLength));
	}

	#[test]
	fn splits_signatures_from_message() {
		let message = b"versioned message bytes";
		let wire = unsigned_wire(1, message);
		let envelope = TransactionEnvelope::from_bytes(&wire).unwrap();
		assert_eq!(envelope.signature_slots(), 1);
		assert_eq!(envelope.message(), message);
	}

	#[test]
	fn signing_fills_fee_payer_slot() {
		let message = b"versioned message bytes";
		let wire = unsigned_wire(1, message);
		let envelope = TransactionEnvelope::from_bytes(&wire).unwrap();

		let signature = Signature([0xab; 64]);
		let signed = envelope.into_signed(&signature);

		assert_eq!(signed[0], 1);
		assert_eq!(&signed[1..65], &[0xab; 64]);
		assert_eq!(&signed[65..], message);
	}

	#[test]
	fn extra_slots_stay_zero_filled() {
		let message = b"multi-signer message";
		let wire = unsigned_wire(2, message);
		let envelope = TransactionEnvelope::from_bytes(&wire).unwrap();

		let signature = Signature([0x11; 64]);
		let signed = envelope.into_signed(&signature);

		assert_eq!(signed[0], 2);
		assert_eq!(&signed[1..65], &[0x11; 64]);
		assert_eq!(&signed[65..129], &[0u8; 64]);
		assert_eq!(&signed[129..], message);
	}

	#[test]
	fn rejects_truncated_signature_section() {
		let mut wire = Vec::new();
		encode_compact_u16(2, &mut wire);
		wire.resize(wire.len() + SIGNATURE_LENGTH, 0);
		assert!(matches!(
			TransactionEnvelope::from_bytes(&wire),
			Err(EnvelopeError::Truncated { .. })
		));
	}

	#[test]
	fn rejects_zero_signature_slots() {
		let wire = unsigned_wire(0, b"message");
		assert!(matches!(
			TransactionEnvelope::from_bytes(&wire),
			Err(EnvelopeError::NoSignatureSlots)
		));
	}
}
