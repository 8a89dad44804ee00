//! Signed transaction assembly and inspection.
//!
//! A caller signs the digest produced by the builder elsewhere and hands the
//! 65-byte signature back. Assembly attaches it to the same unsigned
//! transaction, recovers the signer from the signing digest, and only returns
//! the broadcast-ready bytes when that signer is the declared sender.

use super::builder::UnsignedTransaction;
use super::intent::{decode_transfer_call, TransactionIntent, TransferKind};
use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy::eips::eip2718::{Decodable2718, Encodable2718};
use alloy::primitives::{uint, Address, Bytes, Signature, TxKind, B256, U256};
use thiserror::Error;
use tracing::warn;
use union_types::AdaptorError;

/// Half the secp256k1 group order. Signatures with a larger `s` are malleable.
const SECP256K1N_HALF: U256 =
	uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

#[derive(Error, Debug)]
pub enum VerificationError {
	#[error("invalid signature: {0}")]
	BadSignature(String),

	#[error("recover sender failed: {0}")]
	Recovery(String),

	#[error("sender address mismatch: expected {expected}, got {got}")]
	SenderMismatch { expected: Address, got: Address },

	#[error("invalid raw transaction: {0}")]
	MalformedTransaction(String),
}

impl From<VerificationError> for AdaptorError {
	fn from(err: VerificationError) -> Self {
		match err {
			VerificationError::SenderMismatch { expected, got } => AdaptorError::SenderMismatch {
				expected: expected.to_checksum(None),
				got: got.to_checksum(None),
			},
			other => AdaptorError::InvalidArgument(other.to_string()),
		}
	}
}

/// A signed transaction whose signer matched the declared sender.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
	/// EIP-2718 encoded envelope.
	pub raw: Bytes,
	pub tx_hash: B256,
	pub signer: Address,
}

impl SignedTransaction {
	pub fn raw_hex(&self) -> String {
		format!("0x{}", hex::encode(&self.raw))
	}

	pub fn hash_hex(&self) -> String {
		format!("0x{}", hex::encode(self.tx_hash))
	}
}

/// Parses a hex `r || s || v` signature. `v` may be 0/1 or 27/28.
pub fn parse_signature(signature_hex: &str) -> Result<Signature, VerificationError> {
	let bytes = hex::decode(strip_hex_prefix(signature_hex))
		.map_err(|e| VerificationError::BadSignature(e.to_string()))?;

	if bytes.len() != 65 {
		return Err(VerificationError::BadSignature(format!(
			"expected 65 bytes, got {}",
			bytes.len()
		)));
	}

	let y_parity = match bytes[64] {
		0 | 27 => false,
		1 | 28 => true,
		v => {
			return Err(VerificationError::BadSignature(format!(
				"invalid recovery id {}",
				v
			)))
		}
	};

	let signature = Signature::new(
		U256::from_be_slice(&bytes[..32]),
		U256::from_be_slice(&bytes[32..64]),
		y_parity,
	);
	ensure_low_s(&signature)?;
	Ok(signature)
}

/// Rejects signatures whose `s` lies in the upper half of the curve order (EIP-2).
fn ensure_low_s(signature: &Signature) -> Result<(), VerificationError> {
	if signature.s() > SECP256K1N_HALF {
		return Err(VerificationError::BadSignature(
			"s value is not in the lower half of the curve order".to_string(),
		));
	}
	Ok(())
}

/// Attaches a signature to an unsigned transaction and checks its signer.
pub fn assemble_signed(
	unsigned: &UnsignedTransaction,
	signature_hex: &str,
	declared_from: Address,
) -> Result<SignedTransaction, VerificationError> {
	let signature = parse_signature(signature_hex)?;

	let signer = signature
		.recover_address_from_prehash(&unsigned.signing_hash)
		.map_err(|e| VerificationError::Recovery(e.to_string()))?;

	if signer != declared_from {
		warn!(expected = %declared_from, got = %signer, "Signer does not match declared sender");
		return Err(VerificationError::SenderMismatch {
			expected: declared_from,
			got: signer,
		});
	}

	let signed = unsigned.tx.clone().into_signed(signature);
	let tx_hash = *signed.hash();
	let raw = TxEnvelope::from(signed).encoded_2718();

	Ok(SignedTransaction {
		raw: raw.into(),
		tx_hash,
		signer,
	})
}

/// A signed EIP-1559 transaction parsed from its raw bytes.
#[derive(Debug, Clone)]
pub struct DecodedTransaction {
	pub tx: TxEip1559,
	pub tx_hash: B256,
	pub signer: Address,
}

/// Parses a raw `0x` hex EIP-1559 envelope and recovers its signer.
pub fn decode_signed(raw_hex: &str) -> Result<DecodedTransaction, VerificationError> {
	let bytes = hex::decode(strip_hex_prefix(raw_hex))
		.map_err(|e| VerificationError::MalformedTransaction(e.to_string()))?;

	let envelope = TxEnvelope::decode_2718(&mut bytes.as_slice())
		.map_err(|e| VerificationError::MalformedTransaction(e.to_string()))?;

	let signed = match envelope {
		TxEnvelope::Eip1559(signed) => signed,
		_ => {
			return Err(VerificationError::MalformedTransaction(
				"only EIP-1559 transactions are supported".to_string(),
			))
		}
	};

	ensure_low_s(signed.signature())?;

	let signer = signed
		.signature()
		.recover_address_from_prehash(&signed.tx().signature_hash())
		.map_err(|e| VerificationError::Recovery(e.to_string()))?;

	Ok(DecodedTransaction {
		tx: signed.tx().clone(),
		tx_hash: *signed.hash(),
		signer,
	})
}

impl DecodedTransaction {
	/// Re-derives the transfer intent the transaction was built from.
	pub fn intent(&self) -> Result<TransactionIntent, VerificationError> {
		let target = match self.tx.to {
			TxKind::Call(address) => address,
			TxKind::Create => {
				return Err(VerificationError::MalformedTransaction(
					"contract creation is not a transfer".to_string(),
				))
			}
		};

		let (to, amount, kind) = if self.tx.input.is_empty() {
			(target, self.tx.value, TransferKind::Native)
		} else {
			match decode_transfer_call(&self.tx.input) {
				Some((recipient, amount)) if self.tx.value.is_zero() => (
					recipient,
					amount,
					TransferKind::ContractCall { token: target },
				),
				_ => {
					return Err(VerificationError::MalformedTransaction(
						"call data is not a token transfer".to_string(),
					))
				}
			}
		};

		Ok(TransactionIntent {
			chain_id: self.tx.chain_id,
			nonce: self.tx.nonce,
			from: self.signer,
			to,
			amount,
			max_fee_per_gas: self.tx.max_fee_per_gas,
			max_priority_fee_per_gas: self.tx.max_priority_fee_per_gas,
			gas_limit: self.tx.gas_limit,
			kind,
		})
	}
}

fn strip_hex_prefix(value: &str) -> &str {
	let value = value.trim();
	value
		.strip_prefix("0x")
		.or_else(|| value.strip_prefix("0X"))
		.unwrap_or(value)
}
