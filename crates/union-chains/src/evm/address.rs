//! Address derivation and validation.

use alloy::primitives::{keccak256, Address};
use union_types::{AdaptorError, AdaptorResult};

/// Derives the account address of a secp256k1 public key.
///
/// Accepts a 65-byte uncompressed key (`04` prefix) or the raw 64-byte form,
/// hex-encoded with or without `0x`.
pub fn public_key_to_address(public_key: &str) -> AdaptorResult<Address> {
	let trimmed = public_key.trim();
	let bytes = hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
		.map_err(|e| AdaptorError::InvalidArgument(format!("invalid public key: {}", e)))?;

	let raw = match bytes.len() {
		65 if bytes[0] == 0x04 => &bytes[1..],
		64 => &bytes[..],
		len => {
			return Err(AdaptorError::InvalidArgument(format!(
				"invalid public key length {}",
				len
			)))
		}
	};

	Ok(Address::from_slice(&keccak256(raw)[12..]))
}

/// `0x` followed by exactly 40 hex digits. Checksums are not enforced.
pub fn is_valid_address(address: &str) -> bool {
	address.len() == 42
		&& address.starts_with("0x")
		&& address[2..].bytes().all(|b| b.is_ascii_hexdigit())
}
