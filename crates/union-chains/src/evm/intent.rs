//! Transaction intent decoding and classification.
//!
//! Wallet layers describe a transfer as a base64-encoded JSON document. This
//! module turns that document into a typed `TransactionIntent`, decides
//! whether it moves the native asset or calls a token contract, and resolves
//! the concrete call (target, value, call data) the transaction will carry.
//! Everything here is pure: no node access, no clock.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use union_types::AdaptorError;

sol! {
	/// The subset of the ERC-20 interface used for token transfers.
	interface IERC20 {
		function transfer(address to, uint256 amount) external returns (bool);
	}
}

/// Errors produced while decoding an intent.
#[derive(Error, Debug)]
pub enum IntentError {
	#[error("invalid base64 transaction: {0}")]
	Encoding(#[from] base64::DecodeError),

	#[error("invalid transaction json: {0}")]
	Structure(#[from] serde_json::Error),

	#[error("invalid {field}: {value:?}")]
	InvalidNumeric { field: &'static str, value: String },

	#[error("invalid {field}: {value:?}")]
	InvalidAddress { field: &'static str, value: String },
}

impl From<IntentError> for AdaptorError {
	fn from(err: IntentError) -> Self {
		AdaptorError::InvalidArgument(err.to_string())
	}
}

/// Wire form of an intent, as carried inside the base64 payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDocument {
	#[serde(alias = "chainId")]
	pub chain_id: String,
	pub nonce: u64,
	#[serde(alias = "fromAddress")]
	pub from_address: String,
	#[serde(alias = "toAddress")]
	pub to_address: String,
	pub amount: String,
	#[serde(alias = "maxFeePerGas")]
	pub max_fee_per_gas: String,
	#[serde(alias = "maxPriorityFeePerGas")]
	pub max_priority_fee_per_gas: String,
	#[serde(alias = "gasLimit")]
	pub gas_limit: u64,
	#[serde(default, alias = "contractAddress", skip_serializing_if = "Option::is_none")]
	pub contract_address: Option<String>,
}

/// What a transaction moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
	Native,
	ContractCall { token: Address },
}

/// A fully typed transfer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
	pub chain_id: u64,
	pub nonce: u64,
	pub from: Address,
	pub to: Address,
	pub amount: U256,
	pub max_fee_per_gas: u128,
	pub max_priority_fee_per_gas: u128,
	pub gas_limit: u64,
	pub kind: TransferKind,
}

/// The call a transaction actually carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCall {
	pub to: Address,
	pub value: U256,
	pub input: Bytes,
}

/// Decodes a base64 JSON intent into its typed form.
pub fn decode_intent(encoded: &str) -> Result<TransactionIntent, IntentError> {
	let json = STANDARD.decode(encoded.trim())?;
	let document: IntentDocument = serde_json::from_slice(&json)?;
	TransactionIntent::try_from(&document)
}

impl TryFrom<&IntentDocument> for TransactionIntent {
	type Error = IntentError;

	fn try_from(doc: &IntentDocument) -> Result<Self, Self::Error> {
		Ok(Self {
			chain_id: parse_u64("chain_id", &doc.chain_id)?,
			nonce: doc.nonce,
			from: parse_address("from_address", &doc.from_address)?,
			to: parse_address("to_address", &doc.to_address)?,
			amount: parse_u256("amount", &doc.amount)?,
			max_fee_per_gas: parse_u128("max_fee_per_gas", &doc.max_fee_per_gas)?,
			max_priority_fee_per_gas: parse_u128(
				"max_priority_fee_per_gas",
				&doc.max_priority_fee_per_gas,
			)?,
			gas_limit: doc.gas_limit,
			kind: classify(doc.contract_address.as_deref())?,
		})
	}
}

impl TransactionIntent {
	/// Target, value and call data for this intent.
	pub fn resolve(&self) -> ResolvedCall {
		match self.kind {
			TransferKind::Native => ResolvedCall {
				to: self.to,
				value: self.amount,
				input: Bytes::new(),
			},
			TransferKind::ContractCall { token } => ResolvedCall {
				to: token,
				value: U256::ZERO,
				input: transfer_call_data(self.to, self.amount),
			},
		}
	}

	pub fn to_document(&self) -> IntentDocument {
		IntentDocument {
			chain_id: self.chain_id.to_string(),
			nonce: self.nonce,
			from_address: self.from.to_checksum(None),
			to_address: self.to.to_checksum(None),
			amount: self.amount.to_string(),
			max_fee_per_gas: self.max_fee_per_gas.to_string(),
			max_priority_fee_per_gas: self.max_priority_fee_per_gas.to_string(),
			gas_limit: self.gas_limit,
			contract_address: match self.kind {
				TransferKind::Native => None,
				TransferKind::ContractCall { token } => Some(token.to_checksum(None)),
			},
		}
	}

	/// Encodes the intent back into its base64 JSON wire form.
	pub fn encode(&self) -> Result<String, IntentError> {
		let json = serde_json::to_vec(&self.to_document())?;
		Ok(STANDARD.encode(json))
	}
}

/// True when a contract-address field designates the native asset.
///
/// Empty strings and `0x`-prefixed runs of zeros (the zero address, or the
/// short `0x00` form some wallets send) all count as native.
pub fn is_native_marker(contract_address: &str) -> bool {
	let value = contract_address.trim();
	if value.is_empty() {
		return true;
	}
	match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
		Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b == b'0'),
		None => false,
	}
}

fn classify(contract_address: Option<&str>) -> Result<TransferKind, IntentError> {
	match contract_address {
		None => Ok(TransferKind::Native),
		Some(value) if is_native_marker(value) => Ok(TransferKind::Native),
		Some(value) => Ok(TransferKind::ContractCall {
			token: parse_address("contract_address", value)?,
		}),
	}
}

/// ABI call data for `transfer(to, amount)`.
pub fn transfer_call_data(to: Address, amount: U256) -> Bytes {
	IERC20::transferCall { to, amount }.abi_encode().into()
}

/// Decodes `transfer(address,uint256)` call data into recipient and amount.
pub fn decode_transfer_call(input: &[u8]) -> Option<(Address, U256)> {
	if !input.starts_with(&IERC20::transferCall::SELECTOR) {
		return None;
	}
	IERC20::transferCall::abi_decode(input)
		.ok()
		.map(|call| (call.to, call.amount))
}

fn decimal_digits<'a>(field: &'static str, value: &'a str) -> Result<&'a str, IntentError> {
	if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
		return Err(IntentError::InvalidNumeric {
			field,
			value: value.to_string(),
		});
	}
	Ok(value)
}

fn parse_u64(field: &'static str, value: &str) -> Result<u64, IntentError> {
	decimal_digits(field, value)?
		.parse()
		.map_err(|_| IntentError::InvalidNumeric {
			field,
			value: value.to_string(),
		})
}

fn parse_u128(field: &'static str, value: &str) -> Result<u128, IntentError> {
	decimal_digits(field, value)?
		.parse()
		.map_err(|_| IntentError::InvalidNumeric {
			field,
			value: value.to_string(),
		})
}

fn parse_u256(field: &'static str, value: &str) -> Result<U256, IntentError> {
	U256::from_str_radix(decimal_digits(field, value)?, 10).map_err(|_| {
		IntentError::InvalidNumeric {
			field,
			value: value.to_string(),
		}
	})
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, IntentError> {
	value
		.trim()
		.parse::<Address>()
		.map_err(|_| IntentError::InvalidAddress {
			field,
			value: value.to_string(),
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::address;
	use serde_json::json;

	const FROM: &str = "0x82565b64e8420b6e4a9e4d2c0b4e8d71a6d1e4c5";
	const TO: &str = "0x35096AD62E57e86032a3Bb35aDaCF2240d55421D";
	const TOKEN: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

	fn encode(value: serde_json::Value) -> String {
		STANDARD.encode(value.to_string())
	}

	fn document(contract: Option<&str>) -> serde_json::Value {
		let mut doc = json!({
			"chain_id": "1",
			"nonce": 7,
			"from_address": FROM,
			"to_address": TO,
			"amount": "1000000000000000000",
			"max_fee_per_gas": "30000000000",
			"max_priority_fee_per_gas": "1500000000",
			"gas_limit": 21000,
		});
		if let Some(contract) = contract {
			doc["contract_address"] = json!(contract);
		}
		doc
	}

	#[test]
	fn test_native_when_contract_absent_or_zero() {
		for contract in [
			None,
			Some(""),
			Some("0x00"),
			Some("0x0000000000000000000000000000000000000000"),
		] {
			let intent = decode_intent(&encode(document(contract))).unwrap();
			assert_eq!(intent.kind, TransferKind::Native, "contract {:?}", contract);

			let call = intent.resolve();
			assert_eq!(call.to, TO.parse::<Address>().unwrap());
			assert_eq!(call.value, U256::from(1_000_000_000_000_000_000u128));
			assert!(call.input.is_empty());
		}
	}

	#[test]
	fn test_contract_call_resolution() {
		let intent = decode_intent(&encode(document(Some(TOKEN)))).unwrap();
		let token = address!("dAC17F958D2ee523a2206206994597C13D831ec7");
		assert_eq!(intent.kind, TransferKind::ContractCall { token });

		let call = intent.resolve();
		assert_eq!(call.to, token);
		assert_eq!(call.value, U256::ZERO);
		assert_eq!(call.input.len(), 68);
		assert_eq!(&call.input[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
		assert_eq!(&call.input[16..36], intent.to.as_slice());

		let (recipient, amount) = decode_transfer_call(&call.input).unwrap();
		assert_eq!(recipient, intent.to);
		assert_eq!(amount, intent.amount);
	}

	#[test]
	fn test_camel_case_aliases() {
		let doc = json!({
			"chainId": "137",
			"nonce": 0,
			"fromAddress": FROM,
			"toAddress": TO,
			"amount": "5",
			"maxFeePerGas": "2",
			"maxPriorityFeePerGas": "1",
			"gasLimit": 60000,
			"contractAddress": TOKEN,
		});
		let intent = decode_intent(&encode(doc)).unwrap();
		assert_eq!(intent.chain_id, 137);
		assert_eq!(intent.gas_limit, 60000);
		assert!(matches!(intent.kind, TransferKind::ContractCall { .. }));
	}

	#[test]
	fn test_bad_base64() {
		assert!(matches!(
			decode_intent("not base64!!"),
			Err(IntentError::Encoding(_))
		));
	}

	#[test]
	fn test_bad_json() {
		assert!(matches!(
			decode_intent(&STANDARD.encode("{\"chain_id\": 1")),
			Err(IntentError::Structure(_))
		));

		// missing required field
		let mut doc = document(None);
		doc.as_object_mut().unwrap().remove("nonce");
		assert!(matches!(
			decode_intent(&encode(doc)),
			Err(IntentError::Structure(_))
		));
	}

	#[test]
	fn test_invalid_numeric_fields() {
		for (field, value) in [
			("chain_id", "one"),
			("amount", "-5"),
			("amount", ""),
			("max_fee_per_gas", "0x10"),
			("max_priority_fee_per_gas", "1.5"),
		] {
			let mut doc = document(None);
			doc[field] = json!(value);
			match decode_intent(&encode(doc)) {
				Err(IntentError::InvalidNumeric { field: f, .. }) => assert_eq!(f, field),
				other => panic!("expected numeric error for {}, got {:?}", field, other),
			}
		}
	}

	#[test]
	fn test_invalid_addresses() {
		let mut doc = document(None);
		doc["to_address"] = json!("0x1234");
		assert!(matches!(
			decode_intent(&encode(doc)),
			Err(IntentError::InvalidAddress { field: "to_address", .. })
		));

		assert!(matches!(
			decode_intent(&encode(document(Some("0xnot-a-token")))),
			Err(IntentError::InvalidAddress { field: "contract_address", .. })
		));
	}

	#[test]
	fn test_encode_decode_intent() {
		let intent = decode_intent(&encode(document(Some(TOKEN)))).unwrap();
		let again = decode_intent(&intent.encode().unwrap()).unwrap();
		assert_eq!(intent, again);
	}

	#[test]
	fn test_native_marker() {
		assert!(is_native_marker("  "));
		assert!(is_native_marker("0x0"));
		assert!(!is_native_marker("0x"));
		assert!(!is_native_marker("0x01"));
		assert!(!is_native_marker("00"));
	}

	#[test]
	fn test_decode_transfer_rejects_other_selectors() {
		assert!(decode_transfer_call(&[0x09, 0x5e, 0xa7, 0xb3]).is_none());
		assert!(decode_transfer_call(&[]).is_none());
	}
}
