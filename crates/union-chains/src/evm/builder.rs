//! Canonical unsigned EIP-1559 transaction construction.

use super::intent::TransactionIntent;
use alloy::consensus::{SignableTransaction, TxEip1559};
use alloy::primitives::{TxKind, B256};

/// An EIP-1559 transaction ready for external signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
	pub tx: TxEip1559,
	/// Keccak digest of the typed signing payload.
	pub signing_hash: B256,
}

impl UnsignedTransaction {
	/// The digest a signer must sign, `0x` hex.
	pub fn digest_hex(&self) -> String {
		format!("0x{}", hex::encode(self.signing_hash))
	}
}

/// Builds the unsigned transaction for an intent. Same intent, same bytes.
pub fn build_unsigned(intent: &TransactionIntent) -> UnsignedTransaction {
	let call = intent.resolve();
	let tx = TxEip1559 {
		chain_id: intent.chain_id,
		nonce: intent.nonce,
		gas_limit: intent.gas_limit,
		max_fee_per_gas: intent.max_fee_per_gas,
		max_priority_fee_per_gas: intent.max_priority_fee_per_gas,
		to: TxKind::Call(call.to),
		value: call.value,
		access_list: Default::default(),
		input: call.input,
	};
	let signing_hash = tx.signature_hash();

	UnsignedTransaction { tx, signing_hash }
}
