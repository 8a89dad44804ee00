//! Request and response messages for the chains-union RPC surface.
//!
//! Every request names its target chain; every response carries a
//! `ReturnCode` and a human-readable message. Failures such as an unsupported
//! chain or an adaptor fault are reported through those two fields rather than
//! through the transport.

use serde::{Deserialize, Serialize};

/// Outcome of a call as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCode {
	Success,
	#[default]
	Error,
}

/// Execution status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
	#[default]
	Unknown,
	Pending,
	Success,
	Failed,
}

/// Implemented by every request message so the dispatcher can route it.
pub trait ChainRequest {
	/// The chain identifier exactly as the caller sent it.
	fn chain(&self) -> &str;
}

/// Implemented by every response message.
pub trait RpcResponse: Default + Send + 'static {
	/// A successful response with the given message and default payload.
	fn success(msg: impl Into<String>) -> Self;
	/// An error response with the given message and default payload.
	fn failure(msg: impl Into<String>) -> Self;
	fn code(&self) -> ReturnCode;
	fn message(&self) -> &str;
}

macro_rules! chain_requests {
	($($request:ty),* $(,)?) => {
		$(
			impl ChainRequest for $request {
				fn chain(&self) -> &str {
					&self.chain
				}
			}
		)*
	};
}

macro_rules! rpc_responses {
	($($response:ty),* $(,)?) => {
		$(
			impl RpcResponse for $response {
				fn success(msg: impl Into<String>) -> Self {
					Self {
						code: ReturnCode::Success,
						msg: msg.into(),
						..Default::default()
					}
				}

				fn failure(msg: impl Into<String>) -> Self {
					Self {
						code: ReturnCode::Error,
						msg: msg.into(),
						..Default::default()
					}
				}

				fn code(&self) -> ReturnCode {
					self.code
				}

				fn message(&self) -> &str {
					&self.msg
				}
			}
		)*
	};
}

// ---------------------------------------------------------------------------
// Chain support and addresses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportChainsRequest {
	pub chain: String,
	pub network: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportChainsResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub support: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertAddressRequest {
	pub chain: String,
	pub network: String,
	/// Hex-encoded public key, with or without `0x`.
	pub public_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertAddressResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidAddressRequest {
	pub chain: String,
	pub network: String,
	pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidAddressResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub valid: bool,
}

// ---------------------------------------------------------------------------
// Blocks and headers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockNumberRequest {
	pub chain: String,
	pub height: u64,
	pub view_tx: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockHashRequest {
	pub chain: String,
	pub hash: String,
	pub view_tx: bool,
}

/// A transaction as listed inside a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTransaction {
	pub from: String,
	pub to: String,
	pub token_address: String,
	pub contract_wallet: String,
	pub hash: String,
	pub height: u64,
	pub amount: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub height: u64,
	pub hash: String,
	pub base_fee: String,
	pub transactions: Vec<BlockTransaction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockHeaderHashRequest {
	pub chain: String,
	pub network: String,
	pub hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockHeaderNumberRequest {
	pub chain: String,
	pub network: String,
	/// Zero selects the latest block.
	pub height: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockByRangeRequest {
	pub chain: String,
	pub network: String,
	/// Inclusive lower bound, decimal.
	pub start: String,
	/// Inclusive upper bound, decimal.
	pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
	pub hash: String,
	pub parent_hash: String,
	pub uncle_hash: String,
	pub coin_base: String,
	pub root: String,
	pub tx_hash: String,
	pub receipt_hash: String,
	pub parent_beacon_root: String,
	pub difficulty: String,
	pub number: String,
	pub gas_limit: u64,
	pub gas_used: u64,
	pub time: u64,
	pub extra: String,
	pub mix_digest: String,
	pub nonce: String,
	pub base_fee: String,
	pub withdrawals_hash: String,
	pub blob_gas_used: u64,
	pub excess_blob_gas: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockHeaderResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub block_header: Option<BlockHeader>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockByRangeResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub block_header: Vec<BlockHeader>,
}

// ---------------------------------------------------------------------------
// Accounts and fees
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountRequest {
	pub chain: String,
	pub network: String,
	pub address: String,
	/// Token contract; empty for the native asset.
	pub contract_address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub network: String,
	pub account_number: String,
	pub sequence: String,
	pub balance: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeRequest {
	pub chain: String,
	pub network: String,
	pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub slow_fee: String,
	pub normal_fee: String,
	pub fast_fee: String,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SendTxRequest {
	pub chain: String,
	pub network: String,
	/// Hex-encoded signed transaction.
	pub raw_tx: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendTxResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub tx_hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TxAddressRequest {
	pub chain: String,
	pub network: String,
	pub address: String,
	pub contract_address: String,
	pub page: u32,
	pub pagesize: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxMessage {
	pub hash: String,
	pub index: u32,
	pub from: String,
	pub to: String,
	pub value: String,
	pub fee: String,
	pub status: TxStatus,
	#[serde(rename = "type")]
	pub tx_type: i32,
	pub height: String,
	pub contract_address: String,
	pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxAddressResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub tx: Vec<TxMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TxHashRequest {
	pub chain: String,
	pub network: String,
	pub hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxHashResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub tx: Option<TxMessage>,
}

// ---------------------------------------------------------------------------
// Transaction building
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsignTransactionRequest {
	pub chain: String,
	pub network: String,
	/// Base64-encoded JSON transaction intent.
	pub base64_tx: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnsignTransactionResponse {
	pub code: ReturnCode,
	pub msg: String,
	/// Signing digest the caller must sign, `0x` hex.
	pub un_sign_tx: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignedTransactionRequest {
	pub chain: String,
	pub network: String,
	/// The same intent that produced the unsigned transaction.
	pub base64_tx: String,
	/// Hex-encoded 65-byte `r || s || v` signature.
	pub signature: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignedTransactionResponse {
	pub code: ReturnCode,
	pub msg: String,
	/// Broadcast-ready raw transaction, `0x` hex.
	pub signed_tx: String,
	pub tx_hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeTransactionRequest {
	pub chain: String,
	pub network: String,
	/// Hex-encoded signed transaction.
	pub raw_tx: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeTransactionResponse {
	pub code: ReturnCode,
	pub msg: String,
	/// Base64-encoded JSON transaction intent recovered from the raw transaction.
	pub base64_tx: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyTransactionRequest {
	pub chain: String,
	pub network: String,
	/// Hex-encoded signed transaction.
	pub signed_tx: String,
	/// Address expected to have signed the transaction.
	pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyTransactionResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub verify: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraDataRequest {
	pub chain: String,
	pub network: String,
	pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtraDataResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub value: String,
}

// ---------------------------------------------------------------------------
// Collectibles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NftAddressRequest {
	pub chain: String,
	pub network: String,
	pub address: String,
	pub page: u32,
	pub pagesize: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NftCollectionRequest {
	pub chain: String,
	pub network: String,
	pub cursor: String,
	pub page_size: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NftDetailRequest {
	pub chain: String,
	pub network: String,
	pub contract_address: String,
	pub token_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NftHolderListRequest {
	pub chain: String,
	pub network: String,
	pub contract_address: String,
	pub token_id: String,
	pub page: u32,
	pub pagesize: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NftTradeHistoryRequest {
	pub chain: String,
	pub network: String,
	pub contract_address: String,
	pub token_id: String,
	pub page: u32,
	pub pagesize: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressNftTradeHistoryRequest {
	pub chain: String,
	pub network: String,
	pub address: String,
	pub page: u32,
	pub pagesize: u32,
}

/// Shared response for every collectible query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NftResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub items: Vec<serde_json::Value>,
}

chain_requests!(
	SupportChainsRequest,
	ConvertAddressRequest,
	ValidAddressRequest,
	BlockNumberRequest,
	BlockHashRequest,
	BlockHeaderHashRequest,
	BlockHeaderNumberRequest,
	BlockByRangeRequest,
	AccountRequest,
	FeeRequest,
	SendTxRequest,
	TxAddressRequest,
	TxHashRequest,
	UnsignTransactionRequest,
	SignedTransactionRequest,
	DecodeTransactionRequest,
	VerifyTransactionRequest,
	ExtraDataRequest,
	NftAddressRequest,
	NftCollectionRequest,
	NftDetailRequest,
	NftHolderListRequest,
	NftTradeHistoryRequest,
	AddressNftTradeHistoryRequest,
);

rpc_responses!(
	SupportChainsResponse,
	ConvertAddressResponse,
	ValidAddressResponse,
	BlockResponse,
	BlockHeaderResponse,
	BlockByRangeResponse,
	AccountResponse,
	FeeResponse,
	SendTxResponse,
	TxAddressResponse,
	TxHashResponse,
	UnsignTransactionResponse,
	SignedTransactionResponse,
	DecodeTransactionResponse,
	VerifyTransactionResponse,
	ExtraDataResponse,
	NftResponse,
);
