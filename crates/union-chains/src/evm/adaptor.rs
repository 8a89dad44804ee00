//! `ChainAdaptor` implementation for EVM networks.

use super::address::{is_valid_address, public_key_to_address};
use super::builder::build_unsigned;
use super::client::{ClientError, EvmBlock, EvmClient, EvmHeader};
use super::data::{ChainDataClient, HistoryEntry, HistoryKind};
use super::intent::{decode_intent, decode_transfer_call, is_native_marker, TransactionIntent};
use super::signed::{assemble_signed, decode_signed};
use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};
use union_types::*;

/// Largest number of headers a single range query may return.
pub const MAX_HEADER_RANGE: u64 = 100;

/// Adaptor for one EVM network.
///
/// The same type serves every EVM chain; the chain name and the expected
/// numeric chain id are fixed at construction.
pub struct EvmChainAdaptor {
	chain: String,
	client: Arc<dyn EvmClient>,
	data: Arc<dyn ChainDataClient>,
	expected_chain_id: Option<u64>,
}

impl EvmChainAdaptor {
	pub fn new(
		chain: impl Into<String>,
		client: Arc<dyn EvmClient>,
		data: Arc<dyn ChainDataClient>,
	) -> Self {
		Self {
			chain: normalize_chain(&chain.into()),
			client,
			data,
			expected_chain_id: None,
		}
	}

	/// Rejects intents addressed to any other chain id.
	pub fn with_chain_id(mut self, chain_id: u64) -> Self {
		self.expected_chain_id = Some(chain_id);
		self
	}

	fn decode_checked_intent(&self, base64_tx: &str) -> AdaptorResult<TransactionIntent> {
		let intent = decode_intent(base64_tx)?;
		if let Some(expected) = self.expected_chain_id {
			if intent.chain_id != expected {
				return Err(AdaptorError::InvalidArgument(format!(
					"chain id {} does not match {} ({})",
					intent.chain_id, self.chain, expected
				)));
			}
		}
		Ok(intent)
	}

	async fn header_range(&self, req: &BlockByRangeRequest) -> AdaptorResult<Vec<BlockHeader>> {
		let start = parse_height("start", &req.start)?;
		let end = parse_height("end", &req.end)?;

		if start > end {
			return Err(AdaptorError::InvalidArgument(format!(
				"start {} is greater than end {}",
				start, end
			)));
		}
		if end - start >= MAX_HEADER_RANGE {
			return Err(AdaptorError::InvalidArgument(format!(
				"range {}..={} exceeds {} blocks",
				start, end, MAX_HEADER_RANGE
			)));
		}

		let headers = self
			.client
			.headers_by_range(start, end)
			.await
			.map_err(|e| node_error("get block range fail", e))?;

		Ok(headers.iter().map(block_header).collect())
	}
}

#[async_trait]
impl ChainAdaptor for EvmChainAdaptor {
	fn chain_name(&self) -> &str {
		&self.chain
	}

	async fn get_support_chains(
		&self,
		_req: &SupportChainsRequest,
	) -> AdaptorResult<SupportChainsResponse> {
		Ok(SupportChainsResponse {
			support: true,
			..SupportChainsResponse::success("support this chain")
		})
	}

	async fn convert_address(
		&self,
		req: &ConvertAddressRequest,
	) -> AdaptorResult<ConvertAddressResponse> {
		let address = public_key_to_address(&req.public_key)?;
		Ok(ConvertAddressResponse {
			address: address.to_checksum(None),
			..ConvertAddressResponse::success("convert address success")
		})
	}

	async fn valid_address(&self, req: &ValidAddressRequest) -> AdaptorResult<ValidAddressResponse> {
		let valid = is_valid_address(&req.address);
		let msg = if valid { "valid address" } else { "invalid address" };
		Ok(ValidAddressResponse {
			valid,
			..ValidAddressResponse::success(msg)
		})
	}

	async fn get_block_by_number(&self, req: &BlockNumberRequest) -> AdaptorResult<BlockResponse> {
		let block = self
			.client
			.block_by_number(Some(req.height))
			.await
			.map_err(|e| node_error("block by number error", e))?;
		Ok(block_response(&block, "block by number success"))
	}

	async fn get_block_by_hash(&self, req: &BlockHashRequest) -> AdaptorResult<BlockResponse> {
		let hash = parse_hash(&req.hash)?;
		let block = self
			.client
			.block_by_hash(hash)
			.await
			.map_err(|e| node_error("block by hash error", e))?;
		Ok(block_response(&block, "block by hash success"))
	}

	async fn get_block_header_by_hash(
		&self,
		req: &BlockHeaderHashRequest,
	) -> AdaptorResult<BlockHeaderResponse> {
		let hash = parse_hash(&req.hash)?;
		let header = self
			.client
			.header_by_hash(hash)
			.await
			.map_err(|e| node_error("get block header fail", e))?;
		Ok(BlockHeaderResponse {
			block_header: Some(block_header(&header)),
			..BlockHeaderResponse::success("get block header success")
		})
	}

	async fn get_block_header_by_number(
		&self,
		req: &BlockHeaderNumberRequest,
	) -> AdaptorResult<BlockHeaderResponse> {
		let number = (req.height != 0).then_some(req.height);
		let header = self
			.client
			.header_by_number(number)
			.await
			.map_err(|e| node_error("get block header fail", e))?;

		debug!(number = header.number, hash = %header.hash, "Fetched block header");

		Ok(BlockHeaderResponse {
			block_header: Some(block_header(&header)),
			..BlockHeaderResponse::success("get block header success")
		})
	}

	async fn get_block_header_by_range(
		&self,
		req: &BlockByRangeRequest,
	) -> AdaptorResult<BlockByRangeResponse> {
		Ok(BlockByRangeResponse {
			block_header: self.header_range(req).await?,
			..BlockByRangeResponse::success("get block header range success")
		})
	}

	async fn get_block_by_range(
		&self,
		req: &BlockByRangeRequest,
	) -> AdaptorResult<BlockByRangeResponse> {
		Ok(BlockByRangeResponse {
			block_header: self.header_range(req).await?,
			..BlockByRangeResponse::success("get block range success")
		})
	}

	async fn get_account(&self, req: &AccountRequest) -> AdaptorResult<AccountResponse> {
		let address = parse_address("address", &req.address)?;
		let nonce = self
			.client
			.transaction_count(address)
			.await
			.map_err(|e| node_error("get nonce by address fail", e))?;

		let token = (!is_native_marker(&req.contract_address)).then_some(req.contract_address.as_str());
		let balance = self
			.data
			.balance(&req.address, token)
			.await
			.map_err(|e| AdaptorError::upstream("get token balance fail", e))?;

		Ok(AccountResponse {
			network: req.network.clone(),
			account_number: "0".to_string(),
			sequence: nonce.to_string(),
			balance: balance.to_string(),
			..AccountResponse::success("get account response success")
		})
	}

	async fn get_fee(&self, _req: &FeeRequest) -> AdaptorResult<FeeResponse> {
		let gas_price = self
			.client
			.gas_price()
			.await
			.map_err(|e| node_error("get suggest gas price fail", e))?;
		let tip = self
			.client
			.max_priority_fee()
			.await
			.map_err(|e| node_error("get suggest gas tip fail", e))?;

		let base = format!("{}|{}", gas_price, tip);
		Ok(FeeResponse {
			slow_fee: base.clone(),
			normal_fee: format!("{}|*2", base),
			fast_fee: format!("{}|*3", base),
			..FeeResponse::success("get gas price success")
		})
	}

	async fn send_tx(&self, req: &SendTxRequest) -> AdaptorResult<SendTxResponse> {
		let raw = decode_hex("raw_tx", &req.raw_tx)?;
		let tx_hash = self
			.client
			.send_raw_transaction(&raw)
			.await
			.map_err(|e| node_error("send tx error", e))?;

		info!(chain = %self.chain, %tx_hash, "Transaction broadcast");

		Ok(SendTxResponse {
			tx_hash: format!("0x{}", hex::encode(tx_hash)),
			..SendTxResponse::success("send tx success")
		})
	}

	async fn get_tx_by_address(&self, req: &TxAddressRequest) -> AdaptorResult<TxAddressResponse> {
		let kind = if is_native_marker(&req.contract_address) {
			HistoryKind::Normal
		} else {
			HistoryKind::Token
		};

		let entries = self
			.data
			.history(&req.address, kind, req.page, req.pagesize)
			.await
			.map_err(|e| AdaptorError::upstream("get tx list fail", e))?;

		Ok(TxAddressResponse {
			tx: entries.into_iter().map(history_message).collect(),
			..TxAddressResponse::success("get tx list success")
		})
	}

	async fn get_tx_by_hash(&self, req: &TxHashRequest) -> AdaptorResult<TxHashResponse> {
		let hash = parse_hash(&req.hash)?;
		let tx = self
			.client
			.transaction_by_hash(hash)
			.await
			.map_err(|e| node_error("get transaction fail", e))?;
		let receipt = self
			.client
			.receipt_by_hash(hash)
			.await
			.map_err(|e| node_error("get transaction receipt fail", e))?;

		let (to, value, contract_address) = match tx.to {
			Some(target) => {
				let code = self
					.client
					.code_at(target)
					.await
					.map_err(|e| node_error("get account code fail", e))?;

				match decode_transfer_call(&tx.input) {
					Some((recipient, amount)) if !code.is_empty() => (
						recipient.to_checksum(None),
						amount,
						target.to_checksum(None),
					),
					_ if !code.is_empty() => (
						target.to_checksum(None),
						tx.value,
						target.to_checksum(None),
					),
					_ => (
						target.to_checksum(None),
						tx.value,
						Address::ZERO.to_checksum(None),
					),
				}
			}
			None => (String::new(), tx.value, String::new()),
		};

		let fee = U256::from(receipt.gas_used) * U256::from(receipt.effective_gas_price);
		let status = if receipt.status {
			TxStatus::Success
		} else {
			TxStatus::Failed
		};

		Ok(TxHashResponse {
			tx: Some(TxMessage {
				hash: format!("0x{}", hex::encode(tx.hash)),
				index: receipt.transaction_index.unwrap_or_default() as u32,
				from: tx.from.to_checksum(None),
				to,
				value: value.to_string(),
				fee: fee.to_string(),
				status,
				tx_type: 0,
				height: receipt
					.block_number
					.or(tx.block_number)
					.map(|n| n.to_string())
					.unwrap_or_default(),
				contract_address,
				data: format!("0x{}", hex::encode(&tx.input)),
			}),
			..TxHashResponse::success("get transaction success")
		})
	}

	async fn build_unsigned_transaction(
		&self,
		req: &UnsignTransactionRequest,
	) -> AdaptorResult<UnsignTransactionResponse> {
		let intent = self.decode_checked_intent(&req.base64_tx)?;
		let unsigned = build_unsigned(&intent);

		debug!(
			chain = %self.chain,
			nonce = intent.nonce,
			kind = ?intent.kind,
			digest = %unsigned.signing_hash,
			"Built unsigned transaction"
		);

		Ok(UnsignTransactionResponse {
			un_sign_tx: unsigned.digest_hex(),
			..UnsignTransactionResponse::success("create un sign tx success")
		})
	}

	async fn build_signed_transaction(
		&self,
		req: &SignedTransactionRequest,
	) -> AdaptorResult<SignedTransactionResponse> {
		let intent = self.decode_checked_intent(&req.base64_tx)?;
		let unsigned = build_unsigned(&intent);

		let signed = assemble_signed(&unsigned, &req.signature, intent.from).map_err(|e| {
			error!(chain = %self.chain, error = %e, "Signed transaction rejected");
			AdaptorError::from(e)
		})?;

		info!(chain = %self.chain, tx_hash = %signed.tx_hash, signer = %signed.signer, "Built signed transaction");

		Ok(SignedTransactionResponse {
			signed_tx: signed.raw_hex(),
			tx_hash: signed.hash_hex(),
			..SignedTransactionResponse::success("create signed tx success")
		})
	}

	async fn decode_transaction(
		&self,
		req: &DecodeTransactionRequest,
	) -> AdaptorResult<DecodeTransactionResponse> {
		let decoded = decode_signed(&req.raw_tx)?;
		let base64_tx = decoded.intent()?.encode()?;

		Ok(DecodeTransactionResponse {
			base64_tx,
			..DecodeTransactionResponse::success("decode tx success")
		})
	}

	async fn verify_signed_transaction(
		&self,
		req: &VerifyTransactionRequest,
	) -> AdaptorResult<VerifyTransactionResponse> {
		let expected = parse_address("address", &req.address)?;
		let decoded = decode_signed(&req.signed_tx)?;

		let verify = decoded.signer == expected;
		let msg = if verify {
			"verify tx success"
		} else {
			"signer does not match address"
		};

		Ok(VerifyTransactionResponse {
			verify,
			..VerifyTransactionResponse::success(msg)
		})
	}

	async fn get_extra_data(&self, _req: &ExtraDataRequest) -> AdaptorResult<ExtraDataResponse> {
		Ok(ExtraDataResponse::success("get extra data success"))
	}
}

/// Node `NotFound` keeps its own variant; everything else is an upstream failure.
fn node_error(context: &str, err: ClientError) -> AdaptorError {
	match err {
		ClientError::NotFound(what) => AdaptorError::NotFound(what),
		other => AdaptorError::upstream(context, other),
	}
}

fn parse_hash(value: &str) -> AdaptorResult<B256> {
	value
		.trim()
		.parse()
		.map_err(|_| AdaptorError::InvalidArgument(format!("invalid hash: {:?}", value)))
}

fn parse_address(field: &str, value: &str) -> AdaptorResult<Address> {
	value
		.trim()
		.parse()
		.map_err(|_| AdaptorError::InvalidArgument(format!("invalid {}: {:?}", field, value)))
}

fn parse_height(field: &str, value: &str) -> AdaptorResult<u64> {
	value
		.trim()
		.parse()
		.map_err(|_| AdaptorError::InvalidArgument(format!("invalid {}: {:?}", field, value)))
}

fn decode_hex(field: &str, value: &str) -> AdaptorResult<Vec<u8>> {
	let trimmed = value.trim();
	hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
		.map_err(|e| AdaptorError::InvalidArgument(format!("invalid {}: {}", field, e)))
}

fn hash_hex(hash: &B256) -> String {
	format!("0x{}", hex::encode(hash))
}

fn block_response(block: &EvmBlock, msg: &str) -> BlockResponse {
	let height = block.header.number;
	let transactions = block
		.transactions
		.iter()
		.map(|tx| {
			let to = tx.to.map(|a| a.to_checksum(None)).unwrap_or_default();
			BlockTransaction {
				from: tx.from.to_checksum(None),
				token_address: to.clone(),
				contract_wallet: to.clone(),
				to,
				hash: hash_hex(&tx.hash),
				height,
				amount: tx.value.to_string(),
			}
		})
		.collect();

	BlockResponse {
		height,
		hash: hash_hex(&block.header.hash),
		base_fee: block
			.header
			.base_fee_per_gas
			.map(|fee| fee.to_string())
			.unwrap_or_default(),
		transactions,
		..BlockResponse::success(msg)
	}
}

fn block_header(header: &EvmHeader) -> BlockHeader {
	BlockHeader {
		hash: hash_hex(&header.hash),
		parent_hash: hash_hex(&header.parent_hash),
		uncle_hash: hash_hex(&header.ommers_hash),
		coin_base: header.beneficiary.to_checksum(None),
		root: hash_hex(&header.state_root),
		tx_hash: hash_hex(&header.transactions_root),
		receipt_hash: hash_hex(&header.receipts_root),
		parent_beacon_root: hash_hex(&header.parent_beacon_block_root.unwrap_or_default()),
		difficulty: header.difficulty.to_string(),
		number: header.number.to_string(),
		gas_limit: header.gas_limit,
		gas_used: header.gas_used,
		time: header.timestamp,
		extra: format!("0x{}", hex::encode(&header.extra_data)),
		mix_digest: hash_hex(&header.mix_hash),
		nonce: header.nonce.to_string(),
		base_fee: header.base_fee_per_gas.unwrap_or_default().to_string(),
		withdrawals_hash: hash_hex(&header.withdrawals_root.unwrap_or_default()),
		blob_gas_used: header.blob_gas_used.unwrap_or_default(),
		excess_blob_gas: header.excess_blob_gas.unwrap_or_default(),
	}
}

fn history_message(entry: HistoryEntry) -> TxMessage {
	TxMessage {
		hash: entry.hash,
		index: 0,
		from: entry.from,
		to: entry.to,
		value: entry.value,
		fee: entry.fee,
		status: if entry.failed {
			TxStatus::Failed
		} else {
			TxStatus::Success
		},
		tx_type: 1,
		height: entry.height,
		contract_address: entry.contract_address,
		data: entry.input,
	}
}
