//! EVM node client.
//!
//! `EvmClient` is the narrow view of a JSON-RPC node the adaptor needs. The
//! production implementation wraps an alloy HTTP provider and retries
//! read-only calls with exponential backoff; broadcasts go out exactly once.

use alloy::consensus::Transaction as ConsensusTx;
use alloy::eips::BlockNumberOrTag;
use alloy::network::{ReceiptResponse, TransactionResponse};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{Block, Header, Transaction, TransactionReceipt};
use alloy::transports::TransportError;
use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::Url;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ClientError {
	#[error("{0} not found")]
	NotFound(String),

	#[error("transport error: {0}")]
	Transport(String),

	#[error("invalid response: {0}")]
	InvalidResponse(String),
}

impl From<TransportError> for ClientError {
	fn from(err: TransportError) -> Self {
		ClientError::Transport(err.to_string())
	}
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Block header fields reported by the node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvmHeader {
	pub hash: B256,
	pub parent_hash: B256,
	pub ommers_hash: B256,
	pub beneficiary: Address,
	pub state_root: B256,
	pub transactions_root: B256,
	pub receipts_root: B256,
	pub parent_beacon_block_root: Option<B256>,
	pub difficulty: U256,
	pub number: u64,
	pub gas_limit: u64,
	pub gas_used: u64,
	pub timestamp: u64,
	pub extra_data: Bytes,
	pub mix_hash: B256,
	pub nonce: u64,
	pub base_fee_per_gas: Option<u64>,
	pub withdrawals_root: Option<B256>,
	pub blob_gas_used: Option<u64>,
	pub excess_blob_gas: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvmTransaction {
	pub hash: B256,
	pub from: Address,
	/// `None` for contract creation.
	pub to: Option<Address>,
	pub value: U256,
	pub input: Bytes,
	pub max_fee_per_gas: u128,
	pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvmBlock {
	pub header: EvmHeader,
	pub transactions: Vec<EvmTransaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvmReceipt {
	pub status: bool,
	pub transaction_index: Option<u64>,
	pub block_number: Option<u64>,
	pub gas_used: u64,
	pub effective_gas_price: u128,
}

/// Node operations used by the EVM adaptor.
#[async_trait]
pub trait EvmClient: Send + Sync {
	/// `None` selects the latest block.
	async fn block_by_number(&self, number: Option<u64>) -> ClientResult<EvmBlock>;

	async fn block_by_hash(&self, hash: B256) -> ClientResult<EvmBlock>;

	/// `None` selects the latest header.
	async fn header_by_number(&self, number: Option<u64>) -> ClientResult<EvmHeader>;

	async fn header_by_hash(&self, hash: B256) -> ClientResult<EvmHeader>;

	/// Headers for `start..=end`, in ascending order.
	async fn headers_by_range(&self, start: u64, end: u64) -> ClientResult<Vec<EvmHeader>> {
		let mut headers = Vec::new();
		for number in start..=end {
			headers.push(self.header_by_number(Some(number)).await?);
		}
		Ok(headers)
	}

	async fn transaction_count(&self, address: Address) -> ClientResult<u64>;

	async fn gas_price(&self) -> ClientResult<u128>;

	async fn max_priority_fee(&self) -> ClientResult<u128>;

	async fn send_raw_transaction(&self, raw: &[u8]) -> ClientResult<B256>;

	async fn transaction_by_hash(&self, hash: B256) -> ClientResult<EvmTransaction>;

	async fn receipt_by_hash(&self, hash: B256) -> ClientResult<EvmReceipt>;

	async fn code_at(&self, address: Address) -> ClientResult<Bytes>;
}

/// `EvmClient` over an alloy HTTP provider.
pub struct AlloyEvmClient {
	provider: DynProvider,
	backoff: ExponentialBackoff,
	max_retries: u32,
}

impl AlloyEvmClient {
	/// Connects lazily: no request is made until the first call.
	pub fn new(rpc_url: &str, max_retries: u32) -> ClientResult<Self> {
		let url: Url = rpc_url
			.parse()
			.map_err(|e| ClientError::Transport(format!("invalid rpc url {}: {}", rpc_url, e)))?;

		info!("Creating EVM node client for {} with max_retries={}", rpc_url, max_retries);

		let provider = ProviderBuilder::new().connect_http(url).erased();
		let backoff = ExponentialBackoff {
			max_elapsed_time: Some(Duration::from_secs(30)),
			..Default::default()
		};

		Ok(Self {
			provider,
			backoff,
			max_retries,
		})
	}

	/// Runs a read-only request, retrying transport failures.
	async fn with_retry<T, F, Fut>(&self, method: &'static str, mut request: F) -> ClientResult<T>
	where
		F: FnMut() -> Fut + Send,
		Fut: Future<Output = ClientResult<T>> + Send,
		T: Send,
	{
		let mut backoff = self.backoff.clone();
		let mut attempts = 0;

		loop {
			match request().await {
				Ok(result) => return Ok(result),
				Err(ClientError::Transport(e)) => {
					attempts += 1;

					if attempts > self.max_retries {
						warn!(
							"{} failed after {} attempts, giving up: {}",
							method, self.max_retries, e
						);
						return Err(ClientError::Transport(e));
					}

					match backoff.next_backoff() {
						Some(delay) => {
							warn!(
								"{} failed, attempt {}/{}, retrying in {:?}: {}",
								method, attempts, self.max_retries, delay, e
							);
							tokio::time::sleep(delay).await;
						}
						None => {
							warn!("{} failed, backoff exhausted after {} attempts: {}", method, attempts, e);
							return Err(ClientError::Transport(e));
						}
					}
				}
				Err(other) => return Err(other),
			}
		}
	}

	async fn fetch_block(&self, id: BlockId, full: bool) -> ClientResult<Block> {
		let block = match id {
			BlockId::Number(tag) if full => self.provider.get_block_by_number(tag).full().await?,
			BlockId::Number(tag) => self.provider.get_block_by_number(tag).await?,
			BlockId::Hash(hash) if full => self.provider.get_block_by_hash(hash).full().await?,
			BlockId::Hash(hash) => self.provider.get_block_by_hash(hash).await?,
		};
		block.ok_or_else(|| ClientError::NotFound(id.to_string()))
	}
}

#[derive(Debug, Clone, Copy)]
enum BlockId {
	Number(BlockNumberOrTag),
	Hash(B256),
}

impl BlockId {
	fn number(number: Option<u64>) -> Self {
		Self::Number(number.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number))
	}
}

impl std::fmt::Display for BlockId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Number(tag) => write!(f, "block {}", tag),
			Self::Hash(hash) => write!(f, "block {}", hash),
		}
	}
}

#[async_trait]
impl EvmClient for AlloyEvmClient {
	async fn block_by_number(&self, number: Option<u64>) -> ClientResult<EvmBlock> {
		let block = self
			.with_retry("eth_getBlockByNumber", move || self.fetch_block(BlockId::number(number), true))
			.await?;
		Ok(block_from_rpc(&block))
	}

	async fn block_by_hash(&self, hash: B256) -> ClientResult<EvmBlock> {
		let block = self
			.with_retry("eth_getBlockByHash", move || self.fetch_block(BlockId::Hash(hash), true))
			.await?;
		Ok(block_from_rpc(&block))
	}

	async fn header_by_number(&self, number: Option<u64>) -> ClientResult<EvmHeader> {
		let block = self
			.with_retry("eth_getBlockByNumber", move || self.fetch_block(BlockId::number(number), false))
			.await?;
		Ok(header_from_rpc(&block.header))
	}

	async fn header_by_hash(&self, hash: B256) -> ClientResult<EvmHeader> {
		let block = self
			.with_retry("eth_getBlockByHash", move || self.fetch_block(BlockId::Hash(hash), false))
			.await?;
		Ok(header_from_rpc(&block.header))
	}

	async fn transaction_count(&self, address: Address) -> ClientResult<u64> {
		self.with_retry("eth_getTransactionCount", move || async move {
			Ok(self.provider.get_transaction_count(address).await?)
		})
		.await
	}

	async fn gas_price(&self) -> ClientResult<u128> {
		self.with_retry("eth_gasPrice", move || async move { Ok(self.provider.get_gas_price().await?) })
			.await
	}

	async fn max_priority_fee(&self) -> ClientResult<u128> {
		self.with_retry("eth_maxPriorityFeePerGas", move || async move {
			Ok(self.provider.get_max_priority_fee_per_gas().await?)
		})
		.await
	}

	async fn send_raw_transaction(&self, raw: &[u8]) -> ClientResult<B256> {
		let pending = self.provider.send_raw_transaction(raw).await?;
		Ok(*pending.tx_hash())
	}

	async fn transaction_by_hash(&self, hash: B256) -> ClientResult<EvmTransaction> {
		let tx = self
			.with_retry("eth_getTransactionByHash", move || async move {
				Ok(self.provider.get_transaction_by_hash(hash).await?)
			})
			.await?;
		tx.map(|tx| transaction_from_rpc(&tx))
			.ok_or_else(|| ClientError::NotFound(format!("transaction {}", hash)))
	}

	async fn receipt_by_hash(&self, hash: B256) -> ClientResult<EvmReceipt> {
		let receipt = self
			.with_retry("eth_getTransactionReceipt", move || async move {
				Ok(self.provider.get_transaction_receipt(hash).await?)
			})
			.await?;
		receipt
			.map(|r| receipt_from_rpc(&r))
			.ok_or_else(|| ClientError::NotFound(format!("receipt {}", hash)))
	}

	async fn code_at(&self, address: Address) -> ClientResult<Bytes> {
		self.with_retry("eth_getCode", move || async move { Ok(self.provider.get_code_at(address).await?) })
			.await
	}
}

fn header_from_rpc(header: &Header) -> EvmHeader {
	let inner = &header.inner;
	EvmHeader {
		hash: header.hash,
		parent_hash: inner.parent_hash,
		ommers_hash: inner.ommers_hash,
		beneficiary: inner.beneficiary,
		state_root: inner.state_root,
		transactions_root: inner.transactions_root,
		receipts_root: inner.receipts_root,
		parent_beacon_block_root: inner.parent_beacon_block_root,
		difficulty: inner.difficulty,
		number: inner.number,
		gas_limit: inner.gas_limit,
		gas_used: inner.gas_used,
		timestamp: inner.timestamp,
		extra_data: inner.extra_data.clone(),
		mix_hash: inner.mix_hash,
		nonce: u64::from_be_bytes(inner.nonce.0),
		base_fee_per_gas: inner.base_fee_per_gas,
		withdrawals_root: inner.withdrawals_root,
		blob_gas_used: inner.blob_gas_used,
		excess_blob_gas: inner.excess_blob_gas,
	}
}

fn transaction_from_rpc(tx: &Transaction) -> EvmTransaction {
	EvmTransaction {
		hash: TransactionResponse::tx_hash(tx),
		from: TransactionResponse::from(tx),
		to: ConsensusTx::to(tx),
		value: ConsensusTx::value(tx),
		input: ConsensusTx::input(tx).clone(),
		max_fee_per_gas: ConsensusTx::max_fee_per_gas(tx),
		block_number: tx.block_number,
	}
}

fn block_from_rpc(block: &Block) -> EvmBlock {
	EvmBlock {
		header: header_from_rpc(&block.header),
		transactions: block
			.transactions
			.as_transactions()
			.unwrap_or_default()
			.iter()
			.map(transaction_from_rpc)
			.collect(),
	}
}

fn receipt_from_rpc(receipt: &TransactionReceipt) -> EvmReceipt {
	EvmReceipt {
		status: ReceiptResponse::status(receipt),
		transaction_index: ReceiptResponse::transaction_index(receipt),
		block_number: ReceiptResponse::block_number(receipt),
		gas_used: ReceiptResponse::gas_used(receipt),
		effective_gas_price: ReceiptResponse::effective_gas_price(receipt),
	}
}
