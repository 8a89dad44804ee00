//! Account data service client.
//!
//! Balances and address histories come from an Etherscan-compatible HTTP API
//! rather than the node, since plain JSON-RPC has no per-address index.

use super::client::{ClientError, ClientResult};
use alloy::primitives::U256;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Which history an address query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
	/// Native-asset transactions (`txlist`).
	Normal,
	/// Token transfer events (`tokentx`).
	Token,
}

impl HistoryKind {
	fn action(self) -> &'static str {
		match self {
			Self::Normal => "txlist",
			Self::Token => "tokentx",
		}
	}
}

/// One entry of an address history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryEntry {
	pub hash: String,
	pub from: String,
	pub to: String,
	pub value: String,
	/// `gasUsed * gasPrice`, decimal.
	pub fee: String,
	pub height: String,
	pub contract_address: String,
	pub input: String,
	pub failed: bool,
}

#[async_trait]
pub trait ChainDataClient: Send + Sync {
	/// Balance of `address`, or its balance of `token` when given.
	async fn balance(&self, address: &str, token: Option<&str>) -> ClientResult<U256>;

	async fn history(
		&self,
		address: &str,
		kind: HistoryKind,
		page: u32,
		page_size: u32,
	) -> ClientResult<Vec<HistoryEntry>>;
}

/// `ChainDataClient` over an Etherscan-compatible API.
pub struct EtherscanClient {
	http: reqwest::Client,
	base_url: String,
	api_key: String,
}

impl EtherscanClient {
	pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> ClientResult<Self> {
		let http = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ClientError::Transport(e.to_string()))?;

		Ok(Self {
			http,
			base_url: base_url.to_string(),
			api_key: api_key.to_string(),
		})
	}

	async fn query(&self, params: &[(&str, String)]) -> ClientResult<serde_json::Value> {
		debug!(url = %self.base_url, ?params, "Data service request");

		let envelope: ApiEnvelope = self
			.http
			.get(&self.base_url)
			.query(params)
			.query(&[("apikey", self.api_key.as_str())])
			.send()
			.await
			.map_err(|e| ClientError::Transport(e.to_string()))?
			.error_for_status()
			.map_err(|e| ClientError::Transport(e.to_string()))?
			.json()
			.await
			.map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

		envelope.into_result()
	}
}

#[async_trait]
impl ChainDataClient for EtherscanClient {
	async fn balance(&self, address: &str, token: Option<&str>) -> ClientResult<U256> {
		let mut params = vec![
			("module", "account".to_string()),
			("address", address.to_string()),
			("tag", "latest".to_string()),
		];
		match token {
			Some(token) => {
				params.push(("action", "tokenbalance".to_string()));
				params.push(("contractaddress", token.to_string()));
			}
			None => params.push(("action", "balance".to_string())),
		}

		parse_balance(&self.query(&params).await?)
	}

	async fn history(
		&self,
		address: &str,
		kind: HistoryKind,
		page: u32,
		page_size: u32,
	) -> ClientResult<Vec<HistoryEntry>> {
		let params = [
			("module", "account".to_string()),
			("action", kind.action().to_string()),
			("address", address.to_string()),
			("page", page.max(1).to_string()),
			("offset", page_size.max(1).to_string()),
			("sort", "desc".to_string()),
		];

		parse_history(self.query(&params).await?)
	}
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
	status: String,
	#[serde(default)]
	message: String,
	#[serde(default)]
	result: serde_json::Value,
}

impl ApiEnvelope {
	fn into_result(self) -> ClientResult<serde_json::Value> {
		if self.status == "1" {
			return Ok(self.result);
		}
		// An address without history is reported as a failure with an empty list.
		if self.message.starts_with("No transactions found") {
			return Ok(serde_json::Value::Array(Vec::new()));
		}
		let detail = match self.result {
			serde_json::Value::String(detail) => detail,
			_ => self.message,
		};
		Err(ClientError::InvalidResponse(detail))
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTransaction {
	hash: String,
	from: String,
	to: String,
	value: String,
	block_number: String,
	#[serde(default)]
	gas_used: String,
	#[serde(default)]
	gas_price: String,
	#[serde(default)]
	contract_address: String,
	#[serde(default)]
	input: String,
	#[serde(default)]
	is_error: String,
}

fn parse_decimal(field: &str, value: &str) -> ClientResult<U256> {
	U256::from_str_radix(value, 10)
		.map_err(|_| ClientError::InvalidResponse(format!("invalid {}: {:?}", field, value)))
}

fn parse_balance(result: &serde_json::Value) -> ClientResult<U256> {
	match result.as_str() {
		Some(value) => parse_decimal("balance", value),
		None => Err(ClientError::InvalidResponse(format!(
			"unexpected balance result {}",
			result
		))),
	}
}

fn parse_history(result: serde_json::Value) -> ClientResult<Vec<HistoryEntry>> {
	let txs: Vec<ApiTransaction> =
		serde_json::from_value(result).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

	txs.into_iter()
		.map(|tx| {
			let fee = if tx.gas_used.is_empty() || tx.gas_price.is_empty() {
				U256::ZERO
			} else {
				parse_decimal("gasUsed", &tx.gas_used)?
					.saturating_mul(parse_decimal("gasPrice", &tx.gas_price)?)
			};

			Ok(HistoryEntry {
				hash: tx.hash,
				from: tx.from,
				to: tx.to,
				value: tx.value,
				fee: fee.to_string(),
				height: tx.block_number,
				contract_address: tx.contract_address,
				input: tx.input,
				failed: tx.is_error == "1",
			})
		})
		.collect()
}
