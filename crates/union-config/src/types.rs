//! Configuration data model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use union_types::normalize_chain;

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	/// Chains to activate, in order. Names are matched case-insensitively.
	pub chains: Vec<String>,
	#[serde(default)]
	pub server: ServerConfig,
	#[serde(default)]
	pub logging: LoggingConfig,
	/// Node endpoints keyed by chain name.
	#[serde(default)]
	pub wallet_node: HashMap<String, NodeConfig>,
}

impl Config {
	/// Returns the node settings for a chain, matching the name case-insensitively.
	pub fn node(&self, chain: &str) -> Option<&NodeConfig> {
		self.wallet_node.get(&normalize_chain(chain))
	}

	/// Lower-cases chain names and node keys so later lookups are exact.
	pub(crate) fn normalize(&mut self) {
		self.chains = self.chains.iter().map(|c| normalize_chain(c)).collect();
		self.wallet_node = std::mem::take(&mut self.wallet_node)
			.into_iter()
			.map(|(name, node)| (normalize_chain(&name), node))
			.collect();
	}
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
		}
	}
}

/// Log output settings. `RUST_LOG` takes precedence over `level` when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
	#[serde(default = "default_log_level")]
	pub level: String,
	/// Emit JSON lines instead of human-readable output.
	#[serde(default)]
	pub json: bool,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: default_log_level(),
			json: false,
		}
	}
}

/// Endpoints a chain factory needs to build its adaptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
	/// JSON-RPC endpoint of the chain node.
	pub rpc_url: String,
	/// Etherscan-compatible data API endpoint.
	pub data_api_url: String,
	#[serde(default)]
	pub data_api_key: String,
	/// Request timeout for the data API, in seconds.
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
	/// Retry budget for read-only node calls.
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
	/// Expected numeric chain id; intents for another id are rejected when set.
	#[serde(default)]
	pub chain_id: Option<u64>,
}

fn default_host() -> String {
	"0.0.0.0".to_string()
}

fn default_port() -> u16 {
	8189
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_timeout_secs() -> u64 {
	15
}

fn default_max_retries() -> u32 {
	3
}
