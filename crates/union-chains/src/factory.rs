//! Adaptor factories keyed by chain name.

use crate::evm::{AlloyEvmClient, EtherscanClient, EvmChainAdaptor};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use union_config::{Config, NodeConfig};
use union_types::{AdaptorError, AdaptorFactory, AdaptorResult, ChainAdaptor};

/// Chain names this crate can build adaptors for.
pub const SUPPORTED_CHAINS: &[&str] = &["ethereum", "polygon", "arbitrum", "optimism", "base"];

/// One factory per supported chain, each capturing that chain's node settings.
///
/// Factories are cheap to create; the node settings are only checked when a
/// factory runs, so chains absent from `chains` never need a node entry.
pub fn default_factories(config: &Config) -> HashMap<String, AdaptorFactory> {
	SUPPORTED_CHAINS
		.iter()
		.map(|&name| {
			let chain = name.to_string();
			let node = config.node(name).cloned();
			let factory: AdaptorFactory = Box::new(move || evm_adaptor(&chain, node.as_ref()));
			(name.to_string(), factory)
		})
		.collect()
}

fn evm_adaptor(chain: &str, node: Option<&NodeConfig>) -> AdaptorResult<Arc<dyn ChainAdaptor>> {
	let node = node.ok_or_else(|| {
		AdaptorError::Initialization(format!("no wallet_node entry for chain {}", chain))
	})?;

	let client = AlloyEvmClient::new(&node.rpc_url, node.max_retries)
		.map_err(|e| AdaptorError::Initialization(format!("{}: {}", chain, e)))?;
	let data = EtherscanClient::new(
		&node.data_api_url,
		&node.data_api_key,
		Duration::from_secs(node.timeout_secs),
	)
	.map_err(|e| AdaptorError::Initialization(format!("{}: {}", chain, e)))?;

	let mut adaptor = EvmChainAdaptor::new(chain, Arc::new(client), Arc::new(data));
	if let Some(chain_id) = node.chain_id {
		adaptor = adaptor.with_chain_id(chain_id);
	}

	info!(chain, rpc_url = %node.rpc_url, chain_id = ?node.chain_id, "Created EVM adaptor");
	Ok(Arc::new(adaptor))
}

#[cfg(test)]
mod tests {
	use super::*;
	use union_config::{ConfigFormat, ConfigLoader};

	fn config() -> Config {
		ConfigLoader::new()
			.with_env_prefix("UNION_TEST_FACTORY_")
			.from_contents(
				r#"
chains = ["ethereum", "polygon"]

[wallet_node.ethereum]
rpc_url = "https://eth.example.com"
data_api_url = "https://api.etherscan.io/api"
chain_id = 1
"#,
				ConfigFormat::Toml,
			)
			.unwrap()
	}

	#[test]
	fn test_factories_cover_supported_chains() {
		let factories = default_factories(&config());
		for chain in SUPPORTED_CHAINS {
			assert!(factories.contains_key(*chain));
		}
	}

	#[test]
	fn test_factory_builds_configured_chain() {
		let factories = default_factories(&config());
		let adaptor = factories["ethereum"]().unwrap();
		assert_eq!(adaptor.chain_name(), "ethereum");
	}

	#[test]
	fn test_factory_without_node_fails() {
		let factories = default_factories(&config());
		match factories["polygon"]() {
			Err(AdaptorError::Initialization(msg)) => assert!(msg.contains("polygon")),
			Err(other) => panic!("unexpected error {}", other),
			Ok(_) => panic!("factory should fail without node settings"),
		}
	}
}
