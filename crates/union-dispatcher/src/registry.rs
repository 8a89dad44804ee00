//! Registry of chain adaptors.
//!
//! The registry is populated once from configuration and never changes
//! afterwards, so it can be shared behind an `Arc` without locking.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use union_types::{normalize_chain, AdaptorError, AdaptorFactory, ChainAdaptor};

#[derive(Error, Debug)]
pub enum RegistryError {
	/// A configured chain's factory failed. Startup cannot continue.
	#[error("failed to initialize adaptor for chain {chain}: {source}")]
	AdaptorInit {
		chain: String,
		#[source]
		source: AdaptorError,
	},
}

/// Immutable mapping from normalized chain name to adaptor.
pub struct AdaptorRegistry {
	adaptors: HashMap<String, Arc<dyn ChainAdaptor>>,
}

impl AdaptorRegistry {
	/// Builds the registry for the configured chains.
	///
	/// Names without a factory are logged and skipped, as are repeated names.
	/// A factory error aborts the whole build.
	pub fn build(
		configured_chains: &[String],
		factories: &HashMap<String, AdaptorFactory>,
	) -> Result<Self, RegistryError> {
		let mut adaptors: HashMap<String, Arc<dyn ChainAdaptor>> = HashMap::new();
		let mut seen = HashSet::new();

		for configured in configured_chains {
			let chain = normalize_chain(configured);

			if !seen.insert(chain.clone()) {
				warn!(chain = %chain, "Chain configured more than once, ignoring duplicate");
				continue;
			}

			let Some(factory) = factories.get(&chain) else {
				let mut supported: Vec<_> = factories.keys().map(String::as_str).collect();
				supported.sort_unstable();
				warn!(chain = %chain, ?supported, "No adaptor available for configured chain, skipping");
				continue;
			};

			let adaptor = factory().map_err(|source| RegistryError::AdaptorInit {
				chain: chain.clone(),
				source,
			})?;

			info!(chain = %chain, "Registered chain adaptor");
			adaptors.insert(chain, adaptor);
		}

		Ok(Self { adaptors })
	}

	/// Adaptor for a chain name, matched case-insensitively.
	pub fn lookup(&self, chain: &str) -> Option<Arc<dyn ChainAdaptor>> {
		self.adaptors.get(&normalize_chain(chain)).cloned()
	}

	/// Registered chain names, sorted.
	pub fn chains(&self) -> Vec<String> {
		let mut chains: Vec<_> = self.adaptors.keys().cloned().collect();
		chains.sort();
		chains
	}

	pub fn len(&self) -> usize {
		self.adaptors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adaptors.is_empty()
	}
}

impl std::fmt::Debug for AdaptorRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AdaptorRegistry")
			.field("chains", &self.chains())
			.finish()
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use async_trait::async_trait;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use union_types::*;

	/// Adaptor answering every call with a fixed success, or panicking on `get_fee`.
	pub(crate) struct StubAdaptor {
		pub name: String,
	}

	#[async_trait]
	impl ChainAdaptor for StubAdaptor {
		fn chain_name(&self) -> &str {
			&self.name
		}

		async fn get_support_chains(
			&self,
			_req: &SupportChainsRequest,
		) -> AdaptorResult<SupportChainsResponse> {
			Ok(SupportChainsResponse {
				support: true,
				..SupportChainsResponse::success(format!("{} supported", self.name))
			})
		}

		async fn convert_address(
			&self,
			_req: &ConvertAddressRequest,
		) -> AdaptorResult<ConvertAddressResponse> {
			Ok(ConvertAddressResponse::success("ok"))
		}

		async fn valid_address(
			&self,
			req: &ValidAddressRequest,
		) -> AdaptorResult<ValidAddressResponse> {
			Ok(ValidAddressResponse {
				valid: !req.address.is_empty(),
				..ValidAddressResponse::success("ok")
			})
		}

		async fn get_block_by_number(&self, _req: &BlockNumberRequest) -> AdaptorResult<BlockResponse> {
			Err(AdaptorError::upstream(
				"block by number error",
				std::io::Error::new(std::io::ErrorKind::TimedOut, "node at 10.0.0.1 timed out"),
			))
		}

		async fn get_block_by_hash(&self, _req: &BlockHashRequest) -> AdaptorResult<BlockResponse> {
			Ok(BlockResponse::success("ok"))
		}

		async fn get_block_header_by_hash(
			&self,
			_req: &BlockHeaderHashRequest,
		) -> AdaptorResult<BlockHeaderResponse> {
			Ok(BlockHeaderResponse::success("ok"))
		}

		async fn get_block_header_by_number(
			&self,
			_req: &BlockHeaderNumberRequest,
		) -> AdaptorResult<BlockHeaderResponse> {
			Ok(BlockHeaderResponse::success("ok"))
		}

		async fn get_block_header_by_range(
			&self,
			_req: &BlockByRangeRequest,
		) -> AdaptorResult<BlockByRangeResponse> {
			Ok(BlockByRangeResponse::success("ok"))
		}

		async fn get_block_by_range(
			&self,
			_req: &BlockByRangeRequest,
		) -> AdaptorResult<BlockByRangeResponse> {
			Ok(BlockByRangeResponse::success("ok"))
		}

		async fn get_account(&self, _req: &AccountRequest) -> AdaptorResult<AccountResponse> {
			Ok(AccountResponse::success("ok"))
		}

		async fn get_fee(&self, _req: &FeeRequest) -> AdaptorResult<FeeResponse> {
			panic!("fee oracle exploded");
		}

		async fn send_tx(&self, _req: &SendTxRequest) -> AdaptorResult<SendTxResponse> {
			Ok(SendTxResponse::success("ok"))
		}

		async fn get_tx_by_address(
			&self,
			_req: &TxAddressRequest,
		) -> AdaptorResult<TxAddressResponse> {
			Ok(TxAddressResponse::success("ok"))
		}

		async fn get_tx_by_hash(&self, _req: &TxHashRequest) -> AdaptorResult<TxHashResponse> {
			Ok(TxHashResponse::success("ok"))
		}

		async fn build_unsigned_transaction(
			&self,
			_req: &UnsignTransactionRequest,
		) -> AdaptorResult<UnsignTransactionResponse> {
			Ok(UnsignTransactionResponse::success("ok"))
		}

		async fn build_signed_transaction(
			&self,
			_req: &SignedTransactionRequest,
		) -> AdaptorResult<SignedTransactionResponse> {
			Err(AdaptorError::SenderMismatch {
				expected: "0xaa".to_string(),
				got: "0xbb".to_string(),
			})
		}

		async fn decode_transaction(
			&self,
			_req: &DecodeTransactionRequest,
		) -> AdaptorResult<DecodeTransactionResponse> {
			Ok(DecodeTransactionResponse::success("ok"))
		}

		async fn verify_signed_transaction(
			&self,
			_req: &VerifyTransactionRequest,
		) -> AdaptorResult<VerifyTransactionResponse> {
			Ok(VerifyTransactionResponse::success("ok"))
		}

		async fn get_extra_data(&self, _req: &ExtraDataRequest) -> AdaptorResult<ExtraDataResponse> {
			Ok(ExtraDataResponse::success("ok"))
		}
	}

	pub(crate) fn stub_factory(name: &str) -> AdaptorFactory {
		let name = name.to_string();
		Box::new(move || -> AdaptorResult<Arc<dyn ChainAdaptor>> {
			Ok(Arc::new(StubAdaptor { name: name.clone() }))
		})
	}

	pub(crate) fn factories(names: &[&str]) -> HashMap<String, AdaptorFactory> {
		names
			.iter()
			.map(|name| (name.to_string(), stub_factory(name)))
			.collect()
	}

	fn chains(names: &[&str]) -> Vec<String> {
		names.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_build_registers_configured_chains() {
		let registry = AdaptorRegistry::build(
			&chains(&["Ethereum", "polygon"]),
			&factories(&["ethereum", "polygon", "base"]),
		)
		.unwrap();

		assert_eq!(registry.chains(), vec!["ethereum", "polygon"]);
		assert_eq!(registry.len(), 2);
		assert!(registry.lookup("base").is_none());
	}

	#[test]
	fn test_lookup_normalizes() {
		let registry =
			AdaptorRegistry::build(&chains(&["ethereum"]), &factories(&["ethereum"])).unwrap();

		let adaptor = registry.lookup("  ETHEREUM ").unwrap();
		assert_eq!(adaptor.chain_name(), "ethereum");
	}

	#[test]
	fn test_unknown_chain_skipped() {
		let registry = AdaptorRegistry::build(
			&chains(&["solana", "ethereum"]),
			&factories(&["ethereum"]),
		)
		.unwrap();

		assert_eq!(registry.chains(), vec!["ethereum"]);
		assert!(registry.lookup("solana").is_none());
	}

	#[test]
	fn test_duplicate_chain_built_once() {
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = calls.clone();
		let mut factories: HashMap<String, AdaptorFactory> = HashMap::new();
		factories.insert(
			"ethereum".to_string(),
			Box::new(move || -> AdaptorResult<Arc<dyn ChainAdaptor>> {
				counter.fetch_add(1, Ordering::SeqCst);
				Ok(Arc::new(StubAdaptor {
					name: "ethereum".to_string(),
				}))
			}),
		);

		let registry =
			AdaptorRegistry::build(&chains(&["ethereum", "Ethereum"]), &factories).unwrap();

		assert_eq!(registry.len(), 1);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_factory_failure_aborts() {
		let mut factories = factories(&["ethereum"]);
		factories.insert(
			"polygon".to_string(),
			Box::new(|| -> AdaptorResult<Arc<dyn ChainAdaptor>> {
				Err(AdaptorError::Initialization("bad rpc url".to_string()))
			}),
		);

		let err = AdaptorRegistry::build(&chains(&["ethereum", "polygon"]), &factories)
			.unwrap_err();

		let RegistryError::AdaptorInit { chain, source } = err;
		assert_eq!(chain, "polygon");
		assert_eq!(source.kind(), "initialization");
	}

	#[test]
	fn test_empty_configuration() {
		let registry = AdaptorRegistry::build(&[], &factories(&["ethereum"])).unwrap();
		assert!(registry.is_empty());
		assert!(registry.chains().is_empty());
	}
}
