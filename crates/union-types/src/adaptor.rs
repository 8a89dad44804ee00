//! The capability contract every network adaptor implements.

use crate::api::*;
use crate::errors::{AdaptorError, AdaptorResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Builds the adaptor for one chain. Invoked once at startup.
pub type AdaptorFactory = Box<dyn Fn() -> AdaptorResult<Arc<dyn ChainAdaptor>> + Send + Sync>;

/// Operations a network adaptor exposes to the dispatcher.
///
/// An adaptor is bound to exactly one chain identifier at construction time,
/// is shared read-only across all in-flight calls, and owns no cross-chain
/// logic. Methods return a fully formed response on success; errors are
/// turned into error responses by the dispatcher.
///
/// The collectible queries have default implementations returning
/// `AdaptorError::NotImplemented`.
#[async_trait]
pub trait ChainAdaptor: Send + Sync {
	/// Normalized chain identifier this adaptor serves.
	fn chain_name(&self) -> &str;

	async fn get_support_chains(
		&self,
		req: &SupportChainsRequest,
	) -> AdaptorResult<SupportChainsResponse>;

	async fn convert_address(
		&self,
		req: &ConvertAddressRequest,
	) -> AdaptorResult<ConvertAddressResponse>;

	async fn valid_address(&self, req: &ValidAddressRequest)
		-> AdaptorResult<ValidAddressResponse>;

	async fn get_block_by_number(&self, req: &BlockNumberRequest) -> AdaptorResult<BlockResponse>;

	async fn get_block_by_hash(&self, req: &BlockHashRequest) -> AdaptorResult<BlockResponse>;

	async fn get_block_header_by_hash(
		&self,
		req: &BlockHeaderHashRequest,
	) -> AdaptorResult<BlockHeaderResponse>;

	async fn get_block_header_by_number(
		&self,
		req: &BlockHeaderNumberRequest,
	) -> AdaptorResult<BlockHeaderResponse>;

	async fn get_block_header_by_range(
		&self,
		req: &BlockByRangeRequest,
	) -> AdaptorResult<BlockByRangeResponse>;

	async fn get_block_by_range(
		&self,
		req: &BlockByRangeRequest,
	) -> AdaptorResult<BlockByRangeResponse>;

	async fn get_account(&self, req: &AccountRequest) -> AdaptorResult<AccountResponse>;

	async fn get_fee(&self, req: &FeeRequest) -> AdaptorResult<FeeResponse>;

	async fn send_tx(&self, req: &SendTxRequest) -> AdaptorResult<SendTxResponse>;

	async fn get_tx_by_address(&self, req: &TxAddressRequest) -> AdaptorResult<TxAddressResponse>;

	async fn get_tx_by_hash(&self, req: &TxHashRequest) -> AdaptorResult<TxHashResponse>;

	async fn build_unsigned_transaction(
		&self,
		req: &UnsignTransactionRequest,
	) -> AdaptorResult<UnsignTransactionResponse>;

	async fn build_signed_transaction(
		&self,
		req: &SignedTransactionRequest,
	) -> AdaptorResult<SignedTransactionResponse>;

	async fn decode_transaction(
		&self,
		req: &DecodeTransactionRequest,
	) -> AdaptorResult<DecodeTransactionResponse>;

	async fn verify_signed_transaction(
		&self,
		req: &VerifyTransactionRequest,
	) -> AdaptorResult<VerifyTransactionResponse>;

	async fn get_extra_data(&self, req: &ExtraDataRequest) -> AdaptorResult<ExtraDataResponse>;

	async fn get_nft_list_by_address(&self, _req: &NftAddressRequest) -> AdaptorResult<NftResponse> {
		Err(AdaptorError::NotImplemented("get_nft_list_by_address".to_string()))
	}

	async fn get_nft_collection(&self, _req: &NftCollectionRequest) -> AdaptorResult<NftResponse> {
		Err(AdaptorError::NotImplemented("get_nft_collection".to_string()))
	}

	async fn get_nft_detail(&self, _req: &NftDetailRequest) -> AdaptorResult<NftResponse> {
		Err(AdaptorError::NotImplemented("get_nft_detail".to_string()))
	}

	async fn get_nft_holder_list(&self, _req: &NftHolderListRequest) -> AdaptorResult<NftResponse> {
		Err(AdaptorError::NotImplemented("get_nft_holder_list".to_string()))
	}

	async fn get_nft_trade_history(
		&self,
		_req: &NftTradeHistoryRequest,
	) -> AdaptorResult<NftResponse> {
		Err(AdaptorError::NotImplemented("get_nft_trade_history".to_string()))
	}

	async fn get_address_nft_trade_history(
		&self,
		_req: &AddressNftTradeHistoryRequest,
	) -> AdaptorResult<NftResponse> {
		Err(AdaptorError::NotImplemented(
			"get_address_nft_trade_history".to_string(),
		))
	}
}
