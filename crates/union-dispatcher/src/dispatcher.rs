//! Per-call routing with fault isolation.
//!
//! Every public method follows the same path through `dispatch`: resolve the
//! chain, call the adaptor inside a panic boundary, and turn any failure into
//! the error form of the method's own response type. Callers therefore always
//! receive a well-formed response, and no adaptor failure outlives its call.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info_span, warn, Instrument};
use union_types::*;
use uuid::Uuid;

use crate::registry::AdaptorRegistry;

/// Routes requests to the adaptor registered for their chain.
#[derive(Clone)]
pub struct ChainDispatcher {
	registry: Arc<AdaptorRegistry>,
}

impl ChainDispatcher {
	pub fn new(registry: Arc<AdaptorRegistry>) -> Self {
		Self { registry }
	}

	pub fn registry(&self) -> &AdaptorRegistry {
		&self.registry
	}

	/// Runs one adaptor call for `req` and always produces a response.
	///
	/// An unknown chain, an adaptor error and an adaptor panic all become a
	/// `ReturnCode::Error` response; panics are reported without their payload.
	pub async fn dispatch<Req, Resp, F>(&self, method: &'static str, req: &Req, call: F) -> Resp
	where
		Req: ChainRequest + Sync,
		Resp: RpcResponse,
		F: for<'a> FnOnce(&'a dyn ChainAdaptor, &'a Req) -> BoxFuture<'a, AdaptorResult<Resp>>
			+ Send,
	{
		let request_id = Uuid::new_v4();
		let chain = normalize_chain(req.chain());
		let span = info_span!("dispatch", %request_id, method, chain = %chain);

		async move {
			let Some(adaptor) = self.registry.lookup(&chain) else {
				warn!("Unsupported chain requested");
				return Resp::failure(AdaptorError::UnsupportedChain(chain.clone()).to_string());
			};

			match AssertUnwindSafe(call(adaptor.as_ref(), req)).catch_unwind().await {
				Ok(Ok(resp)) => {
					debug!("Adaptor call completed");
					resp
				}
				Ok(Err(e)) => {
					warn!(
						kind = e.kind(),
						error = %e,
						source = ?std::error::Error::source(&e),
						"Adaptor call failed"
					);
					Resp::failure(e.to_string())
				}
				Err(panic) => {
					error!(panic = %panic_message(panic.as_ref()), "Adaptor panicked");
					Resp::failure(format!("internal error (request {})", request_id))
				}
			}
		}
		.instrument(span)
		.await
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(msg) = payload.downcast_ref::<&str>() {
		msg
	} else if let Some(msg) = payload.downcast_ref::<String>() {
		msg.as_str()
	} else {
		"non-string panic payload"
	}
}

macro_rules! dispatch_methods {
	($($method:ident($request:ty) -> $response:ty;)*) => {
		impl ChainDispatcher {
			$(
				pub async fn $method(&self, req: &$request) -> $response {
					self.dispatch(stringify!($method), req, |adaptor, req| adaptor.$method(req))
						.await
				}
			)*
		}
	};
}

dispatch_methods! {
	get_support_chains(SupportChainsRequest) -> SupportChainsResponse;
	convert_address(ConvertAddressRequest) -> ConvertAddressResponse;
	valid_address(ValidAddressRequest) -> ValidAddressResponse;
	get_block_by_number(BlockNumberRequest) -> BlockResponse;
	get_block_by_hash(BlockHashRequest) -> BlockResponse;
	get_block_header_by_hash(BlockHeaderHashRequest) -> BlockHeaderResponse;
	get_block_header_by_number(BlockHeaderNumberRequest) -> BlockHeaderResponse;
	get_block_header_by_range(BlockByRangeRequest) -> BlockByRangeResponse;
	get_block_by_range(BlockByRangeRequest) -> BlockByRangeResponse;
	get_account(AccountRequest) -> AccountResponse;
	get_fee(FeeRequest) -> FeeResponse;
	send_tx(SendTxRequest) -> SendTxResponse;
	get_tx_by_address(TxAddressRequest) -> TxAddressResponse;
	get_tx_by_hash(TxHashRequest) -> TxHashResponse;
	build_unsigned_transaction(UnsignTransactionRequest) -> UnsignTransactionResponse;
	build_signed_transaction(SignedTransactionRequest) -> SignedTransactionResponse;
	decode_transaction(DecodeTransactionRequest) -> DecodeTransactionResponse;
	verify_signed_transaction(VerifyTransactionRequest) -> VerifyTransactionResponse;
	get_extra_data(ExtraDataRequest) -> ExtraDataResponse;
	get_nft_list_by_address(NftAddressRequest) -> NftResponse;
	get_nft_collection(NftCollectionRequest) -> NftResponse;
	get_nft_detail(NftDetailRequest) -> NftResponse;
	get_nft_holder_list(NftHolderListRequest) -> NftResponse;
	get_nft_trade_history(NftTradeHistoryRequest) -> NftResponse;
	get_address_nft_trade_history(AddressNftTradeHistoryRequest) -> NftResponse;
}
