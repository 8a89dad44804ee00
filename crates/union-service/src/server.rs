//! HTTP transport.
//!
//! Each dispatcher operation is exposed as `POST /v1/<operation>` taking and
//! returning JSON. Call failures travel inside the response body with HTTP 200;
//! only requests that cannot be decoded are rejected here.

use anyhow::{Context, Result};
use axum::{
	extract::State,
	response::Json,
	routing::{get, post},
	Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use union_config::ServerConfig;
use union_dispatcher::ChainDispatcher;
use union_types::*;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub dispatcher: ChainDispatcher,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
	status: &'static str,
	chains: Vec<String>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok",
		chains: state.dispatcher.registry().chains(),
	})
}

macro_rules! rpc_routes {
	($router:expr; $($method:ident($request:ty) -> $response:ty;)*) => {{
		let router = $router;
		$(
			let router = router.route(concat!("/v1/", stringify!($method)), post({
				async fn handler(
					State(state): State<AppState>,
					Json(req): Json<$request>,
				) -> Json<$response> {
					Json(state.dispatcher.$method(&req).await)
				}
				handler
			}));
		)*
		router
	}};
}

/// Builds the application router around `dispatcher`.
pub fn router(dispatcher: ChainDispatcher) -> Router {
	let router = Router::new().route("/health", get(health));

	let router = rpc_routes!(router;
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
	);

	router
		.with_state(AppState { dispatcher })
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

/// Serves the API until SIGINT or SIGTERM.
pub async fn serve(config: &ServerConfig, dispatcher: ChainDispatcher) -> Result<()> {
	let bind_address = format!("{}:{}", config.host, config.port);
	let listener = TcpListener::bind(&bind_address)
		.await
		.with_context(|| format!("Failed to bind {}", bind_address))?;

	info!("API server listening on {}", bind_address);

	axum::serve(listener, router(dispatcher))
		.with_graceful_shutdown(shutdown_signal())
		.await
		.context("API server failed")?;

	info!("API server stopped");
	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			error!("Failed to install Ctrl+C handler: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(e) => {
				error!("Failed to install SIGTERM handler: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	info!("Shutdown signal received");
}
