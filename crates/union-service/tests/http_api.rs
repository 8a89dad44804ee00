use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;
use union_dispatcher::{AdaptorRegistry, ChainDispatcher};
use union_service::router;
use union_types::*;

struct StubAdaptor {
	name: String,
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

fn app() -> Router {
	let mut factories: HashMap<String, AdaptorFactory> = HashMap::new();
	for name in ["ethereum", "polygon"] {
		factories.insert(
			name.to_string(),
			Box::new(move || -> AdaptorResult<Arc<dyn ChainAdaptor>> {
				Ok(Arc::new(StubAdaptor {
					name: name.to_string(),
				}))
			}),
		);
	}

	let registry = AdaptorRegistry::build(
		&["ethereum".to_string(), "polygon".to_string()],
		&factories,
	)
	.unwrap();
	router(ChainDispatcher::new(Arc::new(registry)))
}

async fn post(app: Router, path: &str, body: String) -> (StatusCode, Option<Value>) {
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri(path)
				.header("content-type", "application/json")
				.body(Body::from(body))
				.unwrap(),
		)
		.await
		.unwrap();

	let status = response.status();
	let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	(status, serde_json::from_slice(&bytes).ok())
}

#[tokio::test]
async fn test_health_lists_chains() {
	let response = app()
		.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	let body: Value = serde_json::from_slice(&bytes).unwrap();
	assert_eq!(body, json!({"status": "ok", "chains": ["ethereum", "polygon"]}));
}

#[tokio::test]
async fn test_operation_routed_to_adaptor() {
	let (status, body) = post(
		app(),
		"/v1/get_support_chains",
		json!({"chain": "Ethereum"}).to_string(),
	)
	.await;
	let body = body.unwrap();

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["code"], "success");
	assert_eq!(body["msg"], "ethereum supported");
	assert_eq!(body["support"], true);
}

#[tokio::test]
async fn test_unsupported_chain_is_ok_with_error_code() {
	let (status, body) = post(
		app(),
		"/v1/get_account",
		json!({"chain": "solana", "address": "abc"}).to_string(),
	)
	.await;
	let body = body.unwrap();

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["code"], "error");
	assert_eq!(body["msg"], "unsupported chain solana");
}

#[tokio::test]
async fn test_adaptor_failures_stay_in_body() {
	let app = app();

	let (status, body) = post(
		app.clone(),
		"/v1/get_block_by_number",
		json!({"chain": "ethereum", "height": 7}).to_string(),
	)
	.await;
	let body = body.unwrap();
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["code"], "error");
	assert_eq!(body["msg"], "block by number error");

	let (status, body) = post(app.clone(), "/v1/get_fee", json!({"chain": "polygon"}).to_string()).await;
	let body = body.unwrap();
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["code"], "error");
	assert!(body["msg"].as_str().unwrap().starts_with("internal error"));

	let (_, body) = post(
		app,
		"/v1/valid_address",
		json!({"chain": "polygon", "address": "0x1"}).to_string(),
	)
	.await;
	assert_eq!(body.unwrap()["valid"], true);
}

#[tokio::test]
async fn test_nft_endpoint_not_implemented() {
	let (status, body) = post(
		app(),
		"/v1/get_nft_collection",
		json!({"chain": "ethereum"}).to_string(),
	)
	.await;
	let body = body.unwrap();

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["code"], "error");
	assert_eq!(body["msg"], "not implemented: get_nft_collection");
}

#[tokio::test]
async fn test_malformed_json_rejected() {
	let (status, _) = post(app(), "/v1/get_account", "{\"chain\": ".to_string()).await;
	assert!(status.is_client_error());
}

#[tokio::test]
async fn test_unknown_operation() {
	let (status, _) = post(app(), "/v1/get_everything", "{}".to_string()).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}
