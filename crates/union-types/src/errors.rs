//! Error types shared by adaptors and the dispatcher.

use thiserror::Error;

pub type AdaptorResult<T> = std::result::Result<T, AdaptorError>;

/// Boxed upstream failure kept for logging.
pub type UpstreamSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by a chain adaptor method.
///
/// Every variant is request-scoped: the dispatcher turns it into an error
/// response and keeps serving. The `Display` output becomes the response
/// message, so variants that wrap upstream failures only print their context.
#[derive(Error, Debug)]
pub enum AdaptorError {
	#[error("unsupported chain {0}")]
	UnsupportedChain(String),

	/// The node or data-service client failed. The source is logged, never echoed.
	#[error("{context}")]
	UpstreamUnavailable {
		context: String,
		#[source]
		source: UpstreamSource,
	},

	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// The recovered signer differs from the declared sender.
	#[error("sender address mismatch: expected {expected}, got {got}")]
	SenderMismatch { expected: String, got: String },

	#[error("not found: {0}")]
	NotFound(String),

	#[error("not implemented: {0}")]
	NotImplemented(String),

	#[error("internal error: {0}")]
	Internal(String),

	#[error("adaptor initialization failed: {0}")]
	Initialization(String),
}

impl AdaptorError {
	/// Wraps an upstream client failure behind a generic message.
	pub fn upstream(
		context: impl Into<String>,
		source: impl std::error::Error + Send + Sync + 'static,
	) -> Self {
		Self::UpstreamUnavailable {
			context: context.into(),
			source: Box::new(source),
		}
	}

	/// Short, stable label used in structured logs.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::UnsupportedChain(_) => "unsupported_chain",
			Self::UpstreamUnavailable { .. } => "upstream_unavailable",
			Self::InvalidArgument(_) => "invalid_argument",
			Self::SenderMismatch { .. } => "sender_mismatch",
			Self::NotFound(_) => "not_found",
			Self::NotImplemented(_) => "not_implemented",
			Self::Internal(_) => "internal",
			Self::Initialization(_) => "initialization",
		}
	}
}
