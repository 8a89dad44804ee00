//! Shared types for the chains-union service.
//!
//! This crate defines the capability contract every network adaptor implements
//! (`ChainAdaptor`), the request and response messages exchanged over the
//! transport, and the error taxonomy used across the workspace.
//!
//! # Modules
//!
//! - `adaptor`: the `ChainAdaptor` trait
//! - `api`: request/response messages and the `ChainRequest`/`RpcResponse` traits
//! - `chain`: chain identifier normalization
//! - `errors`: `AdaptorError` and the `AdaptorResult` alias

pub mod adaptor;
pub mod api;
pub mod chain;
pub mod errors;

pub use adaptor::{AdaptorFactory, ChainAdaptor};
pub use api::*;
pub use chain::normalize_chain;
pub use errors::{AdaptorError, AdaptorResult};
