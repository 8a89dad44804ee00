//! Request routing for the chains-union service.
//!
//! The `AdaptorRegistry` is built once at startup from the configured chain
//! names and a set of per-chain factories. The `ChainDispatcher` routes every
//! request to the adaptor registered for its chain and guarantees that a
//! failing or panicking adaptor only affects the call it was handling.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::ChainDispatcher;
pub use registry::{AdaptorRegistry, RegistryError};
