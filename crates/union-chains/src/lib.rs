//! Network adaptors for the chains-union service.
//!
//! Each supported network provides a `ChainAdaptor` implementation and a
//! factory that builds it from configuration. The dispatcher only ever sees
//! the trait object.

pub mod evm;
pub mod factory;

pub use factory::{default_factories, SUPPORTED_CHAINS};
