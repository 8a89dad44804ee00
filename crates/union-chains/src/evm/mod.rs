//! Ethereum Virtual Machine (EVM) network support.
//!
//! One adaptor type serves every EVM-compatible chain (Ethereum, Polygon,
//! Arbitrum, Optimism, Base). The chains differ only in their endpoints and
//! numeric chain id.
//!
//! - `intent`: base64 JSON transfer intents and their classification
//! - `builder`: canonical unsigned EIP-1559 transactions
//! - `signed`: signature attachment, signer recovery, raw transaction decoding
//! - `client`: JSON-RPC node access
//! - `data`: address balances and histories from a data service
//! - `adaptor`: the `ChainAdaptor` implementation tying these together

mod adaptor;
mod address;
pub mod builder;
pub mod client;
pub mod data;
pub mod intent;
pub mod signed;

pub use adaptor::{EvmChainAdaptor, MAX_HEADER_RANGE};
pub use address::{is_valid_address, public_key_to_address};
pub use builder::{build_unsigned, UnsignedTransaction};
pub use client::{AlloyEvmClient, ClientError, EvmClient};
pub use data::{ChainDataClient, EtherscanClient};
pub use intent::{decode_intent, IntentError, TransactionIntent, TransferKind};
pub use signed::{assemble_signed, decode_signed, SignedTransaction, VerificationError};
