//! Chain identifier handling.

/// Normalizes a chain identifier for registry storage and lookup.
///
/// Identifiers are case-insensitive and surrounding whitespace is ignored, so
/// `"Ethereum"`, `" ETHEREUM "` and `"ethereum"` all map to `"ethereum"`.
/// Applying the function twice yields the same value as applying it once.
pub fn normalize_chain(chain: &str) -> String {
	chain.trim().to_ascii_lowercase()
}
