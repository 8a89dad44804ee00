//! Configuration loading from files and environment.

use crate::types::Config;
use crate::ConfigError;
use regex::Regex;
use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
	Toml,
	Json,
	Yaml,
}

impl ConfigFormat {
	/// Picks the format from a file extension.
	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Ok(Self::Toml),
			Some("json") => Ok(Self::Json),
			Some("yaml") | Some("yml") => Ok(Self::Yaml),
			_ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
		}
	}
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			env_prefix: "CHAINS_UNION_".to_string(),
		}
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Loads, overrides and validates the configuration at `path`.
	pub fn from_file<P: AsRef<Path>>(&self, path: P) -> Result<Config, ConfigError> {
		let path = path.as_ref();
		info!("Loading configuration from {:?}", path);

		let format = ConfigFormat::from_path(path)?;
		let contents = std::fs::read_to_string(path)?;
		self.from_contents(&contents, format)
	}

	/// Same as `from_file` for an in-memory document.
	pub fn from_contents(&self, contents: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
		let substituted = substitute_env_vars(contents)?;

		let mut config: Config = match format {
			ConfigFormat::Toml => {
				toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))?
			}
			ConfigFormat::Json => serde_json::from_str(&substituted)
				.map_err(|e| ConfigError::ParseError(e.to_string()))?,
			ConfigFormat::Yaml => serde_yaml::from_str(&substituted)
				.map_err(|e| ConfigError::ParseError(e.to_string()))?,
		};

		config.normalize();
		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		debug!(chains = ?config.chains, "Configuration loaded");
		Ok(config)
	}

	fn apply_env_overrides(&self, config: &mut Config) -> Result<(), ConfigError> {
		if let Ok(host) = env::var(format!("{}HOST", self.env_prefix)) {
			debug!("Overriding server host from environment");
			config.server.host = host;
		}

		if let Ok(port) = env::var(format!("{}PORT", self.env_prefix)) {
			config.server.port = port
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid port: {}", e)))?;
		}

		if let Ok(level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			config.logging.level = level;
		}

		Ok(())
	}
}

/// Replaces every `${VAR_NAME}` with the value of the environment variable.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;

	let mut result = String::with_capacity(content.len());
	let mut last = 0;
	for cap in re.captures_iter(content) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};

		let env_value = env::var(var_name.as_str())
			.map_err(|_| ConfigError::EnvVarNotFound(var_name.as_str().to_string()))?;

		result.push_str(&content[last..full_match.start()]);
		result.push_str(&env_value);
		last = full_match.end();
	}

	let rest = &content[last..];
	if rest.contains("${") {
		return Err(ConfigError::ParseError(
			"Unterminated ${...} placeholder".to_string(),
		));
	}
	result.push_str(rest);

	Ok(result)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
	if config.chains.is_empty() {
		return Err(ConfigError::ValidationError(
			"At least one chain must be configured".to_string(),
		));
	}

	if config.server.port == 0 {
		return Err(ConfigError::ValidationError(
			"Server port must be non-zero".to_string(),
		));
	}

	for (chain, node) in &config.wallet_node {
		for (field, url) in [("rpc_url", &node.rpc_url), ("data_api_url", &node.data_api_url)] {
			if !(url.starts_with("http://") || url.starts_with("https://")) {
				return Err(ConfigError::ValidationError(format!(
					"{} for chain {} must start with http:// or https://",
					field, chain
				)));
			}
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const TOML: &str = r#"
chains = ["Ethereum", "solana"]

[server]
port = 9000

[wallet_node.Ethereum]
rpc_url = "https://eth.example.com"
data_api_url = "https://api.etherscan.io/api"
data_api_key = "key"
chain_id = 1
"#;

	#[test]
	fn test_toml_parsing_normalizes_names() {
		let config = ConfigLoader::new()
			.with_env_prefix("UNION_TEST_TOML_")
			.from_contents(TOML, ConfigFormat::Toml)
			.unwrap();

		assert_eq!(config.chains, vec!["ethereum", "solana"]);
		assert_eq!(config.server.port, 9000);
		assert_eq!(config.server.host, "0.0.0.0");
		assert_eq!(config.logging.level, "info");

		let node = config.node("ETHEREUM").unwrap();
		assert_eq!(node.rpc_url, "https://eth.example.com");
		assert_eq!(node.timeout_secs, 15);
		assert_eq!(node.max_retries, 3);
		assert_eq!(node.chain_id, Some(1));
	}

	#[test]
	fn test_yaml_file_with_env_substitution() {
		env::set_var("UNION_TEST_YAML_API_KEY", "secret-key");

		let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
		write!(
			file,
			r#"
chains:
  - ethereum
wallet_node:
  ethereum:
    rpc_url: "https://eth.example.com"
    data_api_url: "https://api.etherscan.io/api"
    data_api_key: "${{UNION_TEST_YAML_API_KEY}}"
"#
		)
		.unwrap();

		let config = ConfigLoader::new()
			.with_env_prefix("UNION_TEST_YAML_")
			.from_file(file.path())
			.unwrap();

		assert_eq!(config.node("ethereum").unwrap().data_api_key, "secret-key");
	}

	#[test]
	fn test_missing_env_var_fails() {
		let result = substitute_env_vars("key = \"${UNION_TEST_DEFINITELY_UNSET}\"");
		assert!(matches!(result, Err(ConfigError::EnvVarNotFound(name)) if name == "UNION_TEST_DEFINITELY_UNSET"));
	}

	#[test]
	fn test_substitutes_every_placeholder() {
		env::set_var("UNION_TEST_SUBST_HOST", "node.example.com");
		env::set_var("UNION_TEST_SUBST_KEY", "abc123");

		let result = substitute_env_vars(
			"rpc_url = \"https://${UNION_TEST_SUBST_HOST}/${UNION_TEST_SUBST_KEY}\"\nkey = \"${UNION_TEST_SUBST_KEY}\"",
		)
		.unwrap();

		assert_eq!(
			result,
			"rpc_url = \"https://node.example.com/abc123\"\nkey = \"abc123\""
		);
	}

	#[test]
	fn test_unterminated_placeholder_fails() {
		assert!(matches!(
			substitute_env_vars("key = \"${OPEN"),
			Err(ConfigError::ParseError(_))
		));
	}

	#[test]
	fn test_env_overrides() {
		env::set_var("UNION_TEST_OVR_PORT", "7001");
		env::set_var("UNION_TEST_OVR_LOG_LEVEL", "debug");

		let config = ConfigLoader::new()
			.with_env_prefix("UNION_TEST_OVR_")
			.from_contents(TOML, ConfigFormat::Toml)
			.unwrap();

		assert_eq!(config.server.port, 7001);
		assert_eq!(config.logging.level, "debug");
	}

	#[test]
	fn test_validation_rejects_empty_chains() {
		let result = ConfigLoader::new()
			.with_env_prefix("UNION_TEST_EMPTY_")
			.from_contents(r#"{"chains": []}"#, ConfigFormat::Json);
		assert!(matches!(result, Err(ConfigError::ValidationError(_))));
	}

	#[test]
	fn test_validation_rejects_bad_rpc_url() {
		let toml = r#"
chains = ["ethereum"]

[wallet_node.ethereum]
rpc_url = "ws://eth.example.com"
data_api_url = "https://api.etherscan.io/api"
"#;
		let result = ConfigLoader::new()
			.with_env_prefix("UNION_TEST_URL_")
			.from_contents(toml, ConfigFormat::Toml);

		match result {
			Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("rpc_url")),
			other => panic!("Expected validation error, got {:?}", other),
		}
	}

	#[test]
	fn test_unknown_extension() {
		let result = ConfigFormat::from_path(Path::new("config.ini"));
		assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
	}
}
