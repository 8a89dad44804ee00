//! Configuration loading for the chains-union service.
//!
//! Configuration is read once at startup from a TOML, JSON or YAML file.
//! `${VAR}` placeholders are replaced with environment values before parsing,
//! and a few settings can be overridden through prefixed environment variables.

mod loader;
mod types;

pub use loader::{ConfigFormat, ConfigLoader};
pub use types::{Config, LoggingConfig, NodeConfig, ServerConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("Unsupported config format: {0}")]
	UnsupportedFormat(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}
