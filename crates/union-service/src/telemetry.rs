//! Tracing subscriber setup.

use anyhow::{anyhow, Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use union_config::LoggingConfig;

/// Output settings for the process-wide subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
	/// Filter directives used when `RUST_LOG` is unset, e.g. `info` or `union_chains=debug`.
	pub level: String,
	pub json_format: bool,
}

impl Default for TelemetryConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			json_format: false,
		}
	}
}

impl TelemetryConfig {
	pub fn from_logging(logging: &LoggingConfig) -> Self {
		Self {
			level: logging.level.clone(),
			json_format: logging.json,
		}
	}

	/// Replaces the level when an override is given.
	pub fn with_level_override(mut self, level: Option<&str>) -> Self {
		if let Some(level) = level {
			self.level = level.to_string();
		}
		self
	}
}

/// Installs the global subscriber. `RUST_LOG` wins over `config.level`.
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(&config.level)
			.with_context(|| format!("Invalid log level {:?}", config.level))?,
	};

	let subscriber = tracing_subscriber::registry().with(filter);

	let result = if config.json_format {
		subscriber
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_current_span(true)
					.with_target(true),
			)
			.try_init()
	} else {
		subscriber
			.with(tracing_subscriber::fmt::layer().with_target(true))
			.try_init()
	};
	result.map_err(|e| anyhow!("Failed to initialize tracing: {}", e))?;

	info!(level = %config.level, json = config.json_format, "Tracing initialized");
	Ok(())
}
