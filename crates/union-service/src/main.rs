use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use union_chains::{default_factories, SUPPORTED_CHAINS};
use union_config::{Config, ConfigLoader};
use union_dispatcher::{AdaptorRegistry, ChainDispatcher};
use union_service::{init_tracing, serve, TelemetryConfig};
use union_types::normalize_chain;

#[derive(Parser)]
#[command(name = "chains-union")]
#[command(about = "Multi-chain wallet RPC service", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Path to configuration file
	#[arg(short, long, value_name = "FILE", env = "CHAINS_UNION_CONFIG", default_value = "config/chains-union.toml")]
	config: PathBuf,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(long)]
	log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the RPC service
	Start,
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = ConfigLoader::new()
		.from_file(&cli.config)
		.with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

	let telemetry =
		TelemetryConfig::from_logging(&config.logging).with_level_override(cli.log_level.as_deref());
	init_tracing(&telemetry)?;

	match cli.command {
		Some(Commands::Start) | None => start_service(config).await,
		Some(Commands::Validate) => validate_config(&config),
	}
}

fn build_registry(config: &Config) -> Result<AdaptorRegistry> {
	let registry = AdaptorRegistry::build(&config.chains, &default_factories(config))
		.context("Failed to build adaptor registry")?;

	if registry.is_empty() {
		bail!(
			"None of the configured chains {:?} is supported (supported: {:?})",
			config.chains,
			SUPPORTED_CHAINS
		);
	}
	Ok(registry)
}

async fn start_service(config: Config) -> Result<()> {
	info!("Starting chains-union service");

	let registry = build_registry(&config)?;
	info!(chains = ?registry.chains(), "Adaptor registry ready");

	let dispatcher = ChainDispatcher::new(Arc::new(registry));
	serve(&config.server, dispatcher).await?;

	info!("chains-union service stopped");
	Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
	info!("Validating configuration");

	for chain in &config.chains {
		if !SUPPORTED_CHAINS.contains(&normalize_chain(chain).as_str()) {
			warn!(chain = %chain, "Configured chain has no adaptor and will be skipped");
		}
	}

	let registry = build_registry(config)?;

	info!("Configuration is valid");
	info!("HTTP listener: {}:{}", config.server.host, config.server.port);
	for chain in registry.chains() {
		if let Some(node) = config.node(&chain) {
			info!("  {}: rpc {} (chain id {:?})", chain, node.rpc_url, node.chain_id);
		}
	}

	Ok(())
}
