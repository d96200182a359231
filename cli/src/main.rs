//! trustgate CLI - verify a remote agent against the on-chain trust registry.
//!
//! ```text
//! main() -> load config (.env, file, env overrides) -> command
//!     verify            -> run_gate()                -> TRUSTED | UNTRUSTED | ERROR: .. | not configured
//!     check <ADDRESS>   -> TrustService::query(addr) -> same verdict texts
//!     checksum <ADDR>   -> normalize_address()
//!     status            -> probe_registry()
//! ```
//!
//! Stdout carries only the result. Logs go to stderr, filtered by `RUST_LOG`.

mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use trustgate_chain::RpcClient;
use trustgate_config::{SettingsError, TrustGateConfig};
use trustgate_core::{GateVerdict, TrustService, probe_registry, run_gate};
use trustgate_types::normalize_address;

use report::{EXIT_ERROR, Reporter};

#[derive(Debug, Parser)]
#[command(name = "trustgate", version)]
#[command(about = "Check an on-chain trust registry before delegating to a remote agent")]
struct Cli {
    /// Config file to use instead of ~/.trustgate/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify the configured target address (exit 0 TRUSTED, 1 UNTRUSTED, 2 ERROR, 3 not configured)
    Verify,
    /// Query the registry for an explicit address
    Check { address: String },
    /// Print the EIP-55 checksummed form of an address
    Checksum { address: String },
    /// Probe the RPC endpoint and the deployed registry
    Status,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<TrustGateConfig> {
    let config = match path {
        Some(path) => TrustGateConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => TrustGateConfig::load()
            .context("failed to load config")?
            .unwrap_or_default(),
    };
    Ok(config.with_env_overrides())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut reporter = Reporter::stdout(cli.json);

    if let Command::Checksum { address } = &cli.command {
        let checksummed = normalize_address(address)
            .with_context(|| format!("invalid address {address:?}"))?;
        reporter.checksum(address, &checksummed)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Verify => {
            let verdict = run_gate(&config).await;
            Ok(reporter.verdict(&verdict, None)?)
        }
        Command::Check { address } => {
            let verdict = match TrustService::from_config(&config) {
                Ok(service) => GateVerdict::from_outcome(service.query(&address).await),
                Err(err) => err.into(),
            };
            Ok(reporter.verdict(&verdict, Some(&address))?)
        }
        Command::Status => {
            let settings = match config.chain_settings() {
                Ok(settings) => settings,
                Err(SettingsError::Missing(setting)) => {
                    let verdict = GateVerdict::NotConfigured(setting);
                    return Ok(reporter.verdict(&verdict, None)?);
                }
                Err(err) => return Err(err).context("invalid chain settings"),
            };
            let client = RpcClient::new(&settings).context("cannot create RPC client")?;
            let status = probe_registry(&client, &config.registry_settings()).await;
            Ok(reporter.status(&status)?)
        }
        Command::Checksum { .. } => Ok(ExitCode::SUCCESS),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // .env first so RUST_LOG and TRUSTGATE_* from it apply everywhere.
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("Error: {err:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
