use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use tally_core::{ServerConfig, logging};
use tally_server::{AppState, sample};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "tally", version, about = "Export tabular data as XLSX workbooks and PDF reports")]
struct Cli {
    /// JSON config file; missing files fall back to defaults.
    #[arg(long, global = true, env = "TALLY_CONFIG", default_value = "tally.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Listen port, overriding the config file and `PORT`.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Write the sample workbook to disk and exit.
    Sample {
        /// Output directory, overriding the config file.
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Also write the sample PDF report.
        #[arg(long)]
        with_pdf: bool,
    },
    /// Write the effective configuration to the config file and exit.
    InitConfig {
        /// Listen port to record in the file.
        #[arg(long)]
        port: Option<u16>,

        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Read the config file without logging, so a bad file can be reported once
/// logging is up. Falls back to defaults on any error.
fn load_config(path: &Path) -> (ServerConfig, Option<anyhow::Error>) {
    match ServerConfig::try_load(path) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (ServerConfig::default(), Some(e)),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn run_server(config: ServerConfig, port: Option<u16>) -> anyhow::Result<()> {
    let config = match port {
        Some(port) => config.with_port(port),
        None => config,
    };
    info!("Starting Tally v{VERSION}");
    tally_server::serve(AppState::new(config))
        .await
        .context("HTTP server failed")
}

async fn run_sample(config: ServerConfig, out_dir: Option<PathBuf>, with_pdf: bool) -> anyhow::Result<()> {
    let dir = out_dir.unwrap_or(config.output_dir);

    let path = sample::write_sample_workbook(&dir)
        .await
        .with_context(|| format!("Failed to write sample workbook to {}", dir.display()))?;
    info!("Excel file saved to {}", path.display());

    if with_pdf {
        let path = sample::write_sample_report(&dir)
            .await
            .with_context(|| format!("Failed to write sample report to {}", dir.display()))?;
        info!("PDF report saved to {}", path.display());
    }
    Ok(())
}

fn run_init_config(config: ServerConfig, path: &Path, port: Option<u16>, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to replace it", path.display());
    }
    let config = match port {
        Some(port) => config.with_port(port),
        None => config,
    };
    config.save_to_file(path)?;
    info!("Config written to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, load_error) = load_config(&cli.config);

    let _log_guard = logging::init_logging(config.log_dir.as_deref(), logging::DEFAULT_FILTER)
        .context("Failed to initialize logging")?;

    if let Some(e) = load_error {
        warn!("{e:#}, using defaults");
    }
    config.apply_env();

    let result = match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => run_server(config, port).await,
        Command::Sample { out_dir, with_pdf } => run_sample(config, out_dir, with_pdf).await,
        Command::InitConfig { port, force } => run_init_config(config, &cli.config, port, force),
    };

    if let Err(e) = &result {
        error!("{e:#}");
    }
    result
}
