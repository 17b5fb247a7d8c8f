use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use m2bar::config::AppConfig;
use std::path::PathBuf;
use std::process::ExitCode;

/// m2bar - status line generator for i3bar and swaybar
#[derive(Parser, Debug, Clone)]
#[command(name = "m2bar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to load instead of the default location
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// List the available source kinds and exit
    #[arg(long = "list-sources")]
    list_sources: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries the protocol, so all logging goes to stderr
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .target(env_logger::Target::Stderr)
        .init();

    m2bar_sources::register_all();

    if cli.list_sources {
        let registry = m2bar_core::global_registry()
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for kind in registry.list_sources() {
            println!("{}", kind);
        }
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = match cli.config {
        Some(path) => path,
        None => AppConfig::default_path()?,
    };
    info!("Loading config from {}", path.display());
    let config = AppConfig::load_from_path(&path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async {
        info!("Starting m2bar v{}", env!("CARGO_PKG_VERSION"));
        m2bar::app::run(&config, tokio::io::stdout(), shutdown_signal()).await
    })
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
