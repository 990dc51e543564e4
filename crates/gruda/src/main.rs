use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use gruda::config::Config;
use gruda::dispatch::Dispatcher;
use gruda::healthcheck::{self, ProbeOutcome};
use gruda::llm::ProviderRegistry;
use gruda::server::{self, AppState};

#[derive(Parser)]
#[command(name = "gruda", version, about = "Multi-provider chat-completion relay")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP relay
    Serve {
        /// Path to the YAML config file
        #[arg(short, long, default_value = "gruda.yaml")]
        config: PathBuf,

        /// Override the listen host
        #[arg(long)]
        host: Option<String>,

        /// Override the listen port (also settable via PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Probe a running relay and report its health
    Check {
        /// Base URL of the relay
        #[arg(long, default_value = "http://localhost:3000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Serve { config, host, port } => {
            serve(config, host, port).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { url } => check(&url).await,
    }
}

async fn serve(path: PathBuf, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = Config::load(&path)
        .await
        .with_context(|| format!("failed to load config from {}", path.display()))?;

    if let Ok(value) = std::env::var("PORT") {
        config.server.port = value
            .parse()
            .with_context(|| format!("invalid PORT value '{value}'"))?;
    }
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let registry = ProviderRegistry::from_config(&config.providers);
    let dispatcher = Dispatcher::new(registry, &config.dispatch);
    let app = server::build_app(
        AppState::new(dispatcher),
        config.server.request_timeout_seconds,
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, providers = config.providers.len(), "Relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server closed gracefully");
    Ok(())
}

async fn check(url: &str) -> Result<ExitCode> {
    let client = reqwest::Client::new();
    let results = healthcheck::run_checks(&client, url).await;

    for result in &results {
        let (name, url) = (result.name, &result.url);
        match &result.outcome {
            ProbeOutcome::Healthy { status, reported } => {
                let reported = reported.as_deref().unwrap_or("-");
                println!("HEALTHY   {name} {url} ({status}, {reported})");
            }
            ProbeOutcome::Warning { status } => {
                println!("WARNING   {name} {url} ({status})");
            }
            ProbeOutcome::Unhealthy { status } => {
                println!("UNHEALTHY {name} {url} ({status})");
            }
            ProbeOutcome::Unreachable { error } => {
                println!("UNHEALTHY {name} {url} ({error})");
            }
        }
    }

    let healthy = results.iter().filter(|r| r.is_healthy()).count();
    println!("{healthy}/{} checks healthy", results.len());

    Ok(if healthy == results.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("gruda=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gruda=info,tower_http=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
