//! # Quill Relay
//!
//! Serves `/api/paraphrase` and `/api/health`, plus the prebuilt front-end
//! bundle for every other path.
//!
//! ## Architecture
//! ```text
//! Browser → Quill Relay → Completion provider (OpenAI-compatible)
//!               ↓
//!        Rate-limit store (memory | Redis)
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use relay::config::{AppConfig, ConfigOverrides, Environment};
use relay::routes;
use relay::state::AppState;

/// Quill Relay - paraphrase request relay
#[derive(Parser, Debug)]
#[command(name = "quill-relay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/relay.toml")]
    config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Listen port; keeps the configured host (overrides config)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Deployment mode: production or development
    #[arg(long, env = "APP_ENV")]
    environment: Option<Environment>,

    /// Completion provider credential
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Redis URL for shared rate-limit counters (overrides config)
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            listen_addr: self.listen.clone(),
            port: self.port,
            environment: self.environment,
            openai_api_key: self.openai_api_key.clone(),
            redis_url: self.redis_url.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env-backed flags
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Quill Relay v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&args.config, &args.overrides())?;
    info!(
        environment = ?config.environment,
        origins = ?config.allowed_origins(),
        "Configuration loaded from {}",
        args.config
    );
    for warning in config.deployment_warnings() {
        tracing::warn!("{warning}");
    }
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; paraphrase requests will fail with 500");
    }

    let state = AppState::new(config.clone()).await?;
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Relay listening on {}", config.listen_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Relay shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM; in-flight requests are then drained.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests");
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}
