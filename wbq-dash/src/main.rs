//! wbq-dash - well-being questionnaire dashboard
//!
//! Reads aggregated survey statistics from the questionnaire API,
//! normalizes them onto a common 1–10 scale and serves a web dashboard.
//!
//! Configuration priority: command line > environment > TOML file >
//! compiled defaults.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wbq_common::cache::MemoryCache;
use wbq_common::config::{ConfigOverrides, DashboardConfig, DisplayScale};
use wbq_common::provider::{CachedStatsProvider, HttpStatsProvider, StatsProvider};
use wbq_common::SectionStat;
use wbq_dash::{build_router, AppState};

/// Command-line arguments for wbq-dash
#[derive(Parser, Debug)]
#[command(name = "wbq-dash")]
#[command(about = "Well-being questionnaire dashboard")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "WBQ_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the questionnaire statistics API
    #[arg(long, env = "WBQ_API_URL")]
    api_url: Option<String>,

    /// Address to listen on
    #[arg(long, env = "WBQ_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "WBQ_PORT")]
    port: Option<u16>,

    /// Seconds to reuse fetched statistics (0 disables caching)
    #[arg(long, env = "WBQ_CACHE_TTL")]
    cache_ttl: Option<u64>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, env = "WBQ_LOG_LEVEL")]
    log_level: Option<String>,

    /// Display scale: normalized (1–10) or raw (1–5)
    #[arg(long, env = "WBQ_SCALE", value_parser = parse_scale)]
    scale: Option<DisplayScale>,

    /// Compare respondents with the population by default
    #[arg(long, env = "WBQ_OVERLAY")]
    overlay: Option<bool>,
}

fn parse_scale(s: &str) -> Result<DisplayScale, String> {
    DisplayScale::from_str(s).ok_or_else(|| format!("expected 'normalized' or 'raw', got '{}'", s))
}

impl Args {
    fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config,
            api_url: self.api_url,
            bind: self.bind,
            port: self.port,
            cache_ttl_secs: self.cache_ttl,
            log_level: self.log_level,
            display_scale: self.scale,
            show_global_overlay: self.overlay,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config warnings are emitted before the configured subscriber exists
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        DashboardConfig::resolve(args.into_overrides())
    })
    .context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", config.log_level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any network activity
    info!(
        "Starting well-being dashboard (wbq-dash) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let normalizer = config
        .scoring
        .normalizer()
        .context("Invalid scoring configuration")?;
    info!(
        policy = normalizer.policy().as_str(),
        low = config.scoring.thresholds.low,
        high = config.scoring.thresholds.high,
        "Scoring configured"
    );

    let http = HttpStatsProvider::new(config.api_url.clone(), config.request_timeout)
        .context("Failed to build statistics API client")?;
    let provider: Arc<dyn StatsProvider> = Arc::new(CachedStatsProvider::new(
        Arc::new(http),
        Arc::new(MemoryCache::<Vec<SectionStat>>::new()),
        config.cache_ttl,
    ));
    info!("Statistics API: {}", provider.describe());

    let state = AppState::new(provider, normalizer, config.display.clone());
    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("wbq-dash listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
