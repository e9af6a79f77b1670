//! Billing Relay Server
//!
//! Relays subscription billing calls to Stripe and logs its webhooks.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use billing_relay::stripe::client::DEFAULT_API_BASE;
use billing_relay::{app_router, AppState};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Billing Relay Server
#[derive(Parser, Debug)]
#[command(name = "billing-relay")]
#[command(version)]
#[command(about = "Relays subscription billing operations to Stripe")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "4242")]
    port: u16,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Environment file loaded before reading configuration
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (env_file, filter) = load_env_and_filter(&args.env_file, args.verbose);
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match env_file {
        Ok(()) => tracing::debug!(path = %args.env_file.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {
            tracing::debug!(path = %args.env_file.display(), "No environment file")
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading {}", args.env_file.display()));
        }
    }

    let state = AppState::from_env().context("building billing relay state")?;

    if state.verifier.is_none() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set; webhook signatures will not be verified");
    }

    tracing::info!(
        domain = %state.config.domain,
        static_dir = %state.config.static_dir.display(),
        api_base = state
            .config
            .api_base
            .as_ref()
            .map_or(DEFAULT_API_BASE, |base| base.as_str()),
        "Billing relay configured"
    );

    let app = app_router(Arc::new(state));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!("Billing relay listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("Billing relay stopped");
    Ok(())
}

/// Load `env_file`, then build the log filter so a `RUST_LOG` set in the
/// file is honored. RUST_LOG wins over `--verbose`.
fn load_env_and_filter(env_file: &Path, verbose: bool) -> (dotenvy::Result<()>, EnvFilter) {
    let loaded = dotenvy::from_path(env_file);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    (loaded, filter)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_file_log_level_reaches_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "RUST_LOG=billing_relay=trace\n").unwrap();
        std::env::remove_var("RUST_LOG");

        let (loaded, filter) = load_env_and_filter(&path, false);
        assert!(loaded.is_ok());
        assert_eq!(filter.to_string(), "billing_relay=trace");
    }

    #[test]
    fn test_missing_env_file_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (loaded, _filter) = load_env_and_filter(&dir.path().join("absent.env"), true);
        assert!(loaded.unwrap_err().not_found());
    }
}
