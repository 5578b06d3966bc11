//! Back-office console gateway binary.

use backoffice_auth::config::AppConfig;
use backoffice_auth::state::AppState;
use clap::Parser;
use tracing::{info, warn};

/// Command-line overrides for the environment configuration.
#[derive(Parser, Debug)]
#[command(name = "backoffice-auth", about = "Back-office console auth gateway")]
struct Args {
    /// Port to listen on (overrides `CONSOLE_PORT`).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Configuration
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.listen_port = port;
    }

    match &config.api_base_url {
        Some(url) => info!(api_base_url = %url, variant = %config.login_variant, "identity provider configured"),
        None => warn!("API_BASE_URL is not set, every sign-in will fail"),
    }
    if config.session_secret.is_none() {
        warn!("SESSION_SECRET is not set, no session can be issued or read");
    }

    let listen_port = config.listen_port;
    let app = backoffice_auth::app(AppState::new(config));

    let addr = format!("0.0.0.0:{listen_port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(address = %addr, "console gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}
