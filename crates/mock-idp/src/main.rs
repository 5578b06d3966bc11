//! Mock identity provider binary for local development.

use mock_idp::{router, IdpState, SigningKeys};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("MOCK_IDP_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4000);
    let issuer =
        std::env::var("MOCK_IDP_ISSUER").unwrap_or_else(|_| format!("http://localhost:{port}"));

    info!("generating RSA-2048 signing key");
    let keys = SigningKeys::rsa(2048)?;

    let app = router(IdpState::new(keys, issuer.clone()));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(%issuer, port, "mock identity provider listening");
    axum::serve(listener, app).await?;

    Ok(())
}
