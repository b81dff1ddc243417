//! Phonebook gateway: re-exposes a hosted-PBX user directory as JSON for a
//! web dashboard and as Yealink phonebook XML for desk phones.

use tokio::signal;
use tracing::info;

use phonebook_gateway::config::Config;
use phonebook_gateway::startup::build_app;
use phonebook_gateway::telemetry::setup_telemetry;

/// Build version.
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::init()?;
    setup_telemetry(&config);

    info!(
        version = VERSION,
        address = %config.listen_address,
        api_base_url = %config.api_base_url,
        account_id = %config.account_id,
        pid = std::process::id(),
        "Starting phonebook-gateway"
    );

    let (app, addr) = build_app(config).await?;

    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
