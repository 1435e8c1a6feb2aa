use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake_core::config::{cors_origins_from_env_value, port_from_env_value};
use intake_core::constants::DEFAULT_SOCKET_HOST;
use intake_core::RelayConfig;

/// Main entry point for the intake relay
///
/// Starts the WebSocket relay and its readiness endpoint on one listener.
///
/// # Environment Variables
/// - `SOCKET_PORT`: Listen port (default: 3001)
/// - `SOCKET_HOST`: Listen host (default: "0.0.0.0")
/// - `SOCKET_CORS_ORIGIN`: `*` or a comma-separated list of allowed origins (default: "*")
///
/// # Returns
/// * `Ok(())` - If the relay starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the listener fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intake_relay=info".parse()?)
                .add_directive("intake_run=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = port_from_env_value(std::env::var("SOCKET_PORT").ok())?;
    let host = std::env::var("SOCKET_HOST").unwrap_or_else(|_| DEFAULT_SOCKET_HOST.into());
    let cors_origins = cors_origins_from_env_value(std::env::var("SOCKET_CORS_ORIGIN").ok());

    let cfg = RelayConfig::new(host, port, cors_origins)?;

    tracing::info!("++ Starting intake relay on {}", cfg.bind_addr());
    tracing::info!("CORS origin: {:?}", cfg.cors_origins());

    intake_relay::serve(cfg).await?;

    Ok(())
}
