//! Hanabi Bridge binary entrypoint.
//!
//! Loads configuration, installs tracing, starts the lifecycle supervisor,
//! and serves the relay until Ctrl-C / SIGTERM.

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hanabi_bridge::adapters::websocket::{bind, relay_router, serve, shutdown_signal};
use hanabi_bridge::application::{LifecycleSupervisor, RelayHub};
use hanabi_bridge::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("hanabi-bridge: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.server);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.server.resolve_addr().await?;

    let hub = Arc::new(RelayHub::new(config.relay.welcome_message.clone()));
    let listener = bind(addr).await?;

    tracing::info!(%addr, "WebSocket server listening on port {}", addr.port());
    tracing::info!(
        "Sensor endpoint: ws://localhost:{}{}",
        addr.port(),
        config.relay.path
    );

    let supervisor = LifecycleSupervisor::new(
        hub.clone(),
        config.relay.reclaim_interval(),
        config.relay.report_interval(),
    )
    .spawn();

    let router = relay_router(hub, &config.relay.path);
    let result = serve(listener, router, shutdown_signal()).await;

    supervisor.abort();
    result?;
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` overrides the configured filter.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);
    if server.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
