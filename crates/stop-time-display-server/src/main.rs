use std::net::SocketAddr;

use anyhow::Result;
use tracing::{info, warn};

use stop_time_display_server::{
    build_router,
    config::{HubConfig, Settings},
    security::TokenValidator,
    services::StatusPoller,
    telemetry, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_telemetry();

    info!("Starting stop-time-display server...");

    let settings = Settings::load()?;
    let hub = HubConfig::from_env()?;
    info!("Configuration loaded");

    if hub.has_authority() {
        info!("Hub API at {}", hub.api_url);
    } else {
        warn!("JUPYTERHUB_API_URL is not set, polls will report \"API URL not found.\"");
    }

    let token_validator = TokenValidator::new(&settings.auth.token);
    if !token_validator.is_enabled() {
        warn!("No server token configured, authentication is disabled");
    }

    let base_url = settings.base_url(&hub.service_prefix);
    let state = AppState::new(StatusPoller::new(hub)?, token_validator);
    let app = build_router(state, &base_url);

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("Serving {}/stop-time-display/poll on {}", base_url, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
