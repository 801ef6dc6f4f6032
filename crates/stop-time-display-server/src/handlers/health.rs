use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::StatusPoller;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// False when polls will answer "API URL not found."
    hub_configured: bool,
}

pub async fn health_check(State(poller): State<Arc<StatusPoller>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        hub_configured: poller.has_authority(),
    })
}
