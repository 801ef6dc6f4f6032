use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::debug;

use crate::models::PollResponse;
use crate::services::{cull, StatusPoller};
use crate::utils::error::ApiError;

/// `GET <base_url>/stop-time-display/poll`
pub async fn poll_handler(
    State(poller): State<Arc<StatusPoller>>,
) -> Result<Json<Value>, ApiError> {
    let response = poller.poll().await?;
    if let PollResponse::Status(_) = &response {
        debug!("Poll answered for server '{}'", poller.metadata().server_name);
    }
    Ok(Json(response.into_json()))
}

/// `GET <base_url>/stop-time-display/stop-time`
pub async fn stop_time_handler(
    State(poller): State<Arc<StatusPoller>>,
) -> Result<Json<Value>, ApiError> {
    let Some(record) = poller.fetch_user().await? else {
        return Ok(Json(PollResponse::NoAuthority.into_json()));
    };

    let estimate = cull::estimate(&record, poller.metadata())?;
    debug!("Server '{}' stops at {}", estimate.server_name, estimate.stop_at);

    serde_json::to_value(&estimate)
        .map(Json)
        .map_err(|e| ApiError::InternalError(e.to_string()))
}
