//! Projected stop time of the current server.
//!
//! The hub culls a server when it has been idle for `timeout` seconds or has
//! been running for `max_age` seconds, whichever comes first.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Value};

use crate::models::{SessionMetadata, StopReason, StopTimeEstimate};
use crate::utils::error::ApiError;

pub fn estimate(
    record: &Map<String, Value>,
    metadata: &SessionMetadata,
) -> Result<StopTimeEstimate, ApiError> {
    let servers = record
        .get("servers")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            ApiError::Forbidden(
                "can't access server data, check if the API token has 'read:servers!server' scope"
                    .to_string(),
            )
        })?;

    let server = servers
        .get(&metadata.server_name)
        .and_then(Value::as_object)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "server '{}' is not listed for this user",
                metadata.server_name
            ))
        })?;

    let started = timestamp_field(server, "started")?.ok_or_else(|| {
        ApiError::BadGateway("server entry has no 'started' timestamp".to_string())
    })?;
    let last_activity = timestamp_field(server, "last_activity")?;

    let timeout = seconds(&metadata.timeout, "timeout")?;
    let max_age = seconds(&metadata.max_age, "max_age")?;

    let idle_deadline = add(last_activity.unwrap_or(started), timeout)?;
    let age_deadline = add(started, max_age)?;

    let (stop_at, reason) = if idle_deadline < age_deadline {
        (idle_deadline, StopReason::Timeout)
    } else {
        (age_deadline, StopReason::MaxAge)
    };

    Ok(StopTimeEstimate {
        server_name: metadata.server_name.clone(),
        started,
        last_activity,
        idle_deadline,
        age_deadline,
        stop_at,
        reason,
    })
}

fn timestamp_field(
    server: &Map<String, Value>,
    field: &str,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    match server.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| ApiError::BadGateway(format!("invalid '{}' timestamp {:?}: {}", field, raw, e))),
        Some(other) => Err(ApiError::BadGateway(format!(
            "'{}' is not a timestamp string: {}",
            field, other
        ))),
    }
}

fn seconds(raw: &str, name: &str) -> Result<TimeDelta, ApiError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .and_then(|secs| TimeDelta::try_seconds(i64::from(secs)))
        .ok_or_else(|| {
            ApiError::InternalError(format!(
                "cull {} must be a whole number of seconds, got {:?}",
                name, raw
            ))
        })
}

fn add(at: DateTime<Utc>, delta: TimeDelta) -> Result<DateTime<Utc>, ApiError> {
    at.checked_add_signed(delta)
        .ok_or_else(|| ApiError::InternalError("stop time out of range".to_string()))
}
