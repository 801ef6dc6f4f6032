use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::HubConfig;

/// Key under which session metadata is merged into the hub user record.
pub const STOP_TIME_DISPLAY_KEY: &str = "stop-time-display";

pub const NO_AUTHORITY_MESSAGE: &str = "API URL not found.";

/// Session-lifetime metadata attached to every successful poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub server_name: String,
    pub timeout: String,
    pub max_age: String,
}

impl From<&HubConfig> for SessionMetadata {
    fn from(hub: &HubConfig) -> Self {
        Self {
            server_name: hub.server_name.clone(),
            timeout: hub.cull_timeout.clone(),
            max_age: hub.cull_max_age.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollResponse {
    /// Hub user record with [`SessionMetadata`] merged in.
    Status(Map<String, Value>),
    /// No hub API URL configured. Still served with HTTP 200.
    NoAuthority,
}

impl PollResponse {
    pub fn merged(mut record: Map<String, Value>, metadata: &SessionMetadata) -> Self {
        record.insert(STOP_TIME_DISPLAY_KEY.to_string(), json!(metadata));
        PollResponse::Status(record)
    }

    pub fn into_json(self) -> Value {
        match self {
            PollResponse::Status(record) => Value::Object(record),
            PollResponse::NoAuthority => json!({ "error": NO_AUTHORITY_MESSAGE }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Timeout,
    MaxAge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTimeEstimate {
    pub server_name: String,
    pub started: DateTime<Utc>,
    pub last_activity: Option<DateTime<Utc>>,
    pub idle_deadline: DateTime<Utc>,
    pub age_deadline: DateTime<Utc>,
    pub stop_at: DateTime<Utc>,
    pub reason: StopReason,
}
