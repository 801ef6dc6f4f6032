use anyhow::{Context, Result};
use reqwest::{header::AUTHORIZATION, Client};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::config::HubConfig;
use crate::models::{PollResponse, SessionMetadata};
use crate::utils::error::ApiError;

/// Message returned to callers when the hub call fails. Details go to the log only.
pub const HUB_FAILURE_MESSAGE: &str = "Hub API request failed";

/// Fetches the current user record from the hub and attaches session metadata.
#[derive(Clone)]
pub struct StatusPoller {
    client: Client,
    hub: HubConfig,
    metadata: SessionMetadata,
}

impl StatusPoller {
    pub fn new(hub: HubConfig) -> Result<Self> {
        // No request timeout: the transport defaults bound the hub call.
        let client = Client::builder()
            .user_agent(concat!("stop-time-display/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build hub HTTP client")?;
        Ok(Self::with_client(client, hub))
    }

    pub fn with_client(client: Client, hub: HubConfig) -> Self {
        let metadata = SessionMetadata::from(&hub);
        Self {
            client,
            hub,
            metadata,
        }
    }

    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    pub fn has_authority(&self) -> bool {
        self.hub.has_authority()
    }

    /// One poll round trip. `NoAuthority` is returned without touching the network.
    pub async fn poll(&self) -> Result<PollResponse, ApiError> {
        match self.fetch_user().await? {
            Some(record) => Ok(PollResponse::merged(record, &self.metadata)),
            None => Ok(PollResponse::NoAuthority),
        }
    }

    /// Raw hub user record, or `None` when no hub API URL is configured.
    pub async fn fetch_user(&self) -> Result<Option<Map<String, Value>>, ApiError> {
        if !self.hub.has_authority() {
            debug!("JUPYTERHUB_API_URL is not set, skipping hub request");
            return Ok(None);
        }

        self.fetch_user_internal().await.map(Some).map_err(|e| {
            error!("Hub user request failed: {:#}", e);
            ApiError::InternalError(HUB_FAILURE_MESSAGE.to_string())
        })
    }

    async fn fetch_user_internal(&self) -> Result<Map<String, Value>> {
        let url = self.hub.user_endpoint();
        debug!("Polling hub user endpoint {}", url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("token {}", self.hub.api_token))
            .send()
            .await
            .context("Failed to connect to hub API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Hub API error ({}): {}", status, body);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read hub API response body")?;

        let value: Value = serde_json::from_slice(&bytes)
            .context("Failed to parse hub API response as JSON")?;

        match value {
            Value::Object(record) => Ok(record),
            other => anyhow::bail!("Hub API returned a non-object JSON value: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hub_for(api_url: &str, token: &str) -> HubConfig {
        HubConfig::from_vars([
            ("JUPYTERHUB_API_URL", api_url),
            ("JUPYTERHUB_API_TOKEN", token),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_no_authority_returns_error_payload() {
        let poller = StatusPoller::new(hub_for("", "secret")).unwrap();
        let response = poller.poll().await.unwrap();

        assert_eq!(response, PollResponse::NoAuthority);
        assert_eq!(
            response.into_json(),
            json!({ "error": "API URL not found." })
        );
    }

    #[tokio::test]
    async fn test_poll_merges_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "token secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "alice" })))
            .expect(1)
            .mount(&server)
            .await;

        let poller = StatusPoller::new(hub_for(&server.uri(), "secret")).unwrap();
        let body = poller.poll().await.unwrap().into_json();

        assert_eq!(
            body,
            json!({
                "name": "alice",
                "stop-time-display": {
                    "server_name": "",
                    "timeout": "3600",
                    "max_age": "28800"
                }
            })
        );
    }

    #[tokio::test]
    async fn test_empty_token_still_sends_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let poller = StatusPoller::new(hub_for(&server.uri(), "")).unwrap();
        poller.poll().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let value = requests[0]
            .headers
            .get("authorization")
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(value.trim_end(), "token");
    }

    #[tokio::test]
    async fn test_non_json_body_is_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let poller = StatusPoller::new(hub_for(&server.uri(), "secret")).unwrap();
        let err = poller.poll().await.unwrap_err();
        assert!(matches!(err, ApiError::InternalError(_)));
    }

    #[tokio::test]
    async fn test_non_object_json_is_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["alice"])))
            .mount(&server)
            .await;

        let poller = StatusPoller::new(hub_for(&server.uri(), "secret")).unwrap();
        let err = poller.poll().await.unwrap_err();
        assert!(matches!(err, ApiError::InternalError(_)));
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(403).set_body_string("token lacks scope"))
            .expect(1)
            .mount(&server)
            .await;

        let poller = StatusPoller::new(hub_for(&server.uri(), "bad")).unwrap();
        match poller.poll().await {
            Err(ApiError::InternalError(msg)) => assert_eq!(msg, HUB_FAILURE_MESSAGE),
            other => panic!("expected internal error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_hub_hides_url() {
        let poller =
            StatusPoller::new(hub_for("http://127.0.0.1:1/internal-hub", "secret")).unwrap();
        match poller.poll().await {
            Err(ApiError::InternalError(msg)) => {
                assert_eq!(msg, HUB_FAILURE_MESSAGE);
                assert!(!msg.contains("internal-hub"));
            }
            other => panic!("expected internal error, got {:?}", other),
        }
    }
}
