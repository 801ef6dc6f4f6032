use std::sync::Arc;

use axum::extract::FromRef;

use crate::security::TokenValidator;
use crate::services::StatusPoller;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub poller: Arc<StatusPoller>,
    pub token_validator: Arc<TokenValidator>,
}

impl AppState {
    pub fn new(poller: StatusPoller, token_validator: TokenValidator) -> Self {
        Self {
            poller: Arc::new(poller),
            token_validator: Arc::new(token_validator),
        }
    }
}

impl FromRef<AppState> for Arc<StatusPoller> {
    fn from_ref(state: &AppState) -> Self {
        state.poller.clone()
    }
}
