use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::{debug, warn};

use crate::utils::error::ApiError;

/// Checks the server token a caller presents.
///
/// Accepted forms: `Authorization: token <t>`, `Authorization: Bearer <t>`,
/// and a `token=<t>` query parameter.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    expected_token: Option<String>,
}

impl TokenValidator {
    pub fn new(token: &str) -> Self {
        let expected_token = if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        };
        Self { expected_token }
    }

    pub fn is_enabled(&self) -> bool {
        self.expected_token.is_some()
    }

    pub fn validate(&self, headers: &HeaderMap, query_token: Option<&str>) -> Result<(), ApiError> {
        let Some(expected) = self.expected_token.as_deref() else {
            return Ok(());
        };

        let presented = header_token(headers)
            .or(query_token)
            .ok_or_else(|| ApiError::Unauthorized("Missing server token".to_string()))?;

        if !constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
            warn!("Rejected request with invalid server token");
            return Err(ApiError::Unauthorized("Invalid server token".to_string()));
        }

        debug!("Server token validated");
        Ok(())
    }
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn header_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim())
    } else {
        None
    }
}
