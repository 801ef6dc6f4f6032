use std::collections::HashMap;

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::state::AppState;
use crate::utils::error::ApiError;

/// Authentication middleware for the poll routes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let query = Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .map(|Query(params)| params)
        .unwrap_or_default();

    state
        .token_validator
        .validate(request.headers(), query.get("token").map(String::as_str))?;

    debug!("Authenticated request to {}", request.uri().path());
    Ok(next.run(request).await)
}
