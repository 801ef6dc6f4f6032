use axum::{body::Body, http::Request, middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Span;

use crate::handlers;
use crate::security;
use crate::state::AppState;

/// Mounts the poll routes under `base_url` (already normalized, "" for root).
pub fn build_router(state: AppState, base_url: &str) -> Router {
    // Public routes (no auth)
    let public_routes = Router::new().route("/health", get(handlers::health::health_check));

    let protected_routes = Router::new()
        .route(
            &format!("{}/stop-time-display/poll", base_url),
            get(handlers::poll::poll_handler),
        )
        .route(
            &format!("{}/stop-time-display/stop-time", base_url),
            get(handlers::poll::stop_time_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
}

/// Request span with the path only; the query string may carry the server token.
fn request_span(request: &Request<Body>) -> Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        version = ?request.version(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_request_span_omits_query_string() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let request = Request::builder()
            .uri("/stop-time-display/poll?token=server-secret")
            .body(Body::empty())
            .unwrap();

        tracing::subscriber::with_default(subscriber, || {
            let span = request_span(&request);
            let _guard = span.enter();
            tracing::debug!("handled");
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("/stop-time-display/poll"));
        assert!(!output.contains("server-secret"));
    }
}
