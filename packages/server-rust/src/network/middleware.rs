//! HTTP middleware for the `depot` server.
//!
//! Layers are listed outer to inner: the first one sees the request first
//! and the response last.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::header::HeaderName;
use http::{Method, StatusCode};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::config::NetworkConfig;
use super::error::ErrorMessage;
use super::shutdown::ShutdownController;

/// Header carrying the per-request UUID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The composed layer type produced by [`build_http_layers`].
type HttpLayers = tower::layer::util::Stack<
    PropagateRequestIdLayer,
    tower::layer::util::Stack<
        TimeoutLayer,
        tower::layer::util::Stack<
            CorsLayer,
            tower::layer::util::Stack<
                CompressionLayer,
                tower::layer::util::Stack<
                    TraceLayer<
                        tower_http::classify::SharedClassifier<
                            tower_http::classify::ServerErrorsAsFailures,
                        >,
                    >,
                    tower::layer::util::Stack<
                        SetRequestIdLayer<MakeRequestUuid>,
                        tower::layer::util::Identity,
                    >,
                >,
            >,
        >,
    >,
>;

/// Builds the transport-level middleware stack.
///
/// **Order (outermost to innermost):**
/// 1. `SetRequestId` -- UUID v4 `x-request-id` on every request
/// 2. `Tracing` -- one span per request, response logged at INFO
/// 3. `Compression` -- gzip responses
/// 4. `CORS` -- configured origins
/// 5. `Timeout` -- 408 once `request_timeout` elapses
/// 6. `PropagateRequestId` -- echoes `x-request-id` on the response
#[must_use]
pub fn build_http_layers(config: &NetworkConfig) -> HttpLayers {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&config.cors_origins))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(PropagateRequestIdLayer::new(x_request_id))
        .into_inner()
}

/// A wildcard `"*"` allows any origin; otherwise only the parseable entries.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any)
}

/// Counts the request as in flight for the duration of the handler.
///
/// Once shutdown has begun, new requests are answered with 503 so the drain
/// only waits for work that was already admitted.
pub async fn track_in_flight(
    State(shutdown): State<Arc<ShutdownController>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(_guard) = shutdown.try_track() else {
        let status = StatusCode::SERVICE_UNAVAILABLE;
        return (
            status,
            Json(ErrorMessage::new(status, "Server is shutting down", None)),
        )
            .into_response();
    };
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    fn tracked_router(shutdown: Arc<ShutdownController>) -> Router {
        let tracker = Arc::clone(&shutdown);
        Router::new()
            .route(
                "/work",
                get(move || {
                    let tracker = Arc::clone(&tracker);
                    async move { tracker.in_flight_count().to_string() }
                }),
            )
            .layer(axum::middleware::from_fn_with_state(shutdown, track_in_flight))
    }

    fn get_work() -> Request {
        Request::builder().uri("/work").body(Body::empty()).unwrap()
    }

    #[test]
    fn layers_build_with_defaults_and_custom_timeout() {
        let _defaults = build_http_layers(&NetworkConfig::default());
        let _custom = build_http_layers(&NetworkConfig {
            request_timeout: Duration::from_secs(5),
            ..NetworkConfig::default()
        });
    }

    #[test]
    fn cors_accepts_wildcard_and_lists() {
        let _any = build_cors_layer(&["*".to_string()]);
        let _list = build_cors_layer(&[
            "http://localhost:3000".to_string(),
            "https://example.com".to_string(),
        ]);
    }

    #[tokio::test]
    async fn counts_request_while_handler_runs() {
        let shutdown = Arc::new(ShutdownController::new());
        shutdown.set_ready();

        let response = tracked_router(Arc::clone(&shutdown))
            .oneshot(get_work())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"1");
        assert_eq!(shutdown.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn refuses_requests_while_draining() {
        let shutdown = Arc::new(ShutdownController::new());
        shutdown.set_ready();
        shutdown.trigger_shutdown();

        let response = tracked_router(Arc::clone(&shutdown))
            .oneshot(get_work())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(build_http_layers(&NetworkConfig::default()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }
}
