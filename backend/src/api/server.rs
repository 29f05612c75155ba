//! HTTP server for the ingress API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/transform`  | Transform one vehicle event          |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |
//!
//! The optional `x-tracking-string` request header becomes the
//! source tracking header of the produced message.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, LOG_BROADCASTER};
use super::types::{error_response, TransformResponse};
use crate::config::IngressConfig;
use crate::error::{AssemblyError, PipelineError, ServerResult};
use crate::transform::pipeline::{process_bytes, IngressOptions};

/// Request header carrying the upstream tracking string
pub const TRACKING_HEADER: &str = "x-tracking-string";

struct AppState {
    config: IngressConfig,
}

/// Build the router with its shared, read-only configuration
pub fn router(config: IngressConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(allowed_headers())
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/transform", post(transform_event))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(Arc::new(AppState { config }))
}

/// Request headers a browser client may send cross-origin
fn allowed_headers() -> [HeaderName; 3] {
    [
        header::CONTENT_TYPE,
        header::ACCEPT,
        HeaderName::from_static(TRACKING_HEADER),
    ]
}

/// Start the HTTP server
pub async fn start_server(port: u16, config: IngressConfig) -> ServerResult<()> {
    let app = router(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Vehicle ingress running on http://localhost:{}", port);
    println!("   POST /api/transform - Transform a vehicle event");
    println!("   GET  /api/logs      - SSE log stream");
    println!("   GET  /health        - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "vehicle-ingress",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "transform": "POST /api/transform",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Transform endpoint
async fn transform_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TransformResponse>, (StatusCode, Json<Value>)> {
    let tracking = headers
        .get(TRACKING_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    log_info(format!("📄 New event ({} bytes)", body.len()));

    let options = IngressOptions {
        config: state.config.clone(),
        tracking,
        skip_validation: false,
    };

    let output = process_bytes(&body, &options)
        .map_err(|e| (status_for(&e), Json(error_response(&e.to_string()))))?;

    Ok(Json(TransformResponse::from(output)))
}

/// HTTP status for a failed pipeline run
fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Assembly(AssemblyError::EmptyPayload) => StatusCode::BAD_REQUEST,
        PipelineError::Assembly(AssemblyError::MalformedRecord { .. })
        | PipelineError::Payload(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Config(_) | PipelineError::Validation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::tests::sample_event;
    use axum::http::HeaderValue;

    fn state() -> State<Arc<AppState>> {
        State(Arc::new(AppState {
            config: IngressConfig::default(),
        }))
    }

    #[tokio::test]
    async fn test_transform_endpoint() {
        let mut headers = HeaderMap::new();
        headers.insert(TRACKING_HEADER, HeaderValue::from_static("trace-7"));
        let body = Bytes::from(serde_json::to_vec(&sample_event()).unwrap());

        let Json(response) = transform_event(state(), headers, body).await.unwrap();

        assert_eq!(response.status, "ready");
        assert_eq!(response.headers["BMW-DVF-Source-Tracking-String"], "trace-7");
        assert_eq!(response.documents[0].children.len(), 2);
        assert_eq!(response.metadata.total_quantity, 10);
    }

    #[tokio::test]
    async fn test_empty_body_is_bad_request() {
        let err = transform_event(state(), HeaderMap::new(), Bytes::new())
            .await
            .unwrap_err();

        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1 .0["status"], "error");
    }

    #[tokio::test]
    async fn test_malformed_event_is_unprocessable() {
        let err = transform_event(state(), HeaderMap::new(), Bytes::from_static(b"{\"a\": 1}"))
            .await
            .unwrap_err();

        assert_eq!(err.0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_quantity_overflow_is_unprocessable() {
        let mut event = sample_event();
        let demands = &mut event["actualCustomerOrderMaterial"]["plannedOrders"][1]["demands"];
        demands[0]["quantity"] = json!(u64::MAX);
        let body = Bytes::from(serde_json::to_vec(&event).unwrap());

        let err = transform_event(state(), HeaderMap::new(), body).await.unwrap_err();

        assert_eq!(err.0, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.1 .0["error"].as_str().unwrap().contains("quantity overflow"));
    }

    #[test]
    fn test_cors_allows_tracking_header() {
        let headers = allowed_headers();
        assert!(headers.iter().any(|h| h.as_str() == TRACKING_HEADER));
        assert!(headers.contains(&header::CONTENT_TYPE));
    }

    #[tokio::test]
    async fn test_health() {
        let Json(value) = health().await;
        assert_eq!(value["status"], "ok");
    }
}
