//! HTTP surface of the gateway.
//!
//! Endpoints:
//! - `GET /health` - Gateway liveness and route count
//! - `GET /fallback/{service}` - Fallback body of a service (`users`, `orders`, `notifications`)
//! - anything else - routed through [`GatewayRouter`]

use crate::error::GatewayError;
use crate::router::GatewayRouter;
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::ServiceHealth;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers.
pub struct AppState {
    pub router: GatewayRouter,
    pub service_name: String,
    pub version: String,
}

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/fallback/{service}", get(fallback_handler))
        .fallback(proxy_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(Serialize)]
struct GatewayHealth {
    #[serde(flatten)]
    health: ServiceHealth,
    routes: usize,
}

/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(GatewayHealth {
        health: ServiceHealth::up(&state.service_name, &state.version),
        routes: state.router.table().len(),
    })
}

/// GET /fallback/{service}
async fn fallback_handler(
    State(state): State<Arc<AppState>>,
    Path(service): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .router
        .fallback(&service)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No fallback for service '{}'", service)))
}

async fn proxy_handler(State(state): State<Arc<AppState>>, request: Request) -> Result<Response, ApiError> {
    Ok(state.router.dispatch(request).await?)
}

// ============================================================================
// Error Handling
// ============================================================================

/// API error types.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::NoRoute(_) => ApiError::NotFound(e.to_string()),
            GatewayError::InvalidRequest(_) => ApiError::BadRequest(e.to_string()),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RouterConfig;
    use axum::body::Body;
    use axum::http::{HeaderMap, Method, Request, Uri};
    use axum::routing::any;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Value> {
        Json(json!({
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "requestId": headers.get("x-request-id").and_then(|v| v.to_str().ok()),
            "body": body,
        }))
    }

    /// Fake upstream serving orders, users and its own health on an ephemeral port.
    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route("/actuator/health", get(|| async { Json(json!({"status": "UP"})) }))
            .route("/api/orders", any(echo))
            .route("/api/orders/{*rest}", any(echo))
            .route(
                "/api/users/{id}",
                get(|| async { (StatusCode::NOT_FOUND, Json(json!({"error": "User not found"}))) }),
            )
            .route(
                "/api/users/overloaded",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
            )
            .route(
                "/api/users/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"}))) }),
            )
            .route(
                "/api/notifications/statistics",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Json(json!({}))
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        url
    }

    fn app(upstreams: Vec<String>) -> Router {
        let mut config = RouterConfig::default();
        config.upstream_timeout = Duration::from_millis(300);
        for service in &mut config.services {
            service.upstreams = upstreams.clone();
        }
        create_router(Arc::new(AppState {
            router: GatewayRouter::new(config).unwrap(),
            service_name: "gateway".to_string(),
            version: "1.0.0".to_string(),
        }))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    #[tokio::test]
    async fn test_unreachable_pool_returns_fallback() {
        let app = app(vec![closed_port_url()]);

        let (status, body) = get_json(&app, "/api/orders/5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "fallback");
        assert_eq!(body["service"], "order-service");
        assert!(body["message"].as_str().unwrap().contains("Order service"));

        let (status, body) = get_json(&app, "/health/users").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "user-service");
    }

    #[tokio::test]
    async fn test_forwards_method_query_headers_and_body() {
        let app = app(vec![spawn_upstream().await]);

        let request = Request::builder()
            .method("PUT")
            .uri("/api/orders/5/status?notify=true")
            .header("content-type", "application/json")
            .header("x-request-id", "req-1")
            .body(Body::from(r#"{"status":"SHIPPED"}"#))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["method"], "PUT");
        assert_eq!(body["path"], "/api/orders/5/status");
        assert_eq!(body["query"], "notify=true");
        assert_eq!(body["requestId"], "req-1");
        assert_eq!(body["body"], r#"{"status":"SHIPPED"}"#);
    }

    #[tokio::test]
    async fn test_health_route_rewrites_path() {
        let app = app(vec![spawn_upstream().await]);

        let (status, body) = get_json(&app, "/health/orders").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "UP");
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_relayed() {
        let app = app(vec![spawn_upstream().await]);

        let (status, body) = get_json(&app, "/api/users/77").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn test_upstream_unavailable_status_serves_fallback() {
        let app = app(vec![spawn_upstream().await]);

        let (status, body) = get_json(&app, "/api/users/overloaded").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "fallback");
        assert_eq!(body["service"], "user-service");

        let (status, body) = get_json(&app, "/api/users/broken").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "boom");
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out_to_fallback() {
        let app = app(vec![spawn_upstream().await]);

        let (status, body) = get_json(&app, "/api/notifications/statistics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "fallback");
        assert_eq!(body["service"], "notification-service");
    }

    #[tokio::test]
    async fn test_round_robin_alternates_members() {
        let app = app(vec![closed_port_url(), spawn_upstream().await]);

        let (_, first) = get_json(&app, "/api/orders/1").await;
        let (_, second) = get_json(&app, "/api/orders/1").await;
        assert_eq!(first["status"], "fallback");
        assert_eq!(second["path"], "/api/orders/1");
    }

    #[tokio::test]
    async fn test_unmatched_path_is_not_found() {
        let app = app(vec![closed_port_url()]);

        let (status, body) = get_json(&app, "/api/payments/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("/api/payments/1"));
    }

    #[tokio::test]
    async fn test_fallback_endpoint() {
        let app = app(Vec::new());

        let (status, body) = get_json(&app, "/fallback/users").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "fallback");
        assert_eq!(body["service"], "user-service");

        let (status, _) = get_json(&app, "/fallback/payments").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_gateway_health() {
        let app = app(Vec::new());

        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "UP");
        assert_eq!(body["service"], "gateway");
        assert_eq!(body["routes"], 6);
    }
}
