//! HTTP API handlers and routes using axum.
//!
//! Routes:
//! - GET /actuator/health - Liveness probe used by the gateway
//! - GET /api/notifications/health - Service health
//! - POST /api/notifications/send - Send one notification
//! - POST /api/notifications/send/batch - Send to several recipients
//! - GET /api/notifications/history/{recipient} - Recipient history (oldest first)
//! - GET /api/notifications/statistics - Delivery statistics

use crate::dispatcher::NotificationDispatcher;
use crate::types::{DeliveryStatistics, NotificationRecord, NotificationType};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use common::{now_millis, ServiceHealth};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers.
pub struct AppState {
    pub dispatcher: Arc<NotificationDispatcher>,
    pub service_name: String,
    pub version: String,
}

/// Create the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/actuator/health", get(health_handler))
        .route("/api/notifications/health", get(health_handler))
        .route("/api/notifications/send", post(send_handler))
        .route("/api/notifications/send/batch", post(send_batch_handler))
        .route("/api/notifications/history/{recipient}", get(history_handler))
        .route("/api/notifications/statistics", get(statistics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub recipient: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchSendRequest {
    pub recipients: Vec<String>,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSendResponse {
    pub total_recipients: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatisticsResponse {
    #[serde(flatten)]
    pub statistics: DeliveryStatistics,
    pub timestamp: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/notifications/health
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ServiceHealth::up(&state.service_name, &state.version))
}

/// POST /api/notifications/send
async fn send_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendRequest>,
) -> Json<SendResponse> {
    let success = state
        .dispatcher
        .send(&req.recipient, req.kind, &req.title, &req.content)
        .await;

    let message = if success {
        "Notification sent successfully"
    } else {
        "Notification delivery failed"
    };

    Json(SendResponse {
        success,
        message: message.to_string(),
        timestamp: now_millis(),
    })
}

/// POST /api/notifications/send/batch
async fn send_batch_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchSendRequest>,
) -> Json<BatchSendResponse> {
    let success_count = state
        .dispatcher
        .send_batch(&req.recipients, req.kind, &req.title, &req.content)
        .await;

    Json(BatchSendResponse {
        total_recipients: req.recipients.len(),
        success_count,
        failure_count: req.recipients.len() - success_count,
        timestamp: now_millis(),
    })
}

/// GET /api/notifications/history/{recipient}
async fn history_handler(
    State(state): State<Arc<AppState>>,
    Path(recipient): Path<String>,
) -> Json<Vec<NotificationRecord>> {
    Json(state.dispatcher.history(&recipient))
}

/// GET /api/notifications/statistics
async fn statistics_handler(State(state): State<Arc<AppState>>) -> Json<StatisticsResponse> {
    Json(StatisticsResponse {
        statistics: state.dispatcher.statistics(),
        timestamp: now_millis(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::tests::ScriptedChannel;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(channel: ScriptedChannel) -> Router {
        create_router(Arc::new(AppState {
            dispatcher: Arc::new(NotificationDispatcher::new(Arc::new(channel))),
            service_name: "notification-service".to_string(),
            version: "1.0.0".to_string(),
        }))
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_send_and_history() {
        let app = app(ScriptedChannel::default());

        let (status, body) = call(
            &app,
            post_json(
                "/api/notifications/send",
                json!({"recipient": "alice", "type": "EMAIL", "title": "Hi", "content": "Welcome"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["timestamp"].is_i64());

        let (status, body) = call(&app, get("/api/notifications/history/alice")).await;
        assert_eq!(status, StatusCode::OK);
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["type"], "EMAIL");
        assert_eq!(records[0]["title"], "Hi");
    }

    #[tokio::test]
    async fn test_history_for_unknown_recipient() {
        let app = app(ScriptedChannel::default());
        let (status, body) = call(&app, get("/api/notifications/history/ghost")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_batch_with_forced_failure() {
        let app = app(ScriptedChannel::default().failing("b"));

        let (status, body) = call(
            &app,
            post_json(
                "/api/notifications/send/batch",
                json!({"recipients": ["a", "b", "c"], "type": "SMS", "title": "t", "content": "c"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalRecipients"], 3);
        assert_eq!(body["successCount"], 2);
        assert_eq!(body["failureCount"], 1);

        let (_, body) = call(&app, get("/api/notifications/history/b")).await;
        assert_eq!(body[0]["success"], false);
    }

    #[tokio::test]
    async fn test_statistics() {
        let app = app(ScriptedChannel::default().failing("bob"));

        let (_, body) = call(&app, get("/api/notifications/statistics")).await;
        assert_eq!(body["totalNotifications"], 0);
        assert_eq!(body["successRate"], 0.0);

        for recipient in ["alice", "bob", "carol", "dave"] {
            call(
                &app,
                post_json(
                    "/api/notifications/send",
                    json!({"recipient": recipient, "type": "PUSH", "title": "t", "content": "c"}),
                ),
            )
            .await;
        }

        let (_, body) = call(&app, get("/api/notifications/statistics")).await;
        assert_eq!(body["totalNotifications"], 4);
        assert_eq!(body["successfulNotifications"], 3);
        assert_eq!(body["failedNotifications"], 1);
        assert_eq!(body["successRate"], 75.0);
        assert!(body["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn test_unknown_type_is_client_error() {
        let app = app(ScriptedChannel::default());
        let (status, _) = call(
            &app,
            post_json(
                "/api/notifications/send",
                json!({"recipient": "alice", "type": "FAX", "title": "t", "content": "c"}),
            ),
        )
        .await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(ScriptedChannel::default());
        let (status, body) = call(&app, get("/actuator/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "UP");
        assert_eq!(body["service"], "notification-service");
    }
}
