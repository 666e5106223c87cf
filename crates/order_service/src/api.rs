//! HTTP API for the order service.
//!
//! Endpoints:
//! - `GET /actuator/health` - Liveness probe used by the gateway
//! - `GET /api/orders/health` - Service health
//! - `GET /api/orders` - List orders
//! - `POST /api/orders` - Create an order (user verification is advisory; 400 on overflowing total)
//! - `GET /api/orders/{id}` - Get an order
//! - `DELETE /api/orders/{id}` - Delete an order
//! - `PUT /api/orders/{id}/status` - Change status (`{"status": "SHIPPED"}`)
//! - `PUT /api/orders/{id}/cancel` - Cancel an order
//! - `GET /api/orders/user/{user_id}` - Orders of a user
//! - `GET /api/orders/number/{order_number}` - Order by number
//! - `GET /api/orders/status/{status}` - Orders in a status (400 on unknown status)
//! - `GET /api/orders/statistics` - Order count and total amount
//! - `GET /api/orders/user-service/health` - User service health (DOWN when unreachable)

use crate::error::Error;
use crate::order::NewOrder;
use crate::service::OrderService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use common::ServiceHealth;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

/// Application state shared across handlers.
pub struct AppState {
    pub orders: OrderService,
    pub service_name: String,
    pub version: String,
}

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/actuator/health", get(health_handler))
        .route("/api/orders/health", get(health_handler))
        .route("/api/orders", get(list_orders_handler).post(create_order_handler))
        .route("/api/orders/statistics", get(statistics_handler))
        .route("/api/orders/user-service/health", get(user_service_health_handler))
        .route("/api/orders/user/{user_id}", get(orders_for_user_handler))
        .route("/api/orders/number/{order_number}", get(order_by_number_handler))
        .route("/api/orders/status/{status}", get(orders_by_status_handler))
        .route(
            "/api/orders/{id}",
            get(get_order_handler).delete(delete_order_handler),
        )
        .route("/api/orders/{id}/status", put(update_status_handler))
        .route("/api/orders/{id}/cancel", put(cancel_order_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Status change request body.
#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: String,
}

/// GET /api/orders/health
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ServiceHealth::up(&state.service_name, &state.version))
}

/// GET /api/orders
async fn list_orders_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.orders.list_orders().await)
}

/// POST /api/orders
async fn create_order_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewOrder>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.orders.create_order(req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/{id}
async fn get_order_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    match state.orders.get_order(id).await {
        Some(order) => Ok(Json(order)),
        None => Err(ApiError::NotFound(format!("Order {} not found", id))),
    }
}

/// GET /api/orders/user/{user_id}
async fn orders_for_user_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> impl IntoResponse {
    Json(state.orders.orders_for_user(user_id).await)
}

/// GET /api/orders/number/{order_number}
async fn order_by_number_handler(
    State(state): State<Arc<AppState>>,
    Path(order_number): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.orders.order_by_number(&order_number).await {
        Some(order) => Ok(Json(order)),
        None => Err(ApiError::NotFound(format!("Order '{}' not found", order_number))),
    }
}

/// GET /api/orders/status/{status}
async fn orders_by_status_handler(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.orders.orders_by_status(&status).await?))
}

/// PUT /api/orders/{id}/status
async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    match state.orders.update_status(id, &req.status).await? {
        Some(order) => Ok(Json(order)),
        None => Err(ApiError::NotFound(format!("Order {} not found", id))),
    }
}

/// PUT /api/orders/{id}/cancel
async fn cancel_order_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    match state.orders.cancel_order(id).await {
        Some(order) => Ok(Json(order)),
        None => Err(ApiError::NotFound(format!("Order {} not found", id))),
    }
}

/// DELETE /api/orders/{id}
async fn delete_order_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> StatusCode {
    if state.orders.delete_order(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// GET /api/orders/statistics
async fn statistics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.orders.statistics().await)
}

/// GET /api/orders/user-service/health
async fn user_service_health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.orders.user_service_health().await)
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

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidStatus(_) | Error::InvalidOrder(_) => ApiError::BadRequest(e.to_string()),
            Error::Http(_) | Error::Timeout(_) => {
                error!("Unexpected remote error: {}", e);
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
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
