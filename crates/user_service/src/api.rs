//! HTTP API handlers and routes using axum.
//!
//! Routes:
//! - GET /actuator/health - Liveness probe used by the gateway
//! - GET /api/users/health - Service health
//! - GET /api/users - List users
//! - POST /api/users - Create a user
//! - GET /api/users/{id} - Get a user
//! - PUT /api/users/{id} - Update profile fields
//! - DELETE /api/users/{id} - Delete a user
//! - GET /api/users/username/{username} - Get a user by username

use crate::error::Error;
use crate::store::{NewUser, UserRepository, UserUpdate};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use common::ServiceHealth;
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Application state shared across handlers.
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub service_name: String,
    pub version: String,
}

/// Create the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/actuator/health", get(health_handler))
        .route("/api/users/health", get(health_handler))
        .route("/api/users", get(list_users_handler).post(create_user_handler))
        .route(
            "/api/users/{id}",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
        .route("/api/users/username/{username}", get(get_by_username_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/users/health
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ServiceHealth::up(&state.service_name, &state.version))
}

/// GET /api/users
async fn list_users_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.users.find_all().await)
}

/// GET /api/users/{id}
async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    match state.users.find_by_id(id).await {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound(format!("User {} not found", id))),
    }
}

/// GET /api/users/username/{username}
async fn get_by_username_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.users.find_by_username(&username).await {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound(format!("User '{}' not found", username))),
    }
}

/// POST /api/users
async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.create(req).await?;
    info!("Created user {} ({})", user.id, user.username);
    counter!("users_created_total").increment(1);
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/{id}
async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(req): Json<UserUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    match state.users.update(id, req).await {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound(format!("User {} not found", id))),
    }
}

/// DELETE /api/users/{id}
async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> StatusCode {
    if state.users.delete(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// API error types.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::DuplicateUsername(_) | Error::DuplicateEmail(_) => {
                ApiError::BadRequest(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}
