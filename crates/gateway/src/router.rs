//! Request forwarding: route table → upstream pool → fallback.
//!
//! A request that matches no route is an error for the caller. Once a route
//! matches, the caller always gets an answer: the upstream's response relayed
//! as-is, or the service's fallback body with HTTP 200 when the pool is empty,
//! the call fails at the transport level or times out, or the upstream itself
//! reports 502, 503 or 504.

use crate::error::{GatewayError, Result};
use crate::fallback::{FallbackResponder, DEFAULT_FALLBACK_MESSAGE};
use crate::pool::{LoadBalancer, RoundRobinBalancer};
use crate::route::{Route, RouteMatch, RouteTable};
use axum::body::{Body, Bytes};
use axum::http::{request::Parts, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::FallbackResponse;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Largest inbound body the gateway buffers before forwarding.
pub const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Headers that describe a single connection and are never forwarded.
/// `content-length` is recomputed from the buffered body.
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// Upstream statuses treated like an unreachable upstream.
const UNAVAILABLE_STATUSES: &[StatusCode] = &[
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// One routed service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path key: `/api/<key>/**`, `/health/<key>`, `/fallback/<key>`.
    pub key: String,
    /// Upstream pool name, also reported as `service` in fallback bodies.
    pub pool: String,
    /// Base URLs of the pool members.
    pub upstreams: Vec<String>,
    /// Message of the fallback body.
    pub fallback_message: String,
}

impl ServiceConfig {
    pub fn new(
        key: impl Into<String>,
        pool: impl Into<String>,
        upstreams: Vec<String>,
        fallback_message: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            pool: pool.into(),
            upstreams,
            fallback_message: fallback_message.into(),
        }
    }
}

/// Configuration for the gateway router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Per-call deadline for upstream requests.
    pub upstream_timeout: Duration,
    /// Routed services, in declaration order.
    pub services: Vec<ServiceConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            upstream_timeout: Duration::from_secs(5),
            services: vec![
                ServiceConfig::new(
                    "users",
                    "user-service",
                    vec!["http://localhost:8081".to_string()],
                    "User service is temporarily unavailable, please try again later",
                ),
                ServiceConfig::new(
                    "orders",
                    "order-service",
                    vec!["http://localhost:8082".to_string()],
                    "Order service is temporarily unavailable, please try again later",
                ),
                ServiceConfig::new(
                    "notifications",
                    "notification-service",
                    vec!["http://localhost:8083".to_string()],
                    "Notification service is temporarily unavailable, please try again later",
                ),
            ],
        }
    }
}

/// Routes inbound requests to upstream pools.
pub struct GatewayRouter {
    table: RouteTable,
    balancer: Arc<dyn LoadBalancer>,
    fallbacks: FallbackResponder,
    http_client: reqwest::Client,
}

impl GatewayRouter {
    /// Create a router balancing round-robin over the configured upstreams.
    pub fn new(config: RouterConfig) -> Result<Self> {
        let balancer = RoundRobinBalancer::new();
        for service in &config.services {
            balancer.register(&service.pool, service.upstreams.clone());
        }
        Self::with_balancer(config, Arc::new(balancer))
    }

    /// Create a router resolving pools through `balancer`.
    /// `config.services[*].upstreams` is ignored.
    pub fn with_balancer(config: RouterConfig, balancer: Arc<dyn LoadBalancer>) -> Result<Self> {
        let mut routes = Vec::with_capacity(config.services.len() * 2);
        let mut fallbacks = FallbackResponder::new();

        for service in &config.services {
            routes.extend(RouteTable::service_routes(&service.key, &service.pool)?);
            fallbacks.register(&service.key, &service.pool, &service.fallback_message);
        }

        let table = RouteTable::new(routes);
        for route in table.routes() {
            info!("Route {}: {} -> {}", route.name, route.pattern, route.pool);
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        Ok(Self {
            table,
            balancer,
            fallbacks,
            http_client,
        })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Fallback body for a service key.
    pub fn fallback(&self, key: &str) -> Option<FallbackResponse> {
        self.fallbacks.respond(key)
    }

    /// Route and forward one request.
    ///
    /// Errors only for requests no route accepts (`NoRoute`) or whose body
    /// cannot be read (`InvalidRequest`).
    pub async fn dispatch(&self, request: Request<Body>) -> Result<Response> {
        let (parts, body) = request.into_parts();
        let path = parts.uri.path();

        let matched = self
            .table
            .route(path)
            .ok_or_else(|| GatewayError::NoRoute(path.to_string()))?;

        let body = axum::body::to_bytes(body, MAX_REQUEST_BODY_BYTES)
            .await
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

        match self.forward(&matched, &parts, body).await {
            Ok(response) => {
                counter!("gateway_requests_forwarded_total", "route" => matched.route.name.clone())
                    .increment(1);
                Ok(response)
            }
            Err(e) => {
                warn!(
                    "Forwarding {} {} via route {} failed, serving fallback: {}",
                    parts.method, path, matched.route.name, e
                );
                counter!("gateway_fallbacks_total", "service" => matched.route.service.clone())
                    .increment(1);
                Ok(self.fallback_response(matched.route))
            }
        }
    }

    async fn forward(&self, matched: &RouteMatch<'_>, parts: &Parts, body: Bytes) -> Result<Response> {
        let pool = &matched.route.pool;
        let base = self
            .balancer
            .choose(pool)
            .ok_or_else(|| GatewayError::NoUpstream(pool.clone()))?;

        let mut url = format!("{}{}", base, matched.upstream_path);
        if let Some(query) = parts.uri.query() {
            url.push('?');
            url.push_str(query);
        }
        debug!("Forwarding {} {} -> {}", parts.method, parts.uri, url);

        let upstream = self
            .http_client
            .request(parts.method.clone(), &url)
            .headers(end_to_end_headers(&parts.headers))
            .body(body)
            .send()
            .await?;

        let status = upstream.status();
        if UNAVAILABLE_STATUSES.contains(&status) {
            return Err(GatewayError::UpstreamUnavailable(status));
        }
        let headers = end_to_end_headers(upstream.headers());
        let body = upstream.bytes().await?;

        Ok((status, headers, body).into_response())
    }

    fn fallback_response(&self, route: &Route) -> Response {
        let body = self
            .fallbacks
            .respond(&route.service)
            .unwrap_or_else(|| FallbackResponse::new(&route.pool, DEFAULT_FALLBACK_MESSAGE));
        (StatusCode::OK, Json(body)).into_response()
    }
}

/// Copy of `headers` without hop-by-hop entries.
fn end_to_end_headers(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !HOP_BY_HOP_HEADERS.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
