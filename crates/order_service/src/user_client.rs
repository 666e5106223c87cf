//! Resilient client for the user service.
//!
//! Every call is a single attempt against the live user service, bounded by a
//! timeout. Any failure (connect error, timeout, non-2xx status, undecodable
//! body) is logged and answered by [`UserFallback`] instead. Callers never see
//! an error; a fallback user is recognisable only by its `"unknown"` username.

use crate::error::{Error, Result};
use async_trait::async_trait;
use common::{ServiceHealth, UserDto};
use metrics::counter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default deadline for one live call.
pub const DEFAULT_USER_SERVICE_TIMEOUT: Duration = Duration::from_secs(3);

/// Name under which the user service reports itself.
pub const USER_SERVICE_NAME: &str = "user-service";

/// Live user-service capability.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// `GET /api/users/{id}`
    async fn fetch_by_id(&self, id: u64) -> Result<UserDto>;

    /// `GET /api/users/health`
    async fn health(&self) -> Result<ServiceHealth>;
}

/// [`UserLookup`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpUserLookup {
    http: reqwest::Client,
    base_url: String,
}

impl HttpUserLookup {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Fetching from: {}", url);

        let response = self.http.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl UserLookup for HttpUserLookup {
    async fn fetch_by_id(&self, id: u64) -> Result<UserDto> {
        self.get_json(&format!("/api/users/{}", id)).await
    }

    async fn health(&self) -> Result<ServiceHealth> {
        self.get_json("/api/users/health").await
    }
}

/// Deterministic stand-in used while the user service is unavailable.
#[derive(Debug, Clone)]
pub struct UserFallback {
    service_name: String,
}

impl UserFallback {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Placeholder user carrying the requested id.
    pub fn fetch_by_id(&self, id: u64) -> UserDto {
        UserDto::unavailable(id)
    }

    /// DOWN report stamped with the current time.
    pub fn health(&self) -> ServiceHealth {
        ServiceHealth::down(&self.service_name)
    }
}

/// User-service client that never fails.
#[derive(Clone)]
pub struct ResilientUserClient {
    live: Arc<dyn UserLookup>,
    fallback: UserFallback,
    timeout: Duration,
}

impl ResilientUserClient {
    pub fn new(live: Arc<dyn UserLookup>, timeout: Duration) -> Self {
        Self {
            live,
            fallback: UserFallback::new(USER_SERVICE_NAME),
            timeout,
        }
    }

    /// Client talking HTTP to `base_url`.
    pub fn http(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::new(Arc::new(HttpUserLookup::new(base_url)), timeout)
    }

    /// Look up a user; the placeholder user on any failure.
    pub async fn fetch_by_id(&self, id: u64) -> UserDto {
        self.dispatch("fetch_by_id", self.live.fetch_by_id(id), || {
            self.fallback.fetch_by_id(id)
        })
        .await
    }

    /// Health of the user service; a DOWN report on any failure.
    pub async fn health(&self) -> ServiceHealth {
        self.dispatch("health", self.live.health(), || self.fallback.health())
            .await
    }

    /// Run the live call once; on error or timeout answer from the fallback.
    async fn dispatch<T>(
        &self,
        operation: &'static str,
        live: impl Future<Output = Result<T>>,
        fallback: impl FnOnce() -> T,
    ) -> T {
        let error = match tokio::time::timeout(self.timeout, live).await {
            Ok(Ok(value)) => return value,
            Ok(Err(e)) => e,
            Err(_) => Error::Timeout(self.timeout),
        };

        warn!(
            "User service {} failed, using fallback: {}",
            operation, error
        );
        counter!("user_client_fallbacks_total", "operation" => operation).increment(1);

        fallback()
    }
}

impl std::fmt::Debug for ResilientUserClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientUserClient")
            .field("fallback", &self.fallback)
            .field("timeout", &self.timeout)
            .finish()
    }
}
