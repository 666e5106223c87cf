//! API gateway with per-service fallback.
//!
//! This service:
//! - Matches inbound paths against a static route table (longest prefix wins)
//! - Forwards matched requests to a member of the route's upstream pool
//! - Answers with the service's fallback body (HTTP 200) when the pool is
//!   empty, unreachable or too slow
//!
//! ## Architecture
//!
//! ```text
//! client
//!   ↓
//! RouteTable (/api/<svc>/**, /health/<svc>)
//!   ↓
//! LoadBalancer (pool → member)
//!   ↓                    ↘ on failure
//! upstream service        FallbackResponder
//! ```

pub mod api;
pub mod error;
pub mod fallback;
pub mod pool;
pub mod route;
pub mod router;

pub use api::{create_router, AppState};
pub use error::{GatewayError, Result};
pub use fallback::FallbackResponder;
pub use pool::{LoadBalancer, RoundRobinBalancer};
pub use route::{Route, RouteMatch, RouteTable};
pub use router::{GatewayRouter, RouterConfig, ServiceConfig};
