//! Order service library.
//!
//! This crate provides:
//! - `ResilientUserClient`: user lookups that degrade to a placeholder user
//!   instead of failing when the user service is unreachable
//! - `OrderService`: order lifecycle on top of an `OrderRepository`
//! - HTTP API for order management
//!
//! # Architecture
//!
//! ```text
//!            POST /api/orders
//!                   │
//!                   ▼
//!             OrderService ──────────► OrderRepository (in-memory)
//!                   │
//!                   ▼
//!          ResilientUserClient
//!             │            │
//!     (ok)    ▼            ▼   (error / timeout)
//!      HttpUserLookup   UserFallback
//!      (user service)   ("unknown" user, DOWN health)
//! ```
//!
//! User verification is advisory: an order is created even when the user
//! could not be verified.

pub mod api;
pub mod error;
pub mod order;
pub mod repository;
pub mod service;
pub mod user_client;

pub use api::{create_router, AppState};
pub use error::{Error, Result};
pub use order::{NewOrder, Order, OrderStatistics, OrderStatus};
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::OrderService;
pub use user_client::{HttpUserLookup, ResilientUserClient, UserFallback, UserLookup};
