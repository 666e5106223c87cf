//! User service library.
//!
//! Serves user records to the rest of the deployment. Storage is an in-memory
//! collaborator behind [`UserRepository`]; the order service consumes
//! `GET /api/users/{id}` and `GET /api/users/health` through its resilient
//! client.

pub mod api;
pub mod error;
pub mod store;

pub use api::{create_router, AppState};
pub use error::{Error, Result};
pub use store::{InMemoryUserRepository, NewUser, UserRepository, UserUpdate};
