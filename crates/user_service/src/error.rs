//! Error types for the user service.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Email already exists: {0}")]
    DuplicateEmail(String),
}

pub type Result<T> = std::result::Result<T, Error>;
