//! Error types for the notification service.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Invalid simulator configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
