//! # Domain Errors
//!
//! Typed failures of the brain store. Everything above the store uses `anyhow`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrainError {
    #[error("brain unavailable: {0}")]
    Unavailable(String),

    #[error("brain document is malformed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("brain io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}
