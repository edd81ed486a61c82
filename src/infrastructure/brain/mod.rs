//! # Brain Backends
//!
//! Implementations of `BrainStore`: in-memory, a JSON file on disk, and Redis (feature `redis`).

mod file;
mod memory;
#[cfg(feature = "redis")]
mod redis_brain;

pub use file::FileBrain;
pub use memory::MemoryBrain;
#[cfg(feature = "redis")]
pub use redis_brain::RedisBrain;

use crate::domain::config::{BrainBackend, BrainConfig};
use crate::domain::traits::BrainStore;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Opens the backend selected in the config.
pub async fn open(config: &BrainConfig, data_dir: &Path) -> Result<Arc<dyn BrainStore>> {
    match config.backend {
        BrainBackend::Memory => Ok(Arc::new(MemoryBrain::new())),
        BrainBackend::File => {
            let brain = FileBrain::open(data_dir.join(&config.file)).await?;
            Ok(Arc::new(brain))
        }
        BrainBackend::Redis => open_redis(config).await,
    }
}

#[cfg(feature = "redis")]
async fn open_redis(config: &BrainConfig) -> Result<Arc<dyn BrainStore>> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("brain.url is required for the redis backend"))?;
    let brain = RedisBrain::connect(url, &config.key_prefix).await?;
    Ok(Arc::new(brain))
}

#[cfg(not(feature = "redis"))]
async fn open_redis(_config: &BrainConfig) -> Result<Arc<dyn BrainStore>> {
    anyhow::bail!("brainbot was built without the `redis` feature")
}
