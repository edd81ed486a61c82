//! # Memory Brain
//!
//! Process-local `BrainStore` for tests and throwaway runs.

use crate::domain::error::BrainError;
use crate::domain::traits::BrainStore;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Process-local brain. State is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryBrain {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryBrain {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BrainStore for MemoryBrain {
    async fn get(&self, key: &str) -> Result<Option<Value>, BrainError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), BrainError> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}
