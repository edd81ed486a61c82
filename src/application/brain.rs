//! # Brain Handle
//!
//! Typed access to the key-value store shared by every plugin.
//! Absent roots are lazily initialised to their `Default`, and every read-modify-write
//! runs under one async lock so handlers never observe a half-applied update.

use crate::domain::error::BrainError;
use crate::domain::traits::BrainStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct BrainHandle {
    store: Arc<dyn BrainStore>,
    lock: Mutex<()>,
}

impl BrainHandle {
    pub fn new(store: Arc<dyn BrainStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Reads a root without creating it. Absent roots read as `T::default()`.
    pub async fn load<T>(&self, key: &str) -> Result<T, BrainError>
    where
        T: DeserializeOwned + Default,
    {
        let _guard = self.lock.lock().await;
        self.read(key).await
    }

    /// Loads a root (initialising it when absent), applies `f` and writes the result back.
    pub async fn transact<T, R, F>(&self, key: &str, f: F) -> Result<R, BrainError>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> R,
    {
        let _guard = self.lock.lock().await;
        let mut value: T = self.read(key).await?;
        let result = f(&mut value);
        self.store.set(key, serde_json::to_value(&value)?).await?;
        Ok(result)
    }

    /// Overwrites a root.
    pub async fn replace<T: Serialize>(&self, key: &str, value: &T) -> Result<(), BrainError> {
        let _guard = self.lock.lock().await;
        self.store.set(key, serde_json::to_value(value)?).await
    }

    async fn read<T>(&self, key: &str) -> Result<T, BrainError>
    where
        T: DeserializeOwned + Default,
    {
        match self.store.get(key).await? {
            Some(raw) if !raw.is_null() => Ok(serde_json::from_value(raw)?),
            _ => Ok(T::default()),
        }
    }
}
