//! # Redis Brain
//!
//! Stores each brain key as a JSON string under a configurable Redis prefix.

use crate::domain::error::BrainError;
use crate::domain::traits::BrainStore;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde_json::Value;

/// Brain stored as one JSON string per key in Redis.
#[derive(Clone)]
pub struct RedisBrain {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisBrain {
    pub async fn connect(url: &str, prefix: &str) -> Result<Self, BrainError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("Connected to redis brain at {}", url);
        Ok(Self {
            conn,
            prefix: prefix.to_string(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl BrainStore for RedisBrain {
    async fn get(&self, key: &str) -> Result<Option<Value>, BrainError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.key(key)).await?;
        match raw {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), BrainError> {
        let mut conn = self.conn.clone();
        let content = serde_json::to_string(&value)?;
        let _: () = conn.set(self.key(key), content).await?;
        Ok(())
    }
}
