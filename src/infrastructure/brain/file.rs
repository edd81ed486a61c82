//! # File Brain
//!
//! Keeps the whole brain as one pretty-printed JSON document on disk.

use crate::domain::error::BrainError;
use crate::domain::traits::BrainStore;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Brain persisted as a single JSON document, rewritten on every `set`.
#[derive(Debug)]
pub struct FileBrain {
    path: PathBuf,
    document: Mutex<Map<String, Value>>,
}

impl FileBrain {
    /// Loads the document at `path`, starting empty if it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, BrainError> {
        let path = path.into();
        let document = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!("Opened brain file {} ({} keys)", path.display(), document.len());
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }
}

#[async_trait]
impl BrainStore for FileBrain {
    async fn get(&self, key: &str) -> Result<Option<Value>, BrainError> {
        Ok(self.document.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), BrainError> {
        let mut document = self.document.lock().await;
        let mut updated = document.clone();
        updated.insert(key.to_string(), value);
        self.persist(&updated).await?;
        *document = updated;
        Ok(())
    }
}

impl FileBrain {
    /// Writes a sibling temp file and renames it over the brain file.
    async fn persist(&self, document: &Map<String, Value>) -> Result<(), BrainError> {
        let content = serde_json::to_string_pretty(document)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, content).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
