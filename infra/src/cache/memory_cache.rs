//! In-process key-value cache

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::KeyValueCache;
use crate::InfrastructureError;

/// `HashMap` behind a tokio `RwLock`; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), InfrastructureError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn delete_if_eq(&self, key: &str, expected: &str) -> Result<bool, InfrastructureError> {
        let mut entries = self.entries.write().await;
        if entries.get(key).map(String::as_str) == Some(expected) {
            entries.remove(key);
            return Ok(true);
        }
        Ok(false)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, InfrastructureError> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
