// src/store.rs
//
// Persistence collaborator contract. The engine does not know or care how
// scans are stored (key-value store, file, embedded database) provided the
// call yields a final confirmation signal.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("write rejected: {0}")]
    Rejected(String),
    #[error("i/o failure: {0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub code: String,
    pub group_key: String,
}

/// Pluggable scan persistence driver.
#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn add_scan(&self, code: &str, group_key: &str) -> Result<(), StoreError>;
    async fn load_all(&self) -> Result<Vec<ScanRecord>, StoreError>;
    async fn clear_all(&self) -> Result<(), StoreError>;
}

/// In-memory store for tests and for embedding without a real backend.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<ScanRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<ScanRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ScanStore for MemoryStore {
    async fn add_scan(&self, code: &str, group_key: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        // same idempotence as a keyed backend: one record per code
        if let Some(existing) = records.iter_mut().find(|r| r.code == code) {
            existing.group_key = group_key.to_string();
        } else {
            records.push(ScanRecord {
                code: code.to_string(),
                group_key: group_key.to_string(),
            });
        }
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<ScanRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.records.write().await.clear();
        Ok(())
    }
}
