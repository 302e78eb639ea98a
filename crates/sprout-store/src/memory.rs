//! In-memory storage backend
//!
//! This module provides an in-memory implementation of
//! [`StorageBackend`], suitable for tests and simulated degraded
//! sessions. The backend can be switched unavailable at runtime to
//! exercise the store's failure-sentinel behavior.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

use crate::backend::StorageBackend;
use crate::error::StoreError;

/// In-memory implementation of [`StorageBackend`]
///
/// Uses a `DashMap` for concurrent access. Values do not survive the
/// process; use [`crate::FileBackend`] for durability.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: DashMap<String, String>,
    unavailable: AtomicBool,
}

impl MemoryBackend {
    /// Create a new, empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle availability. While unavailable every operation returns
    /// [`StoreError::Unavailable`], which the store above degrades into
    /// failure sentinels.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the backend holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        Ok(self.values.get(key).map(|v| v.clone()))
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        trace!(key, bytes = value.len(), "Writing value (memory)");
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.values.remove(key);
        Ok(())
    }
}
