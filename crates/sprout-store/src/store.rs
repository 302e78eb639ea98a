//! The durable store
//!
//! [`DurableStore`] layers availability probing, envelope wrapping and
//! capacity accounting over a raw [`StorageBackend`]. It is the only
//! storage surface the rest of the engine sees.
//!
//! The store never returns errors: a degraded backend turns writes into
//! `false` and reads into `None`, so callers treat "no stored value"
//! and "storage unavailable" identically and degrade to network-only
//! reads or in-memory defaults.

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::backend::StorageBackend;
use crate::keys::StoreKey;

/// Format version written into every envelope
const STORAGE_VERSION: &str = "1.0";

/// Sentinel key used to probe backend availability
const PROBE_KEY: &str = "sprout_probe";

/// Default capacity estimate when none is configured (5 MiB)
const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// The envelope persisted around every stored value
///
/// Raw values are never stored directly; wrapping them lets a future
/// format migration inspect `version` before deserializing `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord<T> {
    pub data: T,
    /// Epoch milliseconds at write time
    pub timestamp: i64,
    pub version: String,
}

/// Estimated capacity usage of the engine's keys
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageInfo {
    /// Bytes used by the engine's own keys
    pub used: u64,
    /// Estimated bytes remaining under the quota
    pub available: u64,
    /// Used fraction of the quota, 0..=100
    pub percentage: f64,
}

/// Versioned, availability-probing key-value store
///
/// Wraps a [`StorageBackend`] and exposes the failure-sentinel contract
/// the repositories rely on: `set`/`remove`/`clear` return `bool`,
/// `get` returns `Option<T>`.
#[derive(Clone)]
pub struct DurableStore {
    backend: Arc<dyn StorageBackend>,
    quota_bytes: u64,
}

impl DurableStore {
    /// Create a store over the given backend with the default quota
    /// estimate.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_quota(backend, DEFAULT_QUOTA_BYTES)
    }

    /// Create a store with a custom capacity estimate.
    ///
    /// No platform API guarantees a total quota, so `quota_bytes` is an
    /// estimate used only to drive the cleanup policy.
    pub fn with_quota(backend: Arc<dyn StorageBackend>, quota_bytes: u64) -> Self {
        Self {
            backend,
            quota_bytes,
        }
    }

    /// Probe whether the backend is currently usable.
    ///
    /// Writes and removes a sentinel key. Probed before every operation
    /// so a backend that degrades mid-session is caught immediately.
    pub async fn is_available(&self) -> bool {
        let ok = self.backend.write(PROBE_KEY, "probe").await.is_ok()
            && self.backend.delete(PROBE_KEY).await.is_ok();
        if !ok {
            debug!("Storage probe failed, operating degraded");
        }
        ok
    }

    /// Persist a value under `key`, wrapped in a [`StoredRecord`]
    /// envelope.
    ///
    /// Returns `false` when storage is unavailable or the write fails.
    pub async fn set<T: Serialize>(&self, key: StoreKey, value: &T) -> bool {
        if !self.is_available().await {
            return false;
        }

        let record = StoredRecord {
            data: value,
            timestamp: Utc::now().timestamp_millis(),
            version: STORAGE_VERSION.to_string(),
        };

        let serialized = match serde_json::to_string(&record) {
            Ok(s) => s,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize value");
                return false;
            }
        };

        match self.backend.write(key.as_str(), &serialized).await {
            Ok(()) => {
                trace!(key = %key, bytes = serialized.len(), "Stored value");
                true
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to write value");
                false
            }
        }
    }

    /// Read and unwrap the value stored under `key`.
    ///
    /// Returns `None` for a missing value, an unavailable backend, or a
    /// value that fails to deserialize. The envelope's `timestamp` and
    /// `version` are discarded from the caller's view.
    pub async fn get<T: DeserializeOwned>(&self, key: StoreKey) -> Option<T> {
        if !self.is_available().await {
            return None;
        }

        let raw = match self.backend.read(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read value");
                return None;
            }
        };

        match serde_json::from_str::<StoredRecord<T>>(&raw) {
            Ok(record) => Some(record.data),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to deserialize stored value");
                None
            }
        }
    }

    /// Remove the value stored under `key`.
    pub async fn remove(&self, key: StoreKey) -> bool {
        if !self.is_available().await {
            return false;
        }

        match self.backend.delete(key.as_str()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to remove value");
                false
            }
        }
    }

    /// Remove every key the engine owns.
    ///
    /// Only the engine's namespaced keys are touched; unrelated
    /// application state sharing the backend is left alone.
    pub async fn clear(&self) -> bool {
        if !self.is_available().await {
            return false;
        }

        let mut ok = true;
        for key in StoreKey::ALL {
            if let Err(e) = self.backend.delete(key.as_str()).await {
                warn!(key = %key, error = %e, "Failed to clear key");
                ok = false;
            }
        }
        ok
    }

    /// Estimate capacity usage across the engine's keys.
    ///
    /// Returns zeros when storage is unavailable. `percentage` drives
    /// the storage-pressure cleanup policy.
    pub async fn storage_info(&self) -> StorageInfo {
        if !self.is_available().await {
            return StorageInfo {
                used: 0,
                available: 0,
                percentage: 0.0,
            };
        }

        let mut used: u64 = 0;
        for key in StoreKey::ALL {
            if let Ok(Some(raw)) = self.backend.read(key.as_str()).await {
                used += raw.len() as u64;
            }
        }

        let percentage = (used as f64 / self.quota_bytes as f64 * 100.0).min(100.0);
        StorageInfo {
            used,
            available: self.quota_bytes.saturating_sub(used),
            percentage,
        }
    }
}

impl std::fmt::Debug for DurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore")
            .field("quota_bytes", &self.quota_bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    fn memory_store() -> (DurableStore, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let store = DurableStore::new(backend.clone());
        (store, backend)
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let (store, _) = memory_store();

        assert!(store.set(StoreKey::Settings, &"dark-mode").await);
        let value: Option<String> = store.get(StoreKey::Settings).await;
        assert_eq!(value.as_deref(), Some("dark-mode"));
    }

    #[tokio::test]
    async fn test_values_are_enveloped() {
        let (store, backend) = memory_store();

        store.set(StoreKey::Settings, &42u32).await;
        let raw = backend
            .read(StoreKey::Settings.as_str())
            .await
            .unwrap()
            .unwrap();

        let envelope: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(envelope["data"], 42);
        assert_eq!(envelope["version"], STORAGE_VERSION);
        assert!(envelope["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_unavailable_backend_returns_sentinels() {
        let (store, backend) = memory_store();
        store.set(StoreKey::Settings, &"kept").await;

        backend.set_available(false);
        assert!(!store.set(StoreKey::Settings, &"lost").await);
        assert_eq!(store.get::<String>(StoreKey::Settings).await, None);
        assert!(!store.remove(StoreKey::Settings).await);
        assert!(!store.clear().await);

        backend.set_available(true);
        let value: Option<String> = store.get(StoreKey::Settings).await;
        assert_eq!(value.as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let (store, _) = memory_store();
        assert_eq!(store.get::<String>(StoreKey::Profile).await, None);
    }

    #[tokio::test]
    async fn test_get_corrupt_value_returns_none() {
        let (store, backend) = memory_store();
        backend
            .write(StoreKey::Profile.as_str(), "not json at all")
            .await
            .unwrap();

        assert_eq!(store.get::<String>(StoreKey::Profile).await, None);
    }

    #[tokio::test]
    async fn test_clear_spares_unrelated_keys() {
        let (store, backend) = memory_store();

        store.set(StoreKey::Settings, &"ours").await;
        backend.write("other_app_state", "theirs").await.unwrap();

        assert!(store.clear().await);
        assert_eq!(store.get::<String>(StoreKey::Settings).await, None);
        assert_eq!(
            backend.read("other_app_state").await.unwrap().as_deref(),
            Some("theirs")
        );
    }

    #[tokio::test]
    async fn test_storage_info_tracks_usage() {
        let backend = Arc::new(MemoryBackend::new());
        let store = DurableStore::with_quota(backend.clone(), 1024);

        let empty = store.storage_info().await;
        assert_eq!(empty.used, 0);
        assert_eq!(empty.available, 1024);

        store.set(StoreKey::Settings, &"x".repeat(100)).await;
        let info = store.storage_info().await;
        assert!(info.used > 100);
        assert!(info.percentage > 0.0);
        assert!(info.percentage <= 100.0);
        assert_eq!(info.available, 1024 - info.used);
    }

    #[tokio::test]
    async fn test_storage_info_unavailable() {
        let (store, backend) = memory_store();
        backend.set_available(false);

        let info = store.storage_info().await;
        assert_eq!(info.used, 0);
        assert_eq!(info.available, 0);
        assert_eq!(info.percentage, 0.0);
    }

    #[tokio::test]
    async fn test_file_backed_persistence() {
        let dir = tempfile::TempDir::new().unwrap();

        {
            let backend = Arc::new(crate::FileBackend::new(dir.path()).await.unwrap());
            let store = DurableStore::new(backend);
            assert!(store.set(StoreKey::Progress, &7u32).await);
        }

        let backend = Arc::new(crate::FileBackend::new(dir.path()).await.unwrap());
        let store = DurableStore::new(backend);
        assert_eq!(store.get::<u32>(StoreKey::Progress).await, Some(7));
    }
}
