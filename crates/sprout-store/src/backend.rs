//! The raw storage backend abstraction

use async_trait::async_trait;

use crate::error::StoreError;

/// Trait for the raw persistence layer beneath the durable store
///
/// Backends deal in opaque UTF-8 values keyed by namespaced strings.
/// Envelope wrapping, availability probing and capacity accounting all
/// live above this trait in [`crate::DurableStore`], so implementations
/// only need to move strings in and out of their medium.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any existing value.
    ///
    /// Writes must be full replaces; a reader must never observe a
    /// partially-written value.
    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the value stored under `key`. Deleting a missing key is
    /// not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
