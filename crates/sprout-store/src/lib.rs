//! # Sprout Store
//!
//! Durable key-value storage for the Sprout offline-first data engine.
//!
//! ## Features
//!
//! - **StorageBackend trait**: Abstraction over the raw persistence layer
//! - **MemoryBackend**: In-memory implementation for testing/simulation
//! - **FileBackend**: File-based persistent implementation for production
//! - **DurableStore**: Availability-probing, envelope-wrapping store used
//!   by the rest of the engine
//!
//! Every value persisted through [`DurableStore`] is wrapped in a
//! [`StoredRecord`] envelope carrying a timestamp and format version, so
//! future migrations can inspect the version before deserializing.
//!
//! The store never propagates errors to callers: a degraded or
//! unavailable backend turns every operation into a failure sentinel
//! (`false` / `None`), and callers degrade to network-only reads or
//! in-memory defaults.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sprout_store::{DurableStore, MemoryBackend, StoreKey};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = DurableStore::new(Arc::new(MemoryBackend::new()));
//!
//!     assert!(store.set(StoreKey::Settings, &"dark-mode").await);
//!     let settings: Option<String> = store.get(StoreKey::Settings).await;
//!     assert_eq!(settings.as_deref(), Some("dark-mode"));
//! }
//! ```

pub mod backend;
pub mod error;
pub mod file;
pub mod keys;
pub mod memory;
pub mod store;

// Re-exports
pub use backend::StorageBackend;
pub use error::StoreError;
pub use file::FileBackend;
pub use keys::StoreKey;
pub use memory::MemoryBackend;
pub use store::{DurableStore, StorageInfo, StoredRecord};
