//! # Sprout Sync
//!
//! The offline-first synchronization engine: durable mutation queueing,
//! background drain against the remote gateway, and the domain
//! repositories the application reads and writes through.
//!
//! ## Architecture
//!
//! - [`queue::OfflineQueue`] — an ordered, durable log of pending write
//!   operations, persisted through the durable store after every
//!   mutation
//! - [`coordinator::SyncCoordinator`] — drains the queue against the
//!   gateway on a timer and on connectivity-regained events, removes
//!   acknowledged entries and records a last-successful-sync checkpoint
//! - [`repos`] — typed façades (profile, progress, kindness, storybook,
//!   activities) that read-through local storage and write-through it
//!   while enqueueing the matching mutation
//! - [`engine::Engine`] — the explicitly constructed, dependency-injected
//!   entry point with a `start()`/`stop()` lifecycle
//!
//! Every repository call resolves immediately from local state; writes
//! additionally append to the queue, and the coordinator replays the
//! queue independently of caller activity. Callers are never blocked on
//! sync completion and never see sync errors synchronously.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sprout_gateway::{HttpGateway, HttpGatewayConfig};
//! use sprout_store::{DurableStore, FileBackend};
//! use sprout_sync::{Engine, EngineConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = Arc::new(FileBackend::new("~/.sprout").await.unwrap());
//!     let store = DurableStore::new(backend);
//!     let gateway = HttpGateway::new(HttpGatewayConfig::new("https://api.sprout.app")).unwrap();
//!
//!     let engine = Engine::new(store, Arc::new(gateway), EngineConfig::default()).await;
//!     engine.start().await;
//!
//!     engine.profile().update(Default::default()).await;
//!
//!     engine.stop().await;
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod engine;
pub mod queue;
pub mod repos;

// Re-exports
pub use config::EngineConfig;
pub use coordinator::{DeadLetter, SyncCoordinator, SyncOutcome};
pub use engine::{Engine, ExportBundle};
pub use queue::{ActionKind, OfflineQueue, QueuedAction};
pub use repos::{
    ActivityRepository, FamilyRepository, KindnessRepository, ProfileRepository,
    ProgressRepository, StorybookRepository,
};
