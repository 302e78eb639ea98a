//! The engine facade
//!
//! An explicitly constructed, dependency-injected entry point with a
//! `start()`/`stop()` lifecycle. There is no process-wide singleton:
//! tests and hosts build as many isolated engines as they need, each
//! over its own store and gateway.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::warn;

use sprout_core::{KindnessMoment, Profile, StorybookEntry, UserProgress};
use sprout_gateway::RemoteGateway;
use sprout_store::{DurableStore, StorageInfo, StoreKey};

use crate::config::EngineConfig;
use crate::coordinator::{DeadLetter, SyncCoordinator, SyncOutcome};
use crate::queue::OfflineQueue;
use crate::repos::{
    ActivityRepository, FamilyRepository, KindnessRepository, ProfileRepository,
    ProgressRepository, StorybookRepository,
};

/// Schema version written into exported documents
const EXPORT_VERSION: &str = "1.0";

/// The full-state document produced by [`Engine::export_data`] and
/// consumed by [`Engine::import_data`]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<UserProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kindness: Option<Vec<KindnessMoment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storybook: Option<Vec<StorybookEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

/// The offline-first data engine
///
/// Owns the durable store, the offline queue, the domain repositories
/// and the sync coordinator. Construct one per user/session, call
/// [`start`](Engine::start) to begin background syncing and
/// [`stop`](Engine::stop) on teardown.
pub struct Engine {
    store: DurableStore,
    queue: Arc<Mutex<OfflineQueue>>,
    coordinator: Arc<SyncCoordinator>,
    profile: ProfileRepository,
    progress: ProgressRepository,
    kindness: KindnessRepository,
    storybook: StorybookRepository,
    activities: ActivityRepository,
    family: FamilyRepository,
}

impl Engine {
    /// Build an engine over the given store and gateway.
    ///
    /// Reloads any queue entries a previous session left behind.
    pub async fn new(
        store: DurableStore,
        gateway: Arc<dyn RemoteGateway>,
        config: EngineConfig,
    ) -> Self {
        let queue = Arc::new(Mutex::new(OfflineQueue::load(store.clone()).await));

        let coordinator = Arc::new(SyncCoordinator::new(
            store.clone(),
            Arc::clone(&gateway),
            Arc::clone(&queue),
            &config,
        ));

        let progress = ProgressRepository::new(store.clone(), Arc::clone(&queue));
        Self {
            profile: ProfileRepository::new(
                store.clone(),
                Arc::clone(&gateway),
                Arc::clone(&queue),
                config.user_id.clone(),
            ),
            kindness: KindnessRepository::new(
                store.clone(),
                Arc::clone(&queue),
                progress.clone(),
            ),
            storybook: StorybookRepository::new(store.clone(), Arc::clone(&queue)),
            activities: ActivityRepository::new(
                store.clone(),
                Arc::clone(&gateway),
                Arc::clone(&queue),
            ),
            family: FamilyRepository::new(store.clone(), Arc::clone(&gateway)),
            progress,
            store,
            queue,
            coordinator,
        }
    }

    /// Begin periodic background syncing.
    pub async fn start(&self) {
        self.coordinator.start().await;
    }

    /// Stop background syncing. An in-flight drain pass completes
    /// first.
    pub async fn stop(&self) {
        self.coordinator.stop().await;
    }

    /// The profile repository.
    pub fn profile(&self) -> &ProfileRepository {
        &self.profile
    }

    /// The progress repository.
    pub fn progress(&self) -> &ProgressRepository {
        &self.progress
    }

    /// The kindness moments repository.
    pub fn kindness(&self) -> &KindnessRepository {
        &self.kindness
    }

    /// The storybook repository.
    pub fn storybook(&self) -> &StorybookRepository {
        &self.storybook
    }

    /// The activities repository.
    pub fn activities(&self) -> &ActivityRepository {
        &self.activities
    }

    /// The family group repository.
    pub fn family(&self) -> &FamilyRepository {
        &self.family
    }

    /// Trigger an immediate drain pass.
    pub async fn sync_now(&self) -> SyncOutcome {
        self.coordinator.sync_now().await
    }

    /// Connectivity regained: trigger an immediate drain pass.
    pub async fn notify_online(&self) -> SyncOutcome {
        self.coordinator.notify_online().await
    }

    /// Run the storage-pressure cleanup policy.
    pub async fn cleanup(&self) {
        self.coordinator.cleanup().await;
    }

    /// Number of mutations awaiting replay.
    pub async fn pending_actions(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Timestamp of the last fully-drained sync pass.
    pub async fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.coordinator.last_sync().await
    }

    /// Permanently-failed actions retained for inspection.
    pub async fn dead_letters(&self) -> Vec<DeadLetter> {
        self.coordinator.dead_letters().await
    }

    /// Estimated capacity usage of the engine's keys.
    pub async fn storage_info(&self) -> StorageInfo {
        self.store.storage_info().await
    }

    /// Bundle the full local state into a JSON document.
    pub async fn export_data(&self) -> Option<String> {
        let bundle = ExportBundle {
            profile: self.store.get(StoreKey::Profile).await,
            progress: self.store.get(StoreKey::Progress).await,
            kindness: self.store.get(StoreKey::KindnessMoments).await,
            storybook: self.store.get(StoreKey::Storybook).await,
            settings: self.store.get(StoreKey::Settings).await,
            export_date: Utc::now(),
            version: EXPORT_VERSION.to_string(),
        };

        match serde_json::to_string_pretty(&bundle) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "Failed to serialize export bundle");
                None
            }
        }
    }

    /// Restore local state from an exported document.
    ///
    /// Sections absent from the document are left untouched. Returns
    /// `false` when the document does not parse.
    pub async fn import_data(&self, json: &str) -> bool {
        let bundle: ExportBundle = match serde_json::from_str(json) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(error = %e, "Failed to parse import document");
                return false;
            }
        };

        if let Some(profile) = &bundle.profile {
            self.store.set(StoreKey::Profile, profile).await;
        }
        if let Some(progress) = &bundle.progress {
            self.store.set(StoreKey::Progress, progress).await;
        }
        if let Some(kindness) = &bundle.kindness {
            self.store.set(StoreKey::KindnessMoments, kindness).await;
        }
        if let Some(storybook) = &bundle.storybook {
            self.store.set(StoreKey::Storybook, storybook).await;
        }
        if let Some(settings) = &bundle.settings {
            self.store.set(StoreKey::Settings, settings).await;
        }
        true
    }

    /// Wipe every key the engine owns, including the pending queue.
    ///
    /// Unrelated application state sharing the backend is untouched.
    pub async fn clear_local_data(&self) -> bool {
        let cleared = self.store.clear().await;
        if cleared {
            self.queue.lock().await.reset();
        }
        cleared
    }
}
