//! The synchronization coordinator
//!
//! Drains the offline mutation queue against the remote gateway on a
//! periodic timer and on connectivity-regained events. Two states, Idle
//! and Syncing; an atomic flag rejects re-entrant drains, so at most
//! one pass runs at a time and a pass always runs to completion.
//!
//! Within a pass actions are attempted strictly in insertion order, but
//! a failed action does not block the ones behind it: transient
//! failures stay queued for the next cycle, permanent rejections move
//! to a dead-letter record instead of retrying forever.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use sprout_core::{ActivityResult, KindnessMoment, Profile, StorybookEntry, UserProgress};
use sprout_gateway::{GatewayError, RemoteGateway};
use sprout_store::{DurableStore, StoreKey};

use crate::config::EngineConfig;
use crate::queue::{ActionKind, OfflineQueue, QueuedAction};

/// Outcome of one drain invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing was queued
    Idle,
    /// Another drain pass was already running; this one was a no-op
    AlreadySyncing,
    /// Every queued action was resolved and the checkpoint advanced
    Drained,
    /// The pass completed but some actions remain queued
    Partial,
}

/// A permanently-failed action retained for inspection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetter {
    /// The action as it was queued
    pub action: QueuedAction,
    /// The rejection that retired it
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

/// Drains the offline queue against the remote gateway
pub struct SyncCoordinator {
    store: DurableStore,
    gateway: Arc<dyn RemoteGateway>,
    queue: Arc<Mutex<OfflineQueue>>,
    /// Idle/Syncing guard; Idle→Syncing only succeeds when Idle
    sync_in_progress: AtomicBool,
    sync_interval: Duration,
    pressure_threshold: f64,
    retention_days: i64,
    runner: Mutex<Option<(watch::Sender<bool>, JoinHandle<()>)>>,
}

impl SyncCoordinator {
    /// Create a coordinator over the shared store, gateway and queue.
    pub fn new(
        store: DurableStore,
        gateway: Arc<dyn RemoteGateway>,
        queue: Arc<Mutex<OfflineQueue>>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            queue,
            sync_in_progress: AtomicBool::new(false),
            sync_interval: config.sync_interval,
            pressure_threshold: config.pressure_threshold,
            retention_days: config.storybook_retention_days,
            runner: Mutex::new(None),
        }
    }

    /// Spawn the periodic sync loop.
    ///
    /// The first tick fires immediately, which doubles as the startup
    /// sync. Calling `start` on a running coordinator is a no-op.
    pub async fn start(self: &Arc<Self>) {
        let mut runner = self.runner.lock().await;
        if runner.is_some() {
            warn!("Sync coordinator already started");
            return;
        }

        let (tx, mut rx) = watch::channel(false);
        let coordinator = Arc::clone(self);
        let interval = self.sync_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        coordinator.sync_now().await;
                        coordinator.cleanup().await;
                    }
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Sync loop stopped");
        });

        *runner = Some((tx, handle));
        info!(interval = ?self.sync_interval, "Sync coordinator started");
    }

    /// Stop the periodic loop.
    ///
    /// An in-flight drain pass is not cancelled; the loop exits after
    /// the current iteration completes.
    pub async fn stop(&self) {
        let taken = self.runner.lock().await.take();
        if let Some((tx, handle)) = taken {
            let _ = tx.send(true);
            let _ = handle.await;
            info!("Sync coordinator stopped");
        }
    }

    /// Connectivity regained: trigger an immediate drain.
    pub async fn notify_online(&self) -> SyncOutcome {
        debug!("Connectivity regained, draining queue");
        self.sync_now().await
    }

    /// Run one guarded drain pass.
    ///
    /// Returns [`SyncOutcome::AlreadySyncing`] without doing anything
    /// if a pass is already running.
    pub async fn sync_now(&self) -> SyncOutcome {
        if self
            .sync_in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Drain already in progress, skipping");
            return SyncOutcome::AlreadySyncing;
        }

        let outcome = self.drain().await;
        self.sync_in_progress.store(false, Ordering::SeqCst);
        outcome
    }

    /// One complete attempt to replay every currently-queued action.
    async fn drain(&self) -> SyncOutcome {
        let snapshot = self.queue.lock().await.snapshot();
        if snapshot.is_empty() {
            return SyncOutcome::Idle;
        }
        info!(pending = snapshot.len(), "Starting drain pass");

        let queued_ids: HashSet<&str> = snapshot.iter().map(|a| a.id.as_str()).collect();
        let mut acked: HashSet<String> = HashSet::new();
        let mut to_remove: HashSet<String> = HashSet::new();
        let mut dead: Vec<DeadLetter> = Vec::new();
        let mut clean = true;

        for action in &snapshot {
            // Hold back an action whose predecessor has not been
            // applied remotely yet. A predecessor that left the queue
            // in an earlier pass no longer blocks anything.
            if let Some(dep) = &action.depends_on
                && queued_ids.contains(dep.as_str())
                && !acked.contains(dep)
            {
                debug!(id = %action.id, depends_on = %dep, "Predecessor still pending, holding back");
                clean = false;
                continue;
            }

            match self.dispatch(action).await {
                Ok(()) => {
                    debug!(id = %action.id, action = %action.action, "Action applied remotely");
                    acked.insert(action.id.clone());
                    to_remove.insert(action.id.clone());
                }
                Err(e) if e.is_permanent() => {
                    warn!(
                        id = %action.id,
                        action = %action.action,
                        error = %e,
                        "Action permanently rejected, moving to dead letters"
                    );
                    dead.push(DeadLetter {
                        action: action.clone(),
                        error: e.to_string(),
                        failed_at: Utc::now(),
                    });
                    to_remove.insert(action.id.clone());
                }
                Err(e) => {
                    warn!(
                        id = %action.id,
                        action = %action.action,
                        error = %e,
                        "Action failed, leaving queued"
                    );
                    clean = false;
                }
            }
        }

        self.queue.lock().await.remove(&to_remove).await;

        if !dead.is_empty() {
            let mut letters: Vec<DeadLetter> = self
                .store
                .get(StoreKey::DeadLetters)
                .await
                .unwrap_or_default();
            letters.extend(dead);
            self.store.set(StoreKey::DeadLetters, &letters).await;
        }

        if clean {
            let since: Option<DateTime<Utc>> = self.store.get(StoreKey::LastSync).await;
            self.store.set(StoreKey::LastSync, &Utc::now()).await;
            info!("Drain pass complete, checkpoint advanced");

            // Best-effort pull; remote-side changes are informational
            // until a device fetches the affected collection.
            if let Err(e) = self.gateway.sync(since).await {
                debug!(error = %e, "Post-drain sync pull failed");
            }
            SyncOutcome::Drained
        } else {
            SyncOutcome::Partial
        }
    }

    /// Replay one queued action against the gateway method matching its
    /// kind.
    async fn dispatch(&self, action: &QueuedAction) -> Result<(), GatewayError> {
        match action.action {
            ActionKind::UpdateProfile => {
                let profile: Profile = decode(&action.data)?;
                self.gateway.update_profile(&profile).await.map(drop)
            }
            ActionKind::UpdateProgress => {
                let progress: UserProgress = decode(&action.data)?;
                self.gateway.update_progress(&progress).await.map(drop)
            }
            ActionKind::SubmitActivityResult => {
                let result: ActivityResult = decode(&action.data)?;
                self.gateway.submit_activity_result(&result).await.map(drop)
            }
            ActionKind::AddKindnessMoment => {
                let moment: KindnessMoment = decode(&action.data)?;
                self.gateway.add_kindness_moment(&moment).await.map(drop)
            }
            ActionKind::AddStorybookEntry => {
                let entry: StorybookEntry = decode(&action.data)?;
                self.gateway.add_storybook_entry(&entry).await.map(drop)
            }
        }
    }

    /// Trim old storybook entries when storage is under pressure.
    ///
    /// Lossy and best-effort: entries older than the retention window
    /// are dropped locally once usage crosses the threshold.
    pub async fn cleanup(&self) {
        let info = self.store.storage_info().await;
        if info.percentage <= self.pressure_threshold {
            return;
        }

        let Some(entries) = self
            .store
            .get::<Vec<StorybookEntry>>(StoreKey::Storybook)
            .await
        else {
            return;
        };

        let cutoff = Utc::now() - chrono::Duration::days(self.retention_days);
        let before = entries.len();
        let kept: Vec<StorybookEntry> = entries.into_iter().filter(|e| e.date > cutoff).collect();

        if kept.len() < before {
            info!(
                trimmed = before - kept.len(),
                kept = kept.len(),
                percentage = info.percentage,
                "Storage pressure: trimmed old storybook entries"
            );
            self.store.set(StoreKey::Storybook, &kept).await;
        }
    }

    /// Timestamp of the last fully-drained pass, if any.
    pub async fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.store.get(StoreKey::LastSync).await
    }

    /// Permanently-failed actions retained for inspection.
    pub async fn dead_letters(&self) -> Vec<DeadLetter> {
        self.store
            .get(StoreKey::DeadLetters)
            .await
            .unwrap_or_default()
    }

    /// Number of actions currently queued.
    pub async fn pending_actions(&self) -> usize {
        self.queue.lock().await.len()
    }
}

fn decode<T: DeserializeOwned>(data: &Value) -> Result<T, GatewayError> {
    serde_json::from_value(data.clone()).map_err(|e| GatewayError::Decode(e.to_string()))
}
