//! Durability, delivery and mutual-exclusion properties of the engine

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use common::{FailureMode, MockGateway, init_tracing, sample_moment, sample_profile};
use sprout_core::ProgressUpdate;
use sprout_store::{DurableStore, FileBackend, MemoryBackend, StoreKey};
use sprout_sync::{Engine, EngineConfig, QueuedAction, SyncOutcome};

async fn engine_over(
    backend: Arc<MemoryBackend>,
    gateway: Arc<MockGateway>,
) -> Engine {
    let store = DurableStore::new(backend);
    Engine::new(store, gateway, EngineConfig::default()).await
}

/// Queued actions persist across a simulated process restart.
#[tokio::test]
async fn queued_actions_survive_restart() {
    init_tracing();
    let backend = Arc::new(MemoryBackend::new());
    let gateway = Arc::new(MockGateway::new());
    gateway.fail_always(FailureMode::Transient);

    {
        let engine = engine_over(backend.clone(), gateway.clone()).await;
        for points in [5, 10, 15] {
            engine.kindness().add(sample_moment(points)).await.unwrap();
        }
        assert_eq!(engine.pending_actions().await, 3);
    }

    // "Restart": a fresh engine over the same backend
    let engine = engine_over(backend.clone(), gateway).await;
    assert_eq!(engine.pending_actions().await, 3);

    // Contents are unchanged, not just the count
    let store = DurableStore::new(backend);
    let persisted: Vec<QueuedAction> = store.get(StoreKey::OfflineQueue).await.unwrap();
    assert_eq!(persisted.len(), 3);
    assert_eq!(persisted[0].data["points"], 5);
    assert_eq!(persisted[1].data["points"], 10);
    assert_eq!(persisted[2].data["points"], 15);
}

/// An action leaves the queue iff its remote call succeeded.
#[tokio::test]
async fn failing_gateway_leaves_queue_unchanged() {
    let backend = Arc::new(MemoryBackend::new());
    let gateway = Arc::new(MockGateway::new());
    let engine = engine_over(backend, gateway.clone()).await;

    gateway.fail_always(FailureMode::Transient);
    engine.kindness().add(sample_moment(5)).await.unwrap();
    engine.kindness().add(sample_moment(10)).await.unwrap();

    assert_eq!(engine.sync_now().await, SyncOutcome::Partial);
    assert_eq!(engine.pending_actions().await, 2);

    gateway.succeed();
    assert_eq!(engine.sync_now().await, SyncOutcome::Drained);
    assert_eq!(engine.pending_actions().await, 0);
}

/// Replaying the same full-object update twice yields the same
/// final remote state as replaying it once.
#[tokio::test]
async fn duplicate_full_object_updates_are_idempotent() {
    let backend = Arc::new(MemoryBackend::new());
    let gateway = Arc::new(MockGateway::new());
    let engine = engine_over(backend, gateway.clone()).await;

    let update = ProgressUpdate {
        kindness_points: Some(42),
        current_streak: Some(3),
        ..Default::default()
    };
    assert!(engine.progress().update(update.clone()).await);
    assert!(engine.progress().update(update).await);
    assert_eq!(engine.pending_actions().await, 2);

    assert_eq!(engine.sync_now().await, SyncOutcome::Drained);
    assert_eq!(gateway.call_count("updateProgress"), 2);

    let remote = gateway.remote.get("progress").unwrap().clone();
    assert_eq!(remote["kindnessPoints"], 42);
    assert_eq!(remote["currentStreak"], 3);
}

/// A failure mid-queue does not block the actions behind it.
#[tokio::test]
async fn drain_is_not_head_blocking() {
    let backend = Arc::new(MemoryBackend::new());
    let gateway = Arc::new(MockGateway::new());
    let engine = engine_over(backend, gateway.clone()).await;

    for points in [1, 2, 3, 4, 5] {
        engine.kindness().add(sample_moment(points)).await.unwrap();
    }

    // Fail only the second gateway call of the pass
    gateway.fail_call_indices(&[2], FailureMode::Transient);
    assert_eq!(engine.sync_now().await, SyncOutcome::Partial);

    // 1, 3, 4, 5 were attempted and removed; 2 stays queued
    assert_eq!(gateway.call_count("addKindnessMoment"), 5);
    assert_eq!(engine.pending_actions().await, 1);

    let remote = gateway.remote.get("kindness").unwrap().clone();
    let applied: Vec<i64> = remote
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["points"].as_i64().unwrap())
        .collect();
    assert_eq!(applied, vec![1, 3, 4, 5]);
}

/// Two rapid drain triggers result in exactly one active drain.
#[tokio::test]
async fn concurrent_drain_triggers_are_mutually_exclusive() {
    let backend = Arc::new(MemoryBackend::new());
    let gateway = Arc::new(MockGateway::new());
    gateway.set_latency(Duration::from_millis(100));
    let engine = engine_over(backend, gateway.clone()).await;

    engine.kindness().add(sample_moment(5)).await.unwrap();

    let (first, second) = tokio::join!(engine.sync_now(), engine.notify_online());
    assert_eq!(first, SyncOutcome::Drained);
    assert_eq!(second, SyncOutcome::AlreadySyncing);

    // The single pass replayed the action exactly once
    assert_eq!(gateway.call_count("addKindnessMoment"), 1);
}

/// Store unavailable: the profile falls back to one remote fetch and
/// is returned without being persisted.
#[tokio::test]
async fn unavailable_store_degrades_profile_to_network_only() {
    let backend = Arc::new(MemoryBackend::new());
    let gateway = Arc::new(MockGateway::new());
    gateway.serve_profile(sample_profile("Alice"));
    let engine = engine_over(backend.clone(), gateway.clone()).await;

    backend.set_available(false);
    let profile = engine.profile().get().await.unwrap();
    assert_eq!(profile.name, "Alice");
    assert_eq!(gateway.call_count("getProfile"), 1);

    // Nothing was cached while degraded
    backend.set_available(true);
    let store = DurableStore::new(backend);
    assert!(store.get::<serde_json::Value>(StoreKey::Profile).await.is_none());
}

/// Offline scenario: mutations accumulate across failing cycles, local
/// state stays consistent, and recovery drains everything.
#[tokio::test]
async fn offline_mutations_survive_failing_cycles_then_drain() {
    let backend = Arc::new(MemoryBackend::new());
    let gateway = Arc::new(MockGateway::new());
    let engine = engine_over(backend, gateway.clone()).await;

    gateway.fail_always(FailureMode::Transient);
    for points in [5, 10, 15] {
        engine.kindness().add(sample_moment(points)).await.unwrap();
    }

    for _ in 0..5 {
        assert_eq!(engine.sync_now().await, SyncOutcome::Partial);
    }
    assert_eq!(engine.pending_actions().await, 3);
    assert_eq!(engine.progress().get().await.kindness_points, 30);
    assert!(engine.last_sync().await.is_none());

    // Cycle 6: the gateway recovers
    gateway.succeed();
    let before = Utc::now();
    assert_eq!(engine.sync_now().await, SyncOutcome::Drained);
    assert_eq!(engine.pending_actions().await, 0);

    let checkpoint = engine.last_sync().await.unwrap();
    assert!(checkpoint >= before);

    let remote = gateway.remote.get("kindness").unwrap().clone();
    assert_eq!(remote.as_array().unwrap().len(), 3);
    assert_eq!(remote[0]["points"], json!(5));
    assert_eq!(remote[2]["points"], json!(15));
}

/// Same durability over real files: a queue written by one engine instance drains
/// from a second one after a process restart.
#[tokio::test]
async fn file_backed_queue_survives_restart() {
    init_tracing();
    let dir = tempfile::TempDir::new().unwrap();
    let gateway = Arc::new(MockGateway::new());

    {
        let backend = Arc::new(FileBackend::new(dir.path()).await.unwrap());
        let engine = Engine::new(
            DurableStore::new(backend),
            gateway.clone() as Arc<dyn sprout_gateway::RemoteGateway>,
            EngineConfig::default(),
        )
        .await;
        gateway.fail_always(FailureMode::Transient);
        engine.kindness().add(sample_moment(5)).await.unwrap();
        engine.kindness().add(sample_moment(10)).await.unwrap();
    }

    gateway.succeed();
    let backend = Arc::new(FileBackend::new(dir.path()).await.unwrap());
    let engine = Engine::new(
        DurableStore::new(backend),
        gateway.clone() as Arc<dyn sprout_gateway::RemoteGateway>,
        EngineConfig::default(),
    )
    .await;
    assert_eq!(engine.pending_actions().await, 2);
    assert_eq!(engine.sync_now().await, SyncOutcome::Drained);
    assert_eq!(engine.pending_actions().await, 0);
    assert_eq!(gateway.call_count("addKindnessMoment"), 2);
}

/// An empty queue drains to Idle without touching the checkpoint.
#[tokio::test]
async fn empty_queue_drain_is_idle() {
    let backend = Arc::new(MemoryBackend::new());
    let gateway = Arc::new(MockGateway::new());
    let engine = engine_over(backend, gateway).await;

    assert_eq!(engine.sync_now().await, SyncOutcome::Idle);
    assert!(engine.last_sync().await.is_none());
}
