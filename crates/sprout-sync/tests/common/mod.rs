//! Shared test doubles for the sync engine tests
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::{Value, json};

use sprout_core::{
    Activity, ActivityResult, ApiResponse, FamilyGroup, KindnessMoment, Profile, StorybookEntry,
    UserProgress,
};
use sprout_gateway::{GatewayError, RemoteGateway};

/// Enable log output for a test run via `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// How the mock fails gated calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Transient transport error
    Transient,
    /// Permanent HTTP 400 rejection
    Permanent,
}

/// A scripted in-memory remote
///
/// Successful mutation calls apply their payload to `remote`, so tests
/// can assert the final remote state. Failures are scripted either as
/// "fail the next N calls" or "fail specific call indices".
#[derive(Default)]
pub struct MockGateway {
    /// Remote state applied by successful mutations
    pub remote: DashMap<String, Value>,
    /// Method names in call order
    calls: StdMutex<Vec<String>>,
    call_counter: AtomicUsize,
    fail_remaining: AtomicU32,
    fail_calls: StdMutex<HashSet<usize>>,
    mode: StdMutex<Option<FailureMode>>,
    served_profile: StdMutex<Option<Profile>>,
    served_family: StdMutex<Option<FamilyGroup>>,
    /// Artificial latency per call, for interleaving tests
    pub latency: StdMutex<Duration>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every gated call until `succeed` is called.
    pub fn fail_always(&self, mode: FailureMode) {
        *self.mode.lock().unwrap() = Some(mode);
        self.fail_remaining.store(u32::MAX, Ordering::SeqCst);
    }

    /// Fail the next `n` gated calls.
    pub fn fail_next(&self, n: u32, mode: FailureMode) {
        *self.mode.lock().unwrap() = Some(mode);
        self.fail_remaining.store(n, Ordering::SeqCst);
    }

    /// Fail specific 1-based call indices (counted across all methods).
    pub fn fail_call_indices(&self, indices: &[usize], mode: FailureMode) {
        *self.mode.lock().unwrap() = Some(mode);
        *self.fail_calls.lock().unwrap() = indices.iter().copied().collect();
    }

    /// Stop failing.
    pub fn succeed(&self) {
        *self.mode.lock().unwrap() = None;
        self.fail_remaining.store(0, Ordering::SeqCst);
        self.fail_calls.lock().unwrap().clear();
    }

    /// Profile served by `get_profile`.
    pub fn serve_profile(&self, profile: Profile) {
        *self.served_profile.lock().unwrap() = Some(profile);
    }

    /// Family group served by `get_family`.
    pub fn serve_family(&self, family: FamilyGroup) {
        *self.served_family.lock().unwrap() = Some(family);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| *c == method)
            .count()
    }

    async fn gate(&self, method: &str) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(method.to_string());
        let index = self.call_counter.fetch_add(1, Ordering::SeqCst) + 1;

        let latency = *self.latency.lock().unwrap();
        if latency > Duration::ZERO {
            tokio::time::sleep(latency).await;
        }

        let mode = *self.mode.lock().unwrap();
        let Some(mode) = mode else { return Ok(()) };

        let indexed = self.fail_calls.lock().unwrap().contains(&index);
        let counted = {
            let remaining = self.fail_remaining.load(Ordering::SeqCst);
            if remaining > 0 && remaining != u32::MAX {
                self.fail_remaining.fetch_sub(1, Ordering::SeqCst);
                true
            } else {
                remaining == u32::MAX
            }
        };

        if !indexed && !counted {
            return Ok(());
        }

        match mode {
            FailureMode::Transient => Err(GatewayError::Transport(format!(
                "scripted failure on {method}"
            ))),
            FailureMode::Permanent => Err(GatewayError::Http {
                status: 400,
                url: format!("mock://{method}"),
            }),
        }
    }

    fn push_to(&self, key: &str, value: Value) {
        let mut list = self
            .remote
            .entry(key.to_string())
            .or_insert_with(|| json!([]));
        if let Some(array) = list.as_array_mut() {
            array.push(value);
        }
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn get_profile(&self, _user_id: &str) -> Result<ApiResponse<Profile>, GatewayError> {
        self.gate("getProfile").await?;
        match self.served_profile.lock().unwrap().clone() {
            Some(profile) => Ok(ApiResponse::ok(profile)),
            None => Ok(ApiResponse::err("profile not found")),
        }
    }

    async fn update_profile(
        &self,
        profile: &Profile,
    ) -> Result<ApiResponse<Profile>, GatewayError> {
        self.gate("updateProfile").await?;
        self.remote.insert(
            "profile".to_string(),
            serde_json::to_value(profile).unwrap(),
        );
        Ok(ApiResponse::ok(profile.clone()))
    }

    async fn get_activities(
        &self,
        _filters: &[(String, String)],
    ) -> Result<ApiResponse<Vec<Activity>>, GatewayError> {
        self.gate("getActivities").await?;
        Ok(ApiResponse::ok(Vec::new()))
    }

    async fn submit_activity_result(
        &self,
        result: &ActivityResult,
    ) -> Result<ApiResponse<Value>, GatewayError> {
        self.gate("submitActivityResult").await?;
        self.push_to("activityResults", serde_json::to_value(result).unwrap());
        Ok(ApiResponse::ok(json!({})))
    }

    async fn get_progress(
        &self,
        _user_id: &str,
    ) -> Result<ApiResponse<UserProgress>, GatewayError> {
        self.gate("getProgress").await?;
        Ok(ApiResponse::err("progress not found"))
    }

    async fn update_progress(
        &self,
        progress: &UserProgress,
    ) -> Result<ApiResponse<UserProgress>, GatewayError> {
        self.gate("updateProgress").await?;
        self.remote.insert(
            "progress".to_string(),
            serde_json::to_value(progress).unwrap(),
        );
        Ok(ApiResponse::ok(progress.clone()))
    }

    async fn get_family(&self, _family_id: &str) -> Result<ApiResponse<FamilyGroup>, GatewayError> {
        self.gate("getFamily").await?;
        match self.served_family.lock().unwrap().clone() {
            Some(family) => Ok(ApiResponse::ok(family)),
            None => Ok(ApiResponse::err("family not found")),
        }
    }

    async fn add_storybook_entry(
        &self,
        entry: &StorybookEntry,
    ) -> Result<ApiResponse<StorybookEntry>, GatewayError> {
        self.gate("addStorybookEntry").await?;
        self.push_to("storybook", serde_json::to_value(entry).unwrap());
        Ok(ApiResponse::ok(entry.clone()))
    }

    async fn add_kindness_moment(
        &self,
        moment: &KindnessMoment,
    ) -> Result<ApiResponse<KindnessMoment>, GatewayError> {
        self.gate("addKindnessMoment").await?;
        self.push_to("kindness", serde_json::to_value(moment).unwrap());
        Ok(ApiResponse::ok(moment.clone()))
    }

    async fn sync(
        &self,
        _since: Option<DateTime<Utc>>,
    ) -> Result<ApiResponse<Value>, GatewayError> {
        self.gate("sync").await?;
        Ok(ApiResponse::ok(json!({})))
    }
}

/// A profile for tests.
pub fn sample_profile(name: &str) -> Profile {
    use sprout_core::{AgeGroup, Preferences};
    Profile {
        id: "user_1".to_string(),
        name: name.to_string(),
        age: 6,
        age_group: AgeGroup::Elementary,
        avatar: "bunny".to_string(),
        preferences: Preferences::default(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A kindness moment worth `points`.
pub fn sample_moment(points: u32) -> sprout_core::NewKindnessMoment {
    sprout_core::NewKindnessMoment {
        user_id: "user_1".to_string(),
        date: Utc::now(),
        description: format!("A kind act worth {points}"),
        category: "helping".to_string(),
        points,
        verified: false,
    }
}

/// A storybook entry dated `date`.
pub fn sample_entry(title: &str, date: DateTime<Utc>) -> sprout_core::NewStorybookEntry {
    sprout_core::NewStorybookEntry {
        date,
        title: title.to_string(),
        description: "x".repeat(200),
        kind: sprout_core::EntryKind::Memory,
        participants: Vec::new(),
        tags: Vec::new(),
        mood: "happy".to_string(),
    }
}
