//! # Sprout Gateway
//!
//! Remote transport for the Sprout offline-first data engine.
//!
//! ## Features
//!
//! - **RemoteGateway trait**: One method per logical endpoint, all
//!   returning the uniform [`ApiResponse`] envelope
//! - **HttpGateway**: `reqwest`-based implementation with bounded
//!   fixed-delay retry
//! - **GatewayError**: transient/permanent error split so the sync
//!   coordinator can dead-letter permanently rejected actions
//!
//! The gateway is a stateless transport: it knows nothing about the
//! offline queue or local storage. The coordinator uses it to replay
//! queued mutations; repositories use it opportunistically for
//! first-load population.

pub mod error;
pub mod http;
pub mod retry;

// Re-exports
pub use error::GatewayError;
pub use http::{HttpGateway, HttpGatewayConfig};
pub use retry::{RetryPolicy, with_retry};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sprout_core::{
    Activity, ActivityResult, ApiResponse, FamilyGroup, KindnessMoment, Profile, StorybookEntry,
    UserProgress,
};

/// Trait for the remote service the engine replicates into
///
/// One method per logical endpoint. Implementations perform the actual
/// transport; callers receive either the uniform response envelope or a
/// [`GatewayError`] classified as transient or permanent.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// `GET /profile/{id}`
    async fn get_profile(&self, user_id: &str) -> Result<ApiResponse<Profile>, GatewayError>;

    /// `PUT /profile`
    async fn update_profile(&self, profile: &Profile)
    -> Result<ApiResponse<Profile>, GatewayError>;

    /// `GET /activities[?filters]`
    async fn get_activities(
        &self,
        filters: &[(String, String)],
    ) -> Result<ApiResponse<Vec<Activity>>, GatewayError>;

    /// `POST /activities/result`
    async fn submit_activity_result(
        &self,
        result: &ActivityResult,
    ) -> Result<ApiResponse<serde_json::Value>, GatewayError>;

    /// `GET /progress/{id}`
    async fn get_progress(&self, user_id: &str)
    -> Result<ApiResponse<UserProgress>, GatewayError>;

    /// `PUT /progress`
    async fn update_progress(
        &self,
        progress: &UserProgress,
    ) -> Result<ApiResponse<UserProgress>, GatewayError>;

    /// `GET /family/{id}`
    async fn get_family(&self, family_id: &str)
    -> Result<ApiResponse<FamilyGroup>, GatewayError>;

    /// `POST /storybook`
    async fn add_storybook_entry(
        &self,
        entry: &StorybookEntry,
    ) -> Result<ApiResponse<StorybookEntry>, GatewayError>;

    /// `POST /kindness`
    async fn add_kindness_moment(
        &self,
        moment: &KindnessMoment,
    ) -> Result<ApiResponse<KindnessMoment>, GatewayError>;

    /// `GET /sync[?since=ISO8601]`
    async fn sync(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<ApiResponse<serde_json::Value>, GatewayError>;
}
