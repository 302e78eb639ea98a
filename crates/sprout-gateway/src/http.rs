//! HTTP implementation of the remote gateway
//!
//! Thin `reqwest` wrapper: every endpoint method builds a request,
//! runs it through the bounded retry helper, maps non-2xx statuses to
//! typed errors carrying the status and failing URL, and wraps the
//! decoded body in the uniform [`ApiResponse`] envelope.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use sprout_core::{
    Activity, ActivityResult, ApiResponse, FamilyGroup, KindnessMoment, Profile, StorybookEntry,
    UserProgress,
};

use crate::RemoteGateway;
use crate::error::GatewayError;
use crate::retry::{RetryPolicy, with_retry};

/// Logical endpoint paths, relative to the base URL
mod endpoints {
    pub const PROFILE: &str = "/profile";
    pub const ACTIVITIES: &str = "/activities";
    pub const ACTIVITY_RESULT: &str = "/activities/result";
    pub const PROGRESS: &str = "/progress";
    pub const FAMILY: &str = "/family";
    pub const STORYBOOK: &str = "/storybook";
    pub const KINDNESS: &str = "/kindness";
    pub const SYNC: &str = "/sync";
}

/// Configuration for [`HttpGateway`]
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Base URL all endpoint paths are appended to
    pub base_url: String,
    /// Retry policy applied to every request
    pub retry: RetryPolicy,
    /// Per-request timeout
    pub timeout: Duration,
}

impl HttpGatewayConfig {
    /// Config with default retry bounds for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// `reqwest`-backed implementation of [`RemoteGateway`]
#[derive(Debug, Clone)]
pub struct HttpGateway {
    config: HttpGatewayConfig,
    client: reqwest::Client,
}

impl HttpGateway {
    /// Build a gateway from the given configuration.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GatewayError::from)?;
        Ok(Self { config, client })
    }

    /// Issue one request attempt and decode the body.
    async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = format!("{}{}", self.config.base_url, path);
        let mut request = self.client.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let data: T = response.json().await?;
        debug!(%url, status = status.as_u16(), "Request succeeded");
        Ok(ApiResponse::ok(data))
    }

    /// Run a request under the configured retry policy.
    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        with_retry(self.config.retry, || {
            self.execute(method.clone(), path, query, body)
        })
        .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<ApiResponse<T>, GatewayError> {
        self.request::<T, ()>(Method::GET, path, query, None).await
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn get_profile(&self, user_id: &str) -> Result<ApiResponse<Profile>, GatewayError> {
        self.get(&format!("{}/{user_id}", endpoints::PROFILE), &[])
            .await
    }

    async fn update_profile(
        &self,
        profile: &Profile,
    ) -> Result<ApiResponse<Profile>, GatewayError> {
        self.request(Method::PUT, endpoints::PROFILE, &[], Some(profile))
            .await
    }

    async fn get_activities(
        &self,
        filters: &[(String, String)],
    ) -> Result<ApiResponse<Vec<Activity>>, GatewayError> {
        self.get(endpoints::ACTIVITIES, filters).await
    }

    async fn submit_activity_result(
        &self,
        result: &ActivityResult,
    ) -> Result<ApiResponse<serde_json::Value>, GatewayError> {
        self.request(Method::POST, endpoints::ACTIVITY_RESULT, &[], Some(result))
            .await
    }

    async fn get_progress(
        &self,
        user_id: &str,
    ) -> Result<ApiResponse<UserProgress>, GatewayError> {
        self.get(&format!("{}/{user_id}", endpoints::PROGRESS), &[])
            .await
    }

    async fn update_progress(
        &self,
        progress: &UserProgress,
    ) -> Result<ApiResponse<UserProgress>, GatewayError> {
        self.request(Method::PUT, endpoints::PROGRESS, &[], Some(progress))
            .await
    }

    async fn get_family(&self, family_id: &str) -> Result<ApiResponse<FamilyGroup>, GatewayError> {
        self.get(&format!("{}/{family_id}", endpoints::FAMILY), &[])
            .await
    }

    async fn add_storybook_entry(
        &self,
        entry: &StorybookEntry,
    ) -> Result<ApiResponse<StorybookEntry>, GatewayError> {
        self.request(Method::POST, endpoints::STORYBOOK, &[], Some(entry))
            .await
    }

    async fn add_kindness_moment(
        &self,
        moment: &KindnessMoment,
    ) -> Result<ApiResponse<KindnessMoment>, GatewayError> {
        self.request(Method::POST, endpoints::KINDNESS, &[], Some(moment))
            .await
    }

    async fn sync(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<ApiResponse<serde_json::Value>, GatewayError> {
        let query: Vec<(String, String)> = since
            .map(|t| vec![("since".to_string(), t.to_rfc3339())])
            .unwrap_or_default();
        self.get(endpoints::SYNC, &query).await
    }
}
