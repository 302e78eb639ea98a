//! Engine configuration

use std::time::Duration;

/// Configuration for the sync engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Id used for remote profile/progress lookups
    pub user_id: String,
    /// How often the coordinator drains the queue
    pub sync_interval: Duration,
    /// Storage-pressure threshold (percent of quota) above which the
    /// cleanup policy trims old storybook entries
    pub pressure_threshold: f64,
    /// How long storybook entries are kept once under pressure
    pub storybook_retention_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_id: "current".to_string(),
            sync_interval: Duration::from_secs(30),
            pressure_threshold: 80.0,
            storybook_retention_days: 180,
        }
    }
}
