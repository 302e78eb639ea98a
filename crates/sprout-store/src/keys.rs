//! Namespaced storage keys
//!
//! Every value the engine persists lives under one of these keys. The
//! namespace prefix keeps `clear` from touching unrelated application
//! state sharing the same backend.

/// The namespaced keys the engine owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The user profile
    Profile,
    /// Cached family group data
    FamilyData,
    /// Aggregate user progress
    Progress,
    /// Application settings blob
    Settings,
    /// The offline mutation queue
    OfflineQueue,
    /// Timestamp of the last fully-drained sync pass
    LastSync,
    /// Storybook entries
    Storybook,
    /// Kindness moments
    KindnessMoments,
    /// Earned achievements
    Achievements,
    /// Locally recorded activity results
    ActivityResults,
    /// Permanently-failed actions retained for inspection
    DeadLetters,
}

impl StoreKey {
    /// All keys the engine owns, in a stable order.
    pub const ALL: [StoreKey; 11] = [
        StoreKey::Profile,
        StoreKey::FamilyData,
        StoreKey::Progress,
        StoreKey::Settings,
        StoreKey::OfflineQueue,
        StoreKey::LastSync,
        StoreKey::Storybook,
        StoreKey::KindnessMoments,
        StoreKey::Achievements,
        StoreKey::ActivityResults,
        StoreKey::DeadLetters,
    ];

    /// The namespaced string form used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Profile => "sprout_profile",
            StoreKey::FamilyData => "sprout_family",
            StoreKey::Progress => "sprout_progress",
            StoreKey::Settings => "sprout_settings",
            StoreKey::OfflineQueue => "sprout_offline_queue",
            StoreKey::LastSync => "sprout_last_sync",
            StoreKey::Storybook => "sprout_storybook",
            StoreKey::KindnessMoments => "sprout_kindness",
            StoreKey::Achievements => "sprout_achievements",
            StoreKey::ActivityResults => "sprout_activity_results",
            StoreKey::DeadLetters => "sprout_dead_letters",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
