//! Family group repository

use std::sync::Arc;

use tracing::{debug, warn};

use sprout_core::FamilyGroup;
use sprout_gateway::RemoteGateway;
use sprout_store::{DurableStore, StoreKey};

/// Read-through façade for the family group
///
/// Family data is owned by the remote; the local copy is a cache, never
/// mutated here.
#[derive(Clone)]
pub struct FamilyRepository {
    store: DurableStore,
    gateway: Arc<dyn RemoteGateway>,
}

impl FamilyRepository {
    pub(crate) fn new(store: DurableStore, gateway: Arc<dyn RemoteGateway>) -> Self {
        Self { store, gateway }
    }

    /// The family group: cached copy first, one remote fetch on a miss.
    pub async fn get(&self, family_id: &str) -> Option<FamilyGroup> {
        if let Some(family) = self.store.get::<FamilyGroup>(StoreKey::FamilyData).await {
            return Some(family);
        }

        match self.gateway.get_family(family_id).await {
            Ok(response) => {
                let family = response.data?;
                if !self.store.set(StoreKey::FamilyData, &family).await {
                    debug!("Fetched family group not cached (storage degraded)");
                }
                Some(family)
            }
            Err(e) => {
                warn!(family_id, error = %e, "Failed to fetch family group");
                None
            }
        }
    }
}
