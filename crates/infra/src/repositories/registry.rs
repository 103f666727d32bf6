use std::collections::HashMap;
use std::sync::Arc;

use khidmat_domain::DomainResult;
use khidmat_domain::ports::BoxFuture;
use khidmat_domain::ports::registry::RegistryRepository;
use khidmat_domain::registry::{Household, Village, Zone};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryRegistryRepository {
    zones: Arc<RwLock<HashMap<String, Zone>>>,
    villages: Arc<RwLock<HashMap<String, Village>>>,
    households: Arc<RwLock<HashMap<String, Household>>>,
}

impl InMemoryRegistryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_zone(&self, zone: Zone) {
        self.zones.write().await.insert(zone.zone_id.clone(), zone);
    }

    pub async fn upsert_village(&self, village: Village) {
        self.villages
            .write()
            .await
            .insert(village.village_id.clone(), village);
    }

    pub async fn upsert_household(&self, household: Household) {
        self.households
            .write()
            .await
            .insert(household.household_id.clone(), household);
    }
}

impl RegistryRepository for InMemoryRegistryRepository {
    fn get_household(&self, household_id: &str) -> BoxFuture<'_, DomainResult<Option<Household>>> {
        let household_id = household_id.to_string();
        let households = self.households.clone();
        Box::pin(async move { Ok(households.read().await.get(&household_id).cloned()) })
    }

    fn get_village(&self, village_id: &str) -> BoxFuture<'_, DomainResult<Option<Village>>> {
        let village_id = village_id.to_string();
        let villages = self.villages.clone();
        Box::pin(async move { Ok(villages.read().await.get(&village_id).cloned()) })
    }

    fn household_zone(&self, household_id: &str) -> BoxFuture<'_, DomainResult<Option<String>>> {
        let household_id = household_id.to_string();
        let households = self.households.clone();
        let villages = self.villages.clone();
        Box::pin(async move {
            let households = households.read().await;
            let Some(household) = households.get(&household_id) else {
                return Ok(None);
            };
            let villages = villages.read().await;
            Ok(villages
                .get(&household.village_id)
                .map(|village| village.zone_id.clone()))
        })
    }
}
