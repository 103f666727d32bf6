use std::collections::HashMap;
use std::sync::Arc;

use khidmat_domain::DomainResult;
use khidmat_domain::identity::{CommunityIdentity, StaffIdentity};
use khidmat_domain::ports::BoxFuture;
use khidmat_domain::ports::directory::DirectoryRepository;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryDirectoryRepository {
    staff: Arc<RwLock<HashMap<String, StaffIdentity>>>,
    profiles: Arc<RwLock<HashMap<String, CommunityIdentity>>>,
}

impl InMemoryDirectoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_staff(&self, staff: StaffIdentity) {
        self.staff
            .write()
            .await
            .insert(staff.staff_id.clone(), staff);
    }

    pub async fn upsert_profile(&self, profile: CommunityIdentity) {
        self.profiles
            .write()
            .await
            .insert(profile.profile_id.clone(), profile);
    }
}

impl DirectoryRepository for InMemoryDirectoryRepository {
    fn get_staff(&self, staff_id: &str) -> BoxFuture<'_, DomainResult<Option<StaffIdentity>>> {
        let staff_id = staff_id.to_string();
        let staff = self.staff.clone();
        Box::pin(async move { Ok(staff.read().await.get(&staff_id).cloned()) })
    }

    fn get_profile(
        &self,
        profile_id: &str,
    ) -> BoxFuture<'_, DomainResult<Option<CommunityIdentity>>> {
        let profile_id = profile_id.to_string();
        let profiles = self.profiles.clone();
        Box::pin(async move { Ok(profiles.read().await.get(&profile_id).cloned()) })
    }
}
