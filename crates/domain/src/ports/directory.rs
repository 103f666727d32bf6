use super::BoxFuture;
use crate::DomainResult;
use crate::identity::{CommunityIdentity, StaffIdentity};

/// Staff and community-profile lookup behind the session resolver.
pub trait DirectoryRepository: Send + Sync {
    fn get_staff(&self, staff_id: &str) -> BoxFuture<'_, DomainResult<Option<StaffIdentity>>>;

    fn get_profile(
        &self,
        profile_id: &str,
    ) -> BoxFuture<'_, DomainResult<Option<CommunityIdentity>>>;
}
