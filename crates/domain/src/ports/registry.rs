use super::BoxFuture;
use crate::DomainResult;
use crate::registry::{Household, Village};

pub trait RegistryRepository: Send + Sync {
    fn get_household(
        &self,
        household_id: &str,
    ) -> BoxFuture<'_, DomainResult<Option<Household>>>;

    fn get_village(&self, village_id: &str) -> BoxFuture<'_, DomainResult<Option<Village>>>;

    /// Household → village → zone join.
    fn household_zone(&self, household_id: &str) -> BoxFuture<'_, DomainResult<Option<String>>>;
}
