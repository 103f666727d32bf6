use super::BoxFuture;
use crate::DomainResult;
use crate::aid::{AidsProgram, AppliedMark, HouseholdDistributionMark, ProgramAssignment};

pub trait AidDistributionRepository: Send + Sync {
    fn get_program(&self, program_id: &str) -> BoxFuture<'_, DomainResult<Option<AidsProgram>>>;

    fn list_assignments(
        &self,
        staff_id: &str,
        program_id: &str,
    ) -> BoxFuture<'_, DomainResult<Vec<ProgramAssignment>>>;

    fn get_mark(
        &self,
        program_id: &str,
        household_id: &str,
    ) -> BoxFuture<'_, DomainResult<Option<HouseholdDistributionMark>>>;

    /// Upsert of one mark row plus recount of the program's received rows,
    /// performed under a single write exclusion so the cached aggregate can
    /// never lag behind the mark that produced it.
    fn apply_mark(
        &self,
        mark: &HouseholdDistributionMark,
    ) -> BoxFuture<'_, DomainResult<AppliedMark>>;

    fn count_received(&self, program_id: &str) -> BoxFuture<'_, DomainResult<u64>>;
}
