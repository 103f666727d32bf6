use std::collections::HashMap;
use std::sync::Arc;

use khidmat_domain::DomainResult;
use khidmat_domain::aid::{
    AidsProgram, AppliedMark, HouseholdDistributionMark, ProgramAssignment,
};
use khidmat_domain::ports::BoxFuture;
use khidmat_domain::ports::aid::AidDistributionRepository;
use tokio::sync::RwLock;

/// Programs, assignments, and mark rows behind one lock pair. `apply_mark`
/// holds the mark-table write guard across the upsert and the recount, which
/// is what keeps the cached aggregate from lagging under concurrent marking.
#[derive(Default)]
pub struct InMemoryAidDistributionRepository {
    programs: Arc<RwLock<HashMap<String, AidsProgram>>>,
    assignments: Arc<RwLock<Vec<ProgramAssignment>>>,
    marks: Arc<RwLock<HashMap<(String, String), HouseholdDistributionMark>>>,
}

impl InMemoryAidDistributionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_program(&self, program: AidsProgram) {
        self.programs
            .write()
            .await
            .insert(program.program_id.clone(), program);
    }

    pub async fn add_assignment(&self, assignment: ProgramAssignment) {
        self.assignments.write().await.push(assignment);
    }
}

impl AidDistributionRepository for InMemoryAidDistributionRepository {
    fn get_program(&self, program_id: &str) -> BoxFuture<'_, DomainResult<Option<AidsProgram>>> {
        let program_id = program_id.to_string();
        let programs = self.programs.clone();
        Box::pin(async move { Ok(programs.read().await.get(&program_id).cloned()) })
    }

    fn list_assignments(
        &self,
        staff_id: &str,
        program_id: &str,
    ) -> BoxFuture<'_, DomainResult<Vec<ProgramAssignment>>> {
        let staff_id = staff_id.to_string();
        let program_id = program_id.to_string();
        let assignments = self.assignments.clone();
        Box::pin(async move {
            let assignments = assignments.read().await;
            Ok(assignments
                .iter()
                .filter(|assignment| {
                    assignment.assigned_to == staff_id && assignment.program_id == program_id
                })
                .cloned()
                .collect())
        })
    }

    fn get_mark(
        &self,
        program_id: &str,
        household_id: &str,
    ) -> BoxFuture<'_, DomainResult<Option<HouseholdDistributionMark>>> {
        let key = (program_id.to_string(), household_id.to_string());
        let marks = self.marks.clone();
        Box::pin(async move { Ok(marks.read().await.get(&key).cloned()) })
    }

    fn apply_mark(
        &self,
        mark: &HouseholdDistributionMark,
    ) -> BoxFuture<'_, DomainResult<AppliedMark>> {
        let mark = mark.clone();
        let marks = self.marks.clone();
        let programs = self.programs.clone();
        Box::pin(async move {
            debug_assert!(mark.is_consistent());

            let mut marks = marks.write().await;
            let key = (mark.program_id.clone(), mark.household_id.clone());
            marks.insert(key, mark.clone());
            let count = marks
                .values()
                .filter(|row| row.program_id == mark.program_id && row.received)
                .count() as u64;

            let mut programs = programs.write().await;
            if let Some(program) = programs.get_mut(&mark.program_id) {
                program.distributed_households = count;
            }

            Ok(AppliedMark {
                mark,
                distributed_households: count,
            })
        })
    }

    fn count_received(&self, program_id: &str) -> BoxFuture<'_, DomainResult<u64>> {
        let program_id = program_id.to_string();
        let marks = self.marks.clone();
        Box::pin(async move {
            let marks = marks.read().await;
            Ok(marks
                .values()
                .filter(|row| row.program_id == program_id && row.received)
                .count() as u64)
        })
    }
}
