use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::DomainResult;
use crate::error::DomainError;
use crate::identity::Identity;
use crate::ports::aid::AidDistributionRepository;
use crate::ports::registry::RegistryRepository;
use crate::scope::ScopeService;
use crate::util::now_ms;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentType {
    KetuaCawangan,
    ZoneLeader,
}

impl AssignmentType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ketua_cawangan" => Some(AssignmentType::KetuaCawangan),
            "zone_leader" => Some(AssignmentType::ZoneLeader),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentType::KetuaCawangan => "ketua_cawangan",
            AssignmentType::ZoneLeader => "zone_leader",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AidsProgram {
    pub program_id: String,
    pub name: String,
    pub aid_type: String,
    pub total_households: u64,
    /// Cached projection of the received-mark count. Recomputed alongside
    /// every mark write and again on read; never incremented independently.
    pub distributed_households: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramAssignment {
    pub program_id: String,
    pub assigned_to: String,
    pub assignment_type: AssignmentType,
    pub zone_id: String,
}

/// One household's received/not-received fact for one program.
/// Invariant: `received` is true exactly when `marked_at_ms` and
/// `marked_by` are both set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdDistributionMark {
    pub program_id: String,
    pub household_id: String,
    pub received: bool,
    pub marked_at_ms: Option<i64>,
    pub marked_by: Option<String>,
}

impl HouseholdDistributionMark {
    pub fn received(
        program_id: impl Into<String>,
        household_id: impl Into<String>,
        staff_id: impl Into<String>,
        marked_at_ms: i64,
    ) -> Self {
        Self {
            program_id: program_id.into(),
            household_id: household_id.into(),
            received: true,
            marked_at_ms: Some(marked_at_ms),
            marked_by: Some(staff_id.into()),
        }
    }

    pub fn cleared(program_id: impl Into<String>, household_id: impl Into<String>) -> Self {
        Self {
            program_id: program_id.into(),
            household_id: household_id.into(),
            received: false,
            marked_at_ms: None,
            marked_by: None,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.received == (self.marked_at_ms.is_some() && self.marked_by.is_some())
    }
}

/// Result of one atomic mark upsert: the stored row and the program's
/// freshly recounted aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMark {
    pub mark: HouseholdDistributionMark,
    pub distributed_households: u64,
}

pub struct DistributionService {
    repository: Arc<dyn AidDistributionRepository>,
    registry: Arc<dyn RegistryRepository>,
    scope: ScopeService,
}

impl DistributionService {
    pub fn new(
        repository: Arc<dyn AidDistributionRepository>,
        registry: Arc<dyn RegistryRepository>,
    ) -> Self {
        let scope = ScopeService::new(repository.clone());
        Self {
            repository,
            registry,
            scope,
        }
    }

    /// Marks a household as having received the program's aid. Re-marking an
    /// already-received household succeeds and refreshes the marker fields.
    pub async fn mark_received(
        &self,
        identity: &Identity,
        program_id: &str,
        household_id: &str,
    ) -> DomainResult<AppliedMark> {
        let staff_id = self
            .authorize_mark(identity, program_id, household_id)
            .await?;
        let mark =
            HouseholdDistributionMark::received(program_id, household_id, staff_id, now_ms());
        self.repository.apply_mark(&mark).await
    }

    /// Clears a mark. The received flag and both marker fields are cleared
    /// together; a partial clear never reaches the store.
    pub async fn unmark_received(
        &self,
        identity: &Identity,
        program_id: &str,
        household_id: &str,
    ) -> DomainResult<AppliedMark> {
        self.authorize_mark(identity, program_id, household_id)
            .await?;
        let mark = HouseholdDistributionMark::cleared(program_id, household_id);
        self.repository.apply_mark(&mark).await
    }

    /// Program aggregate with `distributed_households` recounted from mark
    /// rows at read time, so a stale stored value can never be served.
    pub async fn program_summary(
        &self,
        identity: &Identity,
        program_id: &str,
    ) -> DomainResult<AidsProgram> {
        identity
            .active_staff()
            .ok_or(DomainError::Unauthenticated)?;
        let program = self
            .repository
            .get_program(program_id)
            .await?
            .ok_or(DomainError::NotFound)?;
        let distributed_households = self.repository.count_received(program_id).await?;
        Ok(AidsProgram {
            distributed_households,
            ..program
        })
    }

    /// Precondition chain, first failure wins: active staff, program scope,
    /// household inside the scoped zone.
    async fn authorize_mark(
        &self,
        identity: &Identity,
        program_id: &str,
        household_id: &str,
    ) -> DomainResult<String> {
        let staff = identity
            .active_staff()
            .ok_or(DomainError::Unauthenticated)?;

        self.repository
            .get_program(program_id)
            .await?
            .ok_or(DomainError::NotFound)?;

        let scope = self.scope.scoped_zone_ids(identity, program_id).await?;
        if scope.is_empty() {
            return Err(DomainError::Forbidden(
                "not assigned to this program/zone".into(),
            ));
        }

        // Re-check the household's own zone even when the caller's listing
        // was already scope-filtered.
        let zone_id = self
            .registry
            .household_zone(household_id)
            .await?
            .ok_or(DomainError::NotFound)?;
        if !scope.contains(&zone_id) {
            return Err(DomainError::Forbidden(
                "household outside assigned zone".into(),
            ));
        }

        Ok(staff.staff_id.clone())
    }
}
