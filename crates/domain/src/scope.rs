use std::collections::BTreeSet;
use std::sync::Arc;

use crate::DomainResult;
use crate::aid::AssignmentType;
use crate::identity::{Identity, StaffRole};
use crate::ports::aid::AidDistributionRepository;

/// Zones a staff identity may act upon. Admin-capable staff carry an
/// explicit unrestricted marker rather than an enumerated zone listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneScope {
    Unrestricted,
    Zones(BTreeSet<String>),
}

impl ZoneScope {
    pub fn none() -> Self {
        ZoneScope::Zones(BTreeSet::new())
    }

    pub fn contains(&self, zone_id: &str) -> bool {
        match self {
            ZoneScope::Unrestricted => true,
            ZoneScope::Zones(zones) => zones.contains(zone_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ZoneScope::Unrestricted => false,
            ZoneScope::Zones(zones) => zones.is_empty(),
        }
    }
}

#[derive(Clone)]
pub struct ScopeService {
    repository: Arc<dyn AidDistributionRepository>,
}

impl ScopeService {
    pub fn new(repository: Arc<dyn AidDistributionRepository>) -> Self {
        Self { repository }
    }

    /// Zones `identity` may act upon for `program_id`. Ketua cawangan scope
    /// comes from per-program assignments; zone-leader scope is the zone
    /// bound to the staff record, independent of the program. Everyone else
    /// (plain staff, inactive staff, community profiles) gets an empty set.
    pub async fn scoped_zone_ids(
        &self,
        identity: &Identity,
        program_id: &str,
    ) -> DomainResult<ZoneScope> {
        let Some(staff) = identity.staff() else {
            return Ok(ZoneScope::none());
        };
        if !staff.is_active() {
            return Ok(ZoneScope::none());
        }
        if staff.role.is_admin_capable() {
            return Ok(ZoneScope::Unrestricted);
        }

        match staff.role {
            StaffRole::ZoneLeader => {
                Ok(ZoneScope::Zones(staff.zone_id.iter().cloned().collect()))
            }
            StaffRole::KetuaCawangan => {
                let assignments = self
                    .repository
                    .list_assignments(&staff.staff_id, program_id)
                    .await?;
                let zones = assignments
                    .into_iter()
                    .filter(|assignment| assignment.assignment_type == AssignmentType::KetuaCawangan)
                    .map(|assignment| assignment.zone_id)
                    .collect();
                Ok(ZoneScope::Zones(zones))
            }
            StaffRole::SuperAdmin | StaffRole::Adun | StaffRole::Staff => Ok(ZoneScope::none()),
        }
    }
}
