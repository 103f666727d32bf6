use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    SuperAdmin,
    Adun,
    ZoneLeader,
    KetuaCawangan,
    Staff,
}

impl StaffRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "super_admin" => Some(StaffRole::SuperAdmin),
            "adun" => Some(StaffRole::Adun),
            "zone_leader" => Some(StaffRole::ZoneLeader),
            "ketua_cawangan" => Some(StaffRole::KetuaCawangan),
            "staff" => Some(StaffRole::Staff),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::SuperAdmin => "super_admin",
            StaffRole::Adun => "adun",
            StaffRole::ZoneLeader => "zone_leader",
            StaffRole::KetuaCawangan => "ketua_cawangan",
            StaffRole::Staff => "staff",
        }
    }

    /// Super-admin and ADUN are the two admin-workspace roles.
    pub fn is_admin_capable(&self) -> bool {
        matches!(self, StaffRole::SuperAdmin | StaffRole::Adun)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffStatus {
    Active,
    Inactive,
}

impl StaffStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(StaffStatus::Active),
            "inactive" => Some(StaffStatus::Inactive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StaffStatus::Active => "active",
            StaffStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffIdentity {
    pub staff_id: String,
    pub name: String,
    pub role: StaffRole,
    pub zone_id: Option<String>,
    pub status: StaffStatus,
}

impl StaffIdentity {
    pub fn is_active(&self) -> bool {
        self.status == StaffStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityIdentity {
    pub profile_id: String,
    pub full_name: String,
    pub verification_status: VerificationStatus,
    pub household_member_id: Option<String>,
}

/// A resolved principal. Staff and community identities are mutually
/// exclusive: a session is bound to exactly one of these at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    Staff(StaffIdentity),
    Community(CommunityIdentity),
}

impl Identity {
    pub fn staff(&self) -> Option<&StaffIdentity> {
        match self {
            Identity::Staff(staff) => Some(staff),
            Identity::Community(_) => None,
        }
    }

    pub fn active_staff(&self) -> Option<&StaffIdentity> {
        self.staff().filter(|staff| staff.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in [
            StaffRole::SuperAdmin,
            StaffRole::Adun,
            StaffRole::ZoneLeader,
            StaffRole::KetuaCawangan,
            StaffRole::Staff,
        ] {
            assert_eq!(StaffRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(StaffRole::parse("moderator"), None);
    }

    #[test]
    fn only_super_admin_and_adun_are_admin_capable() {
        assert!(StaffRole::SuperAdmin.is_admin_capable());
        assert!(StaffRole::Adun.is_admin_capable());
        assert!(!StaffRole::ZoneLeader.is_admin_capable());
        assert!(!StaffRole::KetuaCawangan.is_admin_capable());
        assert!(!StaffRole::Staff.is_admin_capable());
    }
}
