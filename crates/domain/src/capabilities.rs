use serde::{Deserialize, Serialize};

use crate::identity::{Identity, StaffRole, StaffStatus};
use crate::session::Session;

/// Request-scoped access flags derived from an identity. Never persisted;
/// recomputed on every request. Flags are independent, not mutually
/// exclusive: an active super-admin holds both admin and staff access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub is_authenticated: bool,
    pub is_super_admin: bool,
    pub is_adun: bool,
    pub is_zone_leader: bool,
    pub is_ketua_cawangan: bool,
    pub can_access_admin: bool,
    pub can_access_staff: bool,
    pub can_access_community: bool,
    pub staff_id: Option<String>,
    pub zone_id: Option<String>,
}

impl Capabilities {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

pub fn classify(identity: &Identity) -> Capabilities {
    match identity {
        Identity::Staff(staff) => {
            let is_super_admin = staff.role == StaffRole::SuperAdmin;
            let is_adun = staff.role == StaffRole::Adun;
            Capabilities {
                is_authenticated: true,
                is_super_admin,
                is_adun,
                is_zone_leader: staff.role == StaffRole::ZoneLeader,
                is_ketua_cawangan: staff.role == StaffRole::KetuaCawangan,
                can_access_admin: is_super_admin || is_adun,
                can_access_staff: staff.status == StaffStatus::Active,
                can_access_community: false,
                staff_id: Some(staff.staff_id.clone()),
                zone_id: staff.zone_id.clone(),
            }
        }
        Identity::Community(_) => Capabilities {
            is_authenticated: true,
            can_access_community: true,
            ..Capabilities::anonymous()
        },
    }
}

pub fn classify_session(session: &Session) -> Capabilities {
    match session {
        Session::Authenticated(identity) => classify(identity),
        Session::Unauthenticated => Capabilities::anonymous(),
    }
}
