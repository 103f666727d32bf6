use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;

pub const ADMIN_DASHBOARD_PATH: &str = "/admin/dashboard";
pub const STAFF_DASHBOARD_PATH: &str = "/staff/dashboard";
pub const COMMUNITY_DASHBOARD_PATH: &str = "/community/dashboard";
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";
pub const STAFF_LOGIN_PATH: &str = "/staff/login";
pub const COMMUNITY_LOGIN_PATH: &str = "/community/login";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workspace {
    Admin,
    Staff,
    Community,
}

impl Workspace {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Workspace::Admin),
            "staff" => Some(Workspace::Staff),
            "community" => Some(Workspace::Community),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Workspace::Admin => "admin",
            Workspace::Staff => "staff",
            Workspace::Community => "community",
        }
    }

    pub fn login_path(&self) -> &'static str {
        match self {
            Workspace::Admin => ADMIN_LOGIN_PATH,
            Workspace::Staff => STAFF_LOGIN_PATH,
            Workspace::Community => COMMUNITY_LOGIN_PATH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(&'static str),
}

/// Workspace entry decision. Total over every `Capabilities` value: absence
/// of access resolves to a redirect target, never an error.
pub fn gate(capabilities: &Capabilities, workspace: Workspace) -> GateDecision {
    match workspace {
        Workspace::Admin => {
            if !capabilities.can_access_admin {
                let target = if capabilities.can_access_staff {
                    STAFF_DASHBOARD_PATH
                } else if capabilities.can_access_community {
                    COMMUNITY_DASHBOARD_PATH
                } else {
                    ADMIN_LOGIN_PATH
                };
                return GateDecision::Redirect(target);
            }
            // Authenticated but never provisioned as staff: back to login.
            if capabilities.staff_id.is_none() {
                return GateDecision::Redirect(ADMIN_LOGIN_PATH);
            }
            GateDecision::Allow
        }
        Workspace::Staff => {
            if !capabilities.can_access_staff && !capabilities.can_access_admin {
                if capabilities.can_access_community {
                    return GateDecision::Redirect(COMMUNITY_DASHBOARD_PATH);
                }
                if !capabilities.is_authenticated {
                    return GateDecision::Redirect(STAFF_LOGIN_PATH);
                }
                // Authenticated identity with no workspace at all: let the
                // client-side check decide, so the login page itself cannot
                // enter a redirect loop.
            }
            GateDecision::Allow
        }
        Workspace::Community => {
            if !capabilities.can_access_community {
                let target = if capabilities.can_access_admin {
                    ADMIN_DASHBOARD_PATH
                } else if capabilities.can_access_staff {
                    STAFF_DASHBOARD_PATH
                } else {
                    COMMUNITY_LOGIN_PATH
                };
                return GateDecision::Redirect(target);
            }
            GateDecision::Allow
        }
    }
}
