use serde::{Deserialize, Serialize};

use super::BoxFuture;
use crate::DomainResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrincipalRef {
    Staff { staff_id: String },
    Community { profile_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub principal: PrincipalRef,
    pub issued_at_ms: i64,
    pub expires_at_ms: i64,
    pub last_seen_at_ms: i64,
}

pub trait SessionStore: Send + Sync {
    fn get(&self, token: &str) -> BoxFuture<'_, DomainResult<Option<SessionRecord>>>;

    /// Sliding-expiry refresh. Only the mutating session resolver calls this.
    fn touch(
        &self,
        token: &str,
        seen_at_ms: i64,
        expires_at_ms: i64,
    ) -> BoxFuture<'_, DomainResult<()>>;
}
