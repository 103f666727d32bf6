use std::sync::Arc;

use crate::DomainResult;
use crate::identity::Identity;
use crate::ports::directory::DirectoryRepository;
use crate::ports::sessions::{PrincipalRef, SessionStore};
use crate::util::now_ms;

/// Outcome of resolving request credentials. `Unauthenticated` is a normal
/// value: invalid, expired, and unknown tokens all land here, as does a
/// token whose principal no longer exists in the directory. Store failures
/// surface as `DomainError::Unavailable` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Authenticated(Identity),
    Unauthenticated,
}

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated(identity) => Some(identity),
            Session::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl_ms: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 14 * 24 * 60 * 60 * 1000,
        }
    }
}

/// One resolution algorithm, two entry points. `resolve_read_only` is safe
/// at call sites that cannot persist refresh side effects (page render);
/// `resolve` may slide the session expiry forward. Both return the same
/// decision for the same underlying session state.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    directory: Arc<dyn DirectoryRepository>,
    config: SessionConfig,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        directory: Arc<dyn DirectoryRepository>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            directory,
            config,
        }
    }

    pub async fn resolve_read_only(&self, token: &str) -> DomainResult<Session> {
        self.resolve_inner(token, false).await
    }

    pub async fn resolve(&self, token: &str) -> DomainResult<Session> {
        self.resolve_inner(token, true).await
    }

    async fn resolve_inner(&self, token: &str, allow_side_effects: bool) -> DomainResult<Session> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(Session::Unauthenticated);
        }

        let Some(record) = self.store.get(token).await? else {
            return Ok(Session::Unauthenticated);
        };

        let now = now_ms();
        if record.expires_at_ms <= now {
            return Ok(Session::Unauthenticated);
        }

        let identity = match &record.principal {
            PrincipalRef::Staff { staff_id } => self
                .directory
                .get_staff(staff_id)
                .await?
                .map(Identity::Staff),
            PrincipalRef::Community { profile_id } => self
                .directory
                .get_profile(profile_id)
                .await?
                .map(Identity::Community),
        };

        let Some(identity) = identity else {
            return Ok(Session::Unauthenticated);
        };

        if allow_side_effects {
            self.store
                .touch(token, now, now + self.config.ttl_ms)
                .await?;
        }

        Ok(Session::Authenticated(identity))
    }
}
