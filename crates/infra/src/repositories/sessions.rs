use std::collections::HashMap;
use std::sync::Arc;

use khidmat_domain::DomainResult;
use khidmat_domain::error::DomainError;
use khidmat_domain::ports::BoxFuture;
use khidmat_domain::ports::sessions::{SessionRecord, SessionStore};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemorySessionStore {
    records: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: SessionRecord) {
        self.records
            .write()
            .await
            .insert(record.token.clone(), record);
    }

    pub async fn remove(&self, token: &str) {
        self.records.write().await.remove(token);
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, token: &str) -> BoxFuture<'_, DomainResult<Option<SessionRecord>>> {
        let token = token.to_string();
        let records = self.records.clone();
        Box::pin(async move { Ok(records.read().await.get(&token).cloned()) })
    }

    fn touch(
        &self,
        token: &str,
        seen_at_ms: i64,
        expires_at_ms: i64,
    ) -> BoxFuture<'_, DomainResult<()>> {
        let token = token.to_string();
        let records = self.records.clone();
        Box::pin(async move {
            let mut records = records.write().await;
            let record = records.get_mut(&token).ok_or(DomainError::NotFound)?;
            record.last_seen_at_ms = seen_at_ms;
            record.expires_at_ms = expires_at_ms;
            Ok(())
        })
    }
}
