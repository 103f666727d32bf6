use std::collections::HashMap;
use std::sync::Arc;

use khidmat_domain::DomainResult;
use khidmat_domain::error::DomainError;
use khidmat_domain::issues::Issue;
use khidmat_domain::ports::BoxFuture;
use khidmat_domain::ports::issues::IssueRepository;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryIssueRepository {
    items: Arc<RwLock<HashMap<String, Issue>>>,
}

impl InMemoryIssueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted(mut issues: Vec<Issue>) -> Vec<Issue> {
    issues.sort_by(|left, right| {
        left.created_at_ms
            .cmp(&right.created_at_ms)
            .then_with(|| left.issue_id.cmp(&right.issue_id))
    });
    issues
}

impl IssueRepository for InMemoryIssueRepository {
    fn create(&self, issue: &Issue) -> BoxFuture<'_, DomainResult<Issue>> {
        let issue = issue.clone();
        let items = self.items.clone();
        Box::pin(async move {
            let mut items = items.write().await;
            if items.contains_key(&issue.issue_id) {
                return Err(DomainError::Conflict);
            }
            items.insert(issue.issue_id.clone(), issue.clone());
            Ok(issue)
        })
    }

    fn get(&self, issue_id: &str) -> BoxFuture<'_, DomainResult<Option<Issue>>> {
        let issue_id = issue_id.to_string();
        let items = self.items.clone();
        Box::pin(async move { Ok(items.read().await.get(&issue_id).cloned()) })
    }

    fn update(&self, issue: &Issue) -> BoxFuture<'_, DomainResult<Issue>> {
        let issue = issue.clone();
        let items = self.items.clone();
        Box::pin(async move {
            let mut items = items.write().await;
            if !items.contains_key(&issue.issue_id) {
                return Err(DomainError::NotFound);
            }
            items.insert(issue.issue_id.clone(), issue.clone());
            Ok(issue)
        })
    }

    fn delete(&self, issue_id: &str) -> BoxFuture<'_, DomainResult<()>> {
        let issue_id = issue_id.to_string();
        let items = self.items.clone();
        Box::pin(async move {
            items
                .write()
                .await
                .remove(&issue_id)
                .map(|_| ())
                .ok_or(DomainError::NotFound)
        })
    }

    fn list_all(&self) -> BoxFuture<'_, DomainResult<Vec<Issue>>> {
        let items = self.items.clone();
        Box::pin(async move { Ok(sorted(items.read().await.values().cloned().collect())) })
    }

    fn list_by_zone(&self, zone_id: &str) -> BoxFuture<'_, DomainResult<Vec<Issue>>> {
        let zone_id = zone_id.to_string();
        let items = self.items.clone();
        Box::pin(async move {
            let items = items.read().await;
            Ok(sorted(
                items
                    .values()
                    .filter(|issue| issue.zone_id.as_deref() == Some(zone_id.as_str()))
                    .cloned()
                    .collect(),
            ))
        })
    }

    fn list_by_reporter(&self, profile_id: &str) -> BoxFuture<'_, DomainResult<Vec<Issue>>> {
        let profile_id = profile_id.to_string();
        let items = self.items.clone();
        Box::pin(async move {
            let items = items.read().await;
            Ok(sorted(
                items
                    .values()
                    .filter(|issue| issue.reporter_id.as_deref() == Some(profile_id.as_str()))
                    .cloned()
                    .collect(),
            ))
        })
    }

    fn list_by_assignee(&self, staff_id: &str) -> BoxFuture<'_, DomainResult<Vec<Issue>>> {
        let staff_id = staff_id.to_string();
        let items = self.items.clone();
        Box::pin(async move {
            let items = items.read().await;
            Ok(sorted(
                items
                    .values()
                    .filter(|issue| issue.assigned_staff_id.as_deref() == Some(staff_id.as_str()))
                    .cloned()
                    .collect(),
            ))
        })
    }
}
