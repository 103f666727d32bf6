use super::BoxFuture;
use crate::DomainResult;
use crate::issues::Issue;

pub trait IssueRepository: Send + Sync {
    fn create(&self, issue: &Issue) -> BoxFuture<'_, DomainResult<Issue>>;

    fn get(&self, issue_id: &str) -> BoxFuture<'_, DomainResult<Option<Issue>>>;

    fn update(&self, issue: &Issue) -> BoxFuture<'_, DomainResult<Issue>>;

    fn delete(&self, issue_id: &str) -> BoxFuture<'_, DomainResult<()>>;

    fn list_all(&self) -> BoxFuture<'_, DomainResult<Vec<Issue>>>;

    fn list_by_zone(&self, zone_id: &str) -> BoxFuture<'_, DomainResult<Vec<Issue>>>;

    fn list_by_reporter(&self, profile_id: &str) -> BoxFuture<'_, DomainResult<Vec<Issue>>>;

    fn list_by_assignee(&self, staff_id: &str) -> BoxFuture<'_, DomainResult<Vec<Issue>>>;
}
