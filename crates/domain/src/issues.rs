use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::DomainResult;
use crate::error::DomainError;
use crate::identity::{Identity, StaffIdentity};
use crate::ports::issues::IssueRepository;
use crate::util::{now_ms, uuid_v7_without_dashes};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
}

impl IssueStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(IssueStatus::Pending),
            "in_progress" => Some(IssueStatus::InProgress),
            "resolved" => Some(IssueStatus::Resolved),
            "closed" => Some(IssueStatus::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Resolved => "resolved",
            IssueStatus::Closed => "closed",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            IssueStatus::Pending => 0,
            IssueStatus::InProgress => 1,
            IssueStatus::Resolved => 2,
            IssueStatus::Closed => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub issue_id: String,
    /// Community profile that reported the issue. `None` for issues logged
    /// internally by staff or admins.
    pub reporter_id: Option<String>,
    pub assigned_staff_id: Option<String>,
    pub zone_id: Option<String>,
    pub status: IssueStatus,
    pub issue_type_id: String,
    pub category: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Community-authored issues stay in the permanent record; only issues
/// entered by staff or admins themselves may be deleted.
pub fn can_delete(issue: &Issue) -> bool {
    issue.reporter_id.is_none()
}

/// Row-level read check. Mirrors `list_visible`, with assigned issues also
/// visible to the assignee regardless of zone.
pub fn is_visible_to(issue: &Issue, identity: &Identity) -> bool {
    match identity {
        Identity::Community(profile) => {
            issue.reporter_id.as_deref() == Some(profile.profile_id.as_str())
        }
        Identity::Staff(staff) => {
            if !staff.is_active() {
                return false;
            }
            if staff.role.is_admin_capable() {
                return true;
            }
            let assigned = issue.assigned_staff_id.as_deref() == Some(staff.staff_id.as_str());
            match &staff.zone_id {
                Some(zone_id) => issue.zone_id.as_deref() == Some(zone_id.as_str()) || assigned,
                None => assigned,
            }
        }
    }
}

#[derive(Clone)]
pub struct IssueCreate {
    pub issue_type_id: String,
    pub category: String,
    pub zone_id: Option<String>,
    pub created_at_ms: Option<i64>,
}

pub struct IssueService {
    repository: Arc<dyn IssueRepository>,
}

impl IssueService {
    pub fn new(repository: Arc<dyn IssueRepository>) -> Self {
        Self { repository }
    }

    /// Files a new issue. A community reporter is recorded on the issue;
    /// staff walk-in entries carry no reporter and remain deletable.
    pub async fn report(&self, identity: &Identity, input: IssueCreate) -> DomainResult<Issue> {
        let input = validate_issue_create(input)?;
        let reporter_id = match identity {
            Identity::Community(profile) => Some(profile.profile_id.clone()),
            Identity::Staff(staff) => {
                ensure_active_staff(staff)?;
                None
            }
        };

        let now = input.created_at_ms.unwrap_or_else(now_ms);
        let issue = Issue {
            issue_id: uuid_v7_without_dashes(),
            reporter_id,
            assigned_staff_id: None,
            zone_id: input.zone_id,
            status: IssueStatus::Pending,
            issue_type_id: input.issue_type_id,
            category: input.category,
            created_at_ms: now,
            updated_at_ms: now,
        };
        self.repository.create(&issue).await
    }

    pub async fn get(&self, issue_id: &str) -> DomainResult<Issue> {
        self.repository
            .get(issue_id)
            .await?
            .ok_or(DomainError::NotFound)
    }

    /// Fetch with the row-level visibility check applied. Issues outside the
    /// caller's scope read as not-found rather than forbidden, so their
    /// existence is not leaked.
    pub async fn get_visible(&self, identity: &Identity, issue_id: &str) -> DomainResult<Issue> {
        let issue = self.get(issue_id).await?;
        if !is_visible_to(&issue, identity) {
            return Err(DomainError::NotFound);
        }
        Ok(issue)
    }

    /// Moves an issue forward through pending → in_progress → resolved →
    /// closed. Same-state updates are idempotent; backward moves are
    /// rejected.
    pub async fn set_status(
        &self,
        identity: &Identity,
        issue_id: &str,
        status: IssueStatus,
    ) -> DomainResult<Issue> {
        require_active_staff(identity)?;
        let issue = self.get(issue_id).await?;

        if issue.status == status {
            return Ok(issue);
        }
        if status.rank() < issue.status.rank() {
            return Err(DomainError::Validation(format!(
                "cannot move issue from {} back to {}",
                issue.status.as_str(),
                status.as_str()
            )));
        }

        let mut updated = issue;
        updated.status = status;
        updated.updated_at_ms = now_ms();
        self.repository.update(&updated).await
    }

    pub async fn assign(
        &self,
        identity: &Identity,
        issue_id: &str,
        staff_id: &str,
    ) -> DomainResult<Issue> {
        require_admin(identity)?;
        let issue = self.get(issue_id).await?;
        if issue.assigned_staff_id.as_deref() == Some(staff_id) {
            return Ok(issue);
        }

        let mut updated = issue;
        updated.assigned_staff_id = Some(staff_id.to_string());
        updated.updated_at_ms = now_ms();
        self.repository.update(&updated).await
    }

    pub async fn delete(&self, identity: &Identity, issue_id: &str) -> DomainResult<()> {
        require_admin(identity)?;
        let issue = self.get(issue_id).await?;
        if !can_delete(&issue) {
            return Err(DomainError::Authorization(
                "cannot delete community-submitted issues".into(),
            ));
        }
        self.repository.delete(&issue.issue_id).await
    }

    /// Row-level visibility: admins see everything, zone-bound staff see
    /// their zone, other staff see issues assigned to them, community
    /// profiles see their own reports.
    pub async fn list_visible(&self, identity: &Identity) -> DomainResult<Vec<Issue>> {
        match identity {
            Identity::Community(profile) => {
                self.repository.list_by_reporter(&profile.profile_id).await
            }
            Identity::Staff(staff) => {
                ensure_active_staff(staff)?;
                if staff.role.is_admin_capable() {
                    return self.repository.list_all().await;
                }
                match &staff.zone_id {
                    Some(zone_id) => self.repository.list_by_zone(zone_id).await,
                    None => self.repository.list_by_assignee(&staff.staff_id).await,
                }
            }
        }
    }
}

fn validate_issue_create(mut input: IssueCreate) -> DomainResult<IssueCreate> {
    input.issue_type_id = input.issue_type_id.trim().to_string();
    input.category = input.category.trim().to_string();
    if input.issue_type_id.is_empty() || input.category.is_empty() {
        return Err(DomainError::Validation(
            "issue_type_id and category are required".into(),
        ));
    }
    Ok(input)
}

fn ensure_active_staff(staff: &StaffIdentity) -> DomainResult<()> {
    if !staff.is_active() {
        return Err(DomainError::Forbidden("staff record is not active".into()));
    }
    Ok(())
}

fn require_active_staff(identity: &Identity) -> DomainResult<&StaffIdentity> {
    let staff = identity
        .staff()
        .ok_or_else(|| DomainError::Forbidden("staff access required".into()))?;
    ensure_active_staff(staff)?;
    Ok(staff)
}

fn require_admin(identity: &Identity) -> DomainResult<&StaffIdentity> {
    let staff = require_active_staff(identity)?;
    if !staff.role.is_admin_capable() {
        return Err(DomainError::Forbidden("admin access required".into()));
    }
    Ok(staff)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tokio::sync::RwLock;

    use super::*;
    use crate::identity::{CommunityIdentity, StaffRole, StaffStatus, VerificationStatus};
    use crate::ports::BoxFuture;

    #[derive(Default)]
    struct MockIssueRepository {
        items: RwLock<HashMap<String, Issue>>,
    }

    impl IssueRepository for MockIssueRepository {
        fn create(&self, issue: &Issue) -> BoxFuture<'_, DomainResult<Issue>> {
            let issue = issue.clone();
            Box::pin(async move {
                let mut items = self.items.write().await;
                if items.contains_key(&issue.issue_id) {
                    return Err(DomainError::Conflict);
                }
                items.insert(issue.issue_id.clone(), issue.clone());
                Ok(issue)
            })
        }

        fn get(&self, issue_id: &str) -> BoxFuture<'_, DomainResult<Option<Issue>>> {
            let issue_id = issue_id.to_string();
            Box::pin(async move { Ok(self.items.read().await.get(&issue_id).cloned()) })
        }

        fn update(&self, issue: &Issue) -> BoxFuture<'_, DomainResult<Issue>> {
            let issue = issue.clone();
            Box::pin(async move {
                let mut items = self.items.write().await;
                if !items.contains_key(&issue.issue_id) {
                    return Err(DomainError::NotFound);
                }
                items.insert(issue.issue_id.clone(), issue.clone());
                Ok(issue)
            })
        }

        fn delete(&self, issue_id: &str) -> BoxFuture<'_, DomainResult<()>> {
            let issue_id = issue_id.to_string();
            Box::pin(async move {
                self.items
                    .write()
                    .await
                    .remove(&issue_id)
                    .map(|_| ())
                    .ok_or(DomainError::NotFound)
            })
        }

        fn list_all(&self) -> BoxFuture<'_, DomainResult<Vec<Issue>>> {
            Box::pin(async move { Ok(sorted(self.items.read().await.values().cloned().collect())) })
        }

        fn list_by_zone(&self, zone_id: &str) -> BoxFuture<'_, DomainResult<Vec<Issue>>> {
            let zone_id = zone_id.to_string();
            Box::pin(async move {
                let items = self.items.read().await;
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
            Box::pin(async move {
                let items = self.items.read().await;
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
            Box::pin(async move {
                let items = self.items.read().await;
                Ok(sorted(
                    items
                        .values()
                        .filter(|issue| {
                            issue.assigned_staff_id.as_deref() == Some(staff_id.as_str())
                        })
                        .cloned()
                        .collect(),
                ))
            })
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

    fn admin() -> Identity {
        Identity::Staff(StaffIdentity {
            staff_id: "admin-1".to_string(),
            name: "Noor".to_string(),
            role: StaffRole::SuperAdmin,
            zone_id: None,
            status: StaffStatus::Active,
        })
    }

    fn zone_staff(zone_id: &str) -> Identity {
        Identity::Staff(StaffIdentity {
            staff_id: "staff-z".to_string(),
            name: "Lim".to_string(),
            role: StaffRole::Staff,
            zone_id: Some(zone_id.to_string()),
            status: StaffStatus::Active,
        })
    }

    fn community(profile_id: &str) -> Identity {
        Identity::Community(CommunityIdentity {
            profile_id: profile_id.to_string(),
            full_name: "Devi".to_string(),
            verification_status: VerificationStatus::Verified,
            household_member_id: None,
        })
    }

    fn create_input(zone_id: Option<&str>) -> IssueCreate {
        IssueCreate {
            issue_type_id: "drainage".to_string(),
            category: "infrastructure".to_string(),
            zone_id: zone_id.map(str::to_string),
            created_at_ms: None,
        }
    }

    fn service() -> (Arc<MockIssueRepository>, IssueService) {
        let repo = Arc::new(MockIssueRepository::default());
        (repo.clone(), IssueService::new(repo))
    }

    #[tokio::test]
    async fn community_report_records_the_reporter() {
        let (_, service) = service();
        let issue = service
            .report(&community("c1"), create_input(Some("z1")))
            .await
            .unwrap();
        assert_eq!(issue.reporter_id.as_deref(), Some("c1"));
        assert_eq!(issue.status, IssueStatus::Pending);
        assert!(!can_delete(&issue));
    }

    #[tokio::test]
    async fn staff_entry_has_no_reporter_and_is_deletable() {
        let (_, service) = service();
        let issue = service.report(&admin(), create_input(None)).await.unwrap();
        assert_eq!(issue.reporter_id, None);
        assert!(can_delete(&issue));
    }

    #[tokio::test]
    async fn status_moves_forward_and_same_state_is_idempotent() {
        let (_, service) = service();
        let issue = service.report(&admin(), create_input(None)).await.unwrap();

        let issue = service
            .set_status(&admin(), &issue.issue_id, IssueStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(issue.status, IssueStatus::InProgress);

        let again = service
            .set_status(&admin(), &issue.issue_id, IssueStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(again.status, IssueStatus::InProgress);

        let issue = service
            .set_status(&admin(), &issue.issue_id, IssueStatus::Resolved)
            .await
            .unwrap();
        assert_eq!(issue.status, IssueStatus::Resolved);
    }

    #[tokio::test]
    async fn backward_status_moves_are_rejected() {
        let (_, service) = service();
        let issue = service.report(&admin(), create_input(None)).await.unwrap();
        service
            .set_status(&admin(), &issue.issue_id, IssueStatus::Resolved)
            .await
            .unwrap();

        let err = service
            .set_status(&admin(), &issue.issue_id, IssueStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn community_cannot_change_status() {
        let (_, service) = service();
        let issue = service.report(&admin(), create_input(None)).await.unwrap();
        let err = service
            .set_status(&community("c1"), &issue.issue_id, IssueStatus::Closed)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn community_authored_issue_survives_admin_delete() {
        let (repo, service) = service();
        let issue = service
            .report(&community("c1"), create_input(None))
            .await
            .unwrap();

        let err = service.delete(&admin(), &issue.issue_id).await.unwrap_err();
        assert!(matches!(err, DomainError::Authorization(_)));
        assert!(repo.items.read().await.contains_key(&issue.issue_id));
    }

    #[tokio::test]
    async fn staff_entered_issue_can_be_deleted() {
        let (repo, service) = service();
        let issue = service.report(&admin(), create_input(None)).await.unwrap();
        service.delete(&admin(), &issue.issue_id).await.unwrap();
        assert!(repo.items.read().await.is_empty());
    }

    #[tokio::test]
    async fn non_admin_staff_cannot_delete() {
        let (_, service) = service();
        let issue = service.report(&admin(), create_input(None)).await.unwrap();
        let err = service
            .delete(&zone_staff("z1"), &issue.issue_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn visibility_is_scoped_per_identity() {
        let (_, service) = service();
        service
            .report(&community("c1"), create_input(Some("z1")))
            .await
            .unwrap();
        service
            .report(&community("c2"), create_input(Some("z2")))
            .await
            .unwrap();
        service.report(&admin(), create_input(None)).await.unwrap();

        assert_eq!(service.list_visible(&admin()).await.unwrap().len(), 3);
        assert_eq!(
            service.list_visible(&zone_staff("z1")).await.unwrap().len(),
            1
        );
        let own = service.list_visible(&community("c2")).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].reporter_id.as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn out_of_scope_issue_reads_as_not_found() {
        let (_, service) = service();
        let issue = service
            .report(&community("c1"), create_input(Some("z1")))
            .await
            .unwrap();

        let err = service
            .get_visible(&community("c2"), &issue.issue_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));

        let seen = service
            .get_visible(&zone_staff("z1"), &issue.issue_id)
            .await
            .unwrap();
        assert_eq!(seen.issue_id, issue.issue_id);
    }

    #[tokio::test]
    async fn assignment_requires_admin_and_is_idempotent() {
        let (_, service) = service();
        let issue = service.report(&admin(), create_input(None)).await.unwrap();

        let err = service
            .assign(&zone_staff("z1"), &issue.issue_id, "staff-z")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let assigned = service
            .assign(&admin(), &issue.issue_id, "staff-z")
            .await
            .unwrap();
        assert_eq!(assigned.assigned_staff_id.as_deref(), Some("staff-z"));

        let again = service
            .assign(&admin(), &issue.issue_id, "staff-z")
            .await
            .unwrap();
        assert_eq!(again.updated_at_ms, assigned.updated_at_ms);
    }
}
