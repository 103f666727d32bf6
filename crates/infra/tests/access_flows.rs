use std::sync::Arc;

use khidmat_domain::aid::{AidsProgram, AssignmentType, DistributionService, ProgramAssignment};
use khidmat_domain::capabilities::classify_session;
use khidmat_domain::error::DomainError;
use khidmat_domain::identity::{
    CommunityIdentity, StaffIdentity, StaffRole, StaffStatus, VerificationStatus,
};
use khidmat_domain::issues::{IssueCreate, IssueService, IssueStatus};
use khidmat_domain::ports::sessions::{PrincipalRef, SessionRecord};
use khidmat_domain::registry::{Household, Village, Zone};
use khidmat_domain::session::{Session, SessionConfig, SessionService};
use khidmat_domain::util::now_ms;
use khidmat_domain::workspace::{
    COMMUNITY_DASHBOARD_PATH, GateDecision, STAFF_DASHBOARD_PATH, STAFF_LOGIN_PATH, Workspace,
    gate,
};
use khidmat_infra::repositories::{
    InMemoryAidDistributionRepository, InMemoryDirectoryRepository, InMemoryIssueRepository,
    InMemoryRegistryRepository, InMemorySessionStore,
};

struct Fixture {
    sessions: SessionService,
    issues: IssueService,
    distribution: DistributionService,
}

fn staff(staff_id: &str, role: StaffRole, zone_id: Option<&str>) -> StaffIdentity {
    StaffIdentity {
        staff_id: staff_id.to_string(),
        name: staff_id.to_string(),
        role,
        zone_id: zone_id.map(str::to_string),
        status: StaffStatus::Active,
    }
}

fn session(token: &str, principal: PrincipalRef, expires_at_ms: i64) -> SessionRecord {
    SessionRecord {
        token: token.to_string(),
        principal,
        issued_at_ms: 0,
        expires_at_ms,
        last_seen_at_ms: 0,
    }
}

async fn fixture() -> Fixture {
    let session_store = Arc::new(InMemorySessionStore::new());
    let directory = Arc::new(InMemoryDirectoryRepository::new());
    let issue_repo = Arc::new(InMemoryIssueRepository::new());
    let aid_repo = Arc::new(InMemoryAidDistributionRepository::new());
    let registry = Arc::new(InMemoryRegistryRepository::new());

    directory
        .upsert_staff(staff("adm", StaffRole::SuperAdmin, None))
        .await;
    directory
        .upsert_staff(staff("zl", StaffRole::ZoneLeader, Some("z3")))
        .await;
    directory
        .upsert_staff(staff("kc", StaffRole::KetuaCawangan, None))
        .await;
    directory
        .upsert_profile(CommunityIdentity {
            profile_id: "c1".to_string(),
            full_name: "Devi".to_string(),
            verification_status: VerificationStatus::Verified,
            household_member_id: None,
        })
        .await;

    let far_future = now_ms() + 3_600_000;
    session_store
        .insert(session(
            "tok-adm",
            PrincipalRef::Staff {
                staff_id: "adm".to_string(),
            },
            far_future,
        ))
        .await;
    session_store
        .insert(session(
            "tok-zl",
            PrincipalRef::Staff {
                staff_id: "zl".to_string(),
            },
            far_future,
        ))
        .await;
    session_store
        .insert(session(
            "tok-kc",
            PrincipalRef::Staff {
                staff_id: "kc".to_string(),
            },
            far_future,
        ))
        .await;
    session_store
        .insert(session(
            "tok-c1",
            PrincipalRef::Community {
                profile_id: "c1".to_string(),
            },
            far_future,
        ))
        .await;
    session_store
        .insert(session(
            "tok-stale",
            PrincipalRef::Staff {
                staff_id: "adm".to_string(),
            },
            now_ms() - 1,
        ))
        .await;

    aid_repo
        .upsert_program(AidsProgram {
            program_id: "p1".to_string(),
            name: "Bantuan Asas".to_string(),
            aid_type: "groceries".to_string(),
            total_households: 3,
            distributed_households: 0,
        })
        .await;
    aid_repo
        .add_assignment(ProgramAssignment {
            program_id: "p1".to_string(),
            assigned_to: "kc".to_string(),
            assignment_type: AssignmentType::KetuaCawangan,
            zone_id: "z1".to_string(),
        })
        .await;

    registry
        .upsert_zone(Zone {
            zone_id: "z1".to_string(),
            name: "Zon Satu".to_string(),
        })
        .await;
    registry
        .upsert_village(Village {
            village_id: "v1".to_string(),
            zone_id: "z1".to_string(),
            name: "Kampung Baru".to_string(),
        })
        .await;
    registry
        .upsert_village(Village {
            village_id: "v2".to_string(),
            zone_id: "z2".to_string(),
            name: "Kampung Hilir".to_string(),
        })
        .await;
    for (household_id, village_id) in [("h1", "v1"), ("h2", "v1"), ("h9", "v2")] {
        registry
            .upsert_household(Household {
                household_id: household_id.to_string(),
                village_id: village_id.to_string(),
            })
            .await;
    }

    Fixture {
        sessions: SessionService::new(session_store, directory, SessionConfig::default()),
        issues: IssueService::new(issue_repo),
        distribution: DistributionService::new(aid_repo, registry),
    }
}

#[tokio::test]
async fn zone_leader_token_is_routed_to_staff_dashboard() {
    let fx = fixture().await;
    let session = fx.sessions.resolve_read_only("tok-zl").await.unwrap();
    let caps = classify_session(&session);
    assert_eq!(
        gate(&caps, Workspace::Admin),
        GateDecision::Redirect(STAFF_DASHBOARD_PATH)
    );
    assert_eq!(gate(&caps, Workspace::Staff), GateDecision::Allow);
}

#[tokio::test]
async fn community_token_is_routed_to_community_dashboard() {
    let fx = fixture().await;
    let session = fx.sessions.resolve_read_only("tok-c1").await.unwrap();
    let caps = classify_session(&session);
    assert_eq!(
        gate(&caps, Workspace::Staff),
        GateDecision::Redirect(COMMUNITY_DASHBOARD_PATH)
    );
    assert_eq!(gate(&caps, Workspace::Community), GateDecision::Allow);
}

#[tokio::test]
async fn expired_token_is_routed_to_login() {
    let fx = fixture().await;
    let session = fx.sessions.resolve_read_only("tok-stale").await.unwrap();
    assert_eq!(session, Session::Unauthenticated);
    let caps = classify_session(&session);
    assert_eq!(
        gate(&caps, Workspace::Staff),
        GateDecision::Redirect(STAFF_LOGIN_PATH)
    );
}

#[tokio::test]
async fn distribution_flow_marks_within_scope_only() {
    let fx = fixture().await;
    let ketua = fx
        .sessions
        .resolve("tok-kc")
        .await
        .unwrap()
        .identity()
        .cloned()
        .unwrap();

    let applied = fx
        .distribution
        .mark_received(&ketua, "p1", "h1")
        .await
        .unwrap();
    assert_eq!(applied.distributed_households, 1);

    let err = fx
        .distribution
        .mark_received(&ketua, "p1", "h9")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let admin = fx
        .sessions
        .resolve("tok-adm")
        .await
        .unwrap()
        .identity()
        .cloned()
        .unwrap();
    let summary = fx.distribution.program_summary(&admin, "p1").await.unwrap();
    assert_eq!(summary.distributed_households, 1);

    // Admin override reaches the household the ketua could not.
    let applied = fx
        .distribution
        .mark_received(&admin, "p1", "h9")
        .await
        .unwrap();
    assert_eq!(applied.distributed_households, 2);
}

#[tokio::test]
async fn issue_flow_preserves_community_reports() {
    let fx = fixture().await;
    let admin = fx
        .sessions
        .resolve("tok-adm")
        .await
        .unwrap()
        .identity()
        .cloned()
        .unwrap();
    let resident = fx
        .sessions
        .resolve("tok-c1")
        .await
        .unwrap()
        .identity()
        .cloned()
        .unwrap();

    let reported = fx
        .issues
        .report(
            &resident,
            IssueCreate {
                issue_type_id: "road".to_string(),
                category: "infrastructure".to_string(),
                zone_id: Some("z1".to_string()),
                created_at_ms: None,
            },
        )
        .await
        .unwrap();

    let err = fx
        .issues
        .delete(&admin, &reported.issue_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Authorization(_)));

    let issue = fx
        .issues
        .set_status(&admin, &reported.issue_id, IssueStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(issue.status, IssueStatus::InProgress);

    let visible = fx.issues.list_visible(&resident).await.unwrap();
    assert_eq!(visible.len(), 1);
}
