use axum::extract::{Extension, Path, State};
use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use khidmat_domain::aid::AppliedMark;
use khidmat_domain::capabilities::Capabilities;
use khidmat_domain::identity::Identity;
use khidmat_domain::issues::{Issue, IssueCreate, IssueStatus};
use khidmat_domain::scope::ZoneScope;
use khidmat_domain::workspace::{GateDecision, Workspace, gate};

use crate::error::{ApiError, map_domain_error};
use crate::middleware::SessionContext;
use crate::{middleware as app_middleware, observability, state::AppState, validation};

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/v1/issues", post(report_issue).get(list_issues))
        .route("/v1/issues/:issue_id", get(get_issue).delete(delete_issue))
        .route("/v1/issues/:issue_id/status", post(set_issue_status))
        .route("/v1/programs/:program_id", get(program_summary))
        .route("/v1/programs/:program_id/zones", get(program_zones))
        .route(
            "/v1/programs/:program_id/households/:household_id/mark",
            post(mark_received),
        )
        .route(
            "/v1/programs/:program_id/households/:household_id/unmark",
            post(unmark_received),
        )
        .route_layer(middleware::from_fn(
            app_middleware::require_session_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/v1/session", get(get_session))
        .route("/v1/workspaces/:workspace/gate", get(gate_workspace))
        .merge(protected)
        .layer(middleware::from_fn(app_middleware::metrics_layer))
        .layer(app_middleware::timeout_layer())
        .layer(app_middleware::trace_layer())
        .layer(app_middleware::set_request_id_layer())
        .layer(app_middleware::propagate_request_id_layer())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::session_middleware,
        ))
        .layer(middleware::from_fn(
            app_middleware::correlation_id_middleware,
        ));

    if !state.config.app_env.eq_ignore_ascii_case("test") {
        app = app.layer(app_middleware::rate_limit_layer());
    }

    app.with_state(state)
}

#[derive(Serialize)]
struct StoreHealthBody {
    backend: &'static str,
    reachable: bool,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    store: StoreHealthBody,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let reachable = state.store_health.check().await.is_ok();
    Json(HealthResponse {
        status: if reachable { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.app_env.clone(),
        store: StoreHealthBody {
            backend: state.store_health.backend(),
            reachable,
        },
    })
}

async fn metrics() -> Response {
    match observability::render_metrics() {
        Some(body) => (StatusCode::OK, body).into_response(),
        None => ApiError::Unavailable.into_response(),
    }
}

#[derive(Serialize)]
struct SessionResponse {
    authenticated: bool,
    kind: Option<&'static str>,
    capabilities: Capabilities,
}

async fn get_session(Extension(ctx): Extension<SessionContext>) -> Json<SessionResponse> {
    let kind = ctx.identity().map(|identity| match identity {
        Identity::Staff(_) => "staff",
        Identity::Community(_) => "community",
    });
    Json(SessionResponse {
        authenticated: ctx.session.is_authenticated(),
        kind,
        capabilities: ctx.capabilities.clone(),
    })
}

#[derive(Serialize)]
struct GateResponse {
    workspace: &'static str,
    decision: &'static str,
    location: Option<&'static str>,
}

async fn gate_workspace(
    Path(workspace): Path<String>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<GateResponse>, ApiError> {
    let workspace = Workspace::parse(&workspace)
        .ok_or_else(|| ApiError::Validation("unknown workspace".into()))?;
    let decision = gate(&ctx.capabilities, workspace.clone());
    let (decision_label, location) = match decision {
        GateDecision::Allow => ("allow", None),
        GateDecision::Redirect(path) => ("redirect", Some(path)),
    };
    observability::register_gate_decision(workspace.as_str(), decision_label);
    Ok(Json(GateResponse {
        workspace: workspace.as_str(),
        decision: decision_label,
        location,
    }))
}

#[derive(Debug, Deserialize, Validate)]
struct ReportIssueRequest {
    #[validate(length(min = 1, max = 64))]
    issue_type_id: String,
    #[validate(length(min = 1, max = 64))]
    category: String,
    zone_id: Option<String>,
}

async fn report_issue(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(payload): Json<ReportIssueRequest>,
) -> Result<Response, ApiError> {
    validation::validate(&payload)?;
    let identity = mutating_identity(&state, &ctx).await?;
    let issue = state
        .issues
        .report(
            &identity,
            IssueCreate {
                issue_type_id: payload.issue_type_id,
                category: payload.category,
                zone_id: payload.zone_id,
                created_at_ms: None,
            },
        )
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(issue)).into_response())
}

async fn list_issues(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let identity = context_identity(&ctx)?;
    let issues = state
        .issues
        .list_visible(identity)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(issues))
}

async fn get_issue(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(issue_id): Path<String>,
) -> Result<Json<Issue>, ApiError> {
    let identity = context_identity(&ctx)?;
    let issue = state
        .issues
        .get_visible(identity, &issue_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(issue))
}

#[derive(Debug, Deserialize, Validate)]
struct SetIssueStatusRequest {
    #[validate(length(min = 1, max = 32))]
    status: String,
}

async fn set_issue_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(issue_id): Path<String>,
    Json(payload): Json<SetIssueStatusRequest>,
) -> Result<Json<Issue>, ApiError> {
    validation::validate(&payload)?;
    let status = IssueStatus::parse(&payload.status)
        .ok_or_else(|| ApiError::Validation("unknown issue status".into()))?;
    let identity = mutating_identity(&state, &ctx).await?;
    let issue = state
        .issues
        .set_status(&identity, &issue_id, status)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(issue))
}

async fn delete_issue(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(issue_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let identity = mutating_identity(&state, &ctx).await?;
    state
        .issues
        .delete(&identity, &issue_id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
struct ProgramZonesResponse {
    program_id: String,
    scope: &'static str,
    zone_ids: Option<Vec<String>>,
}

async fn program_zones(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(program_id): Path<String>,
) -> Result<Json<ProgramZonesResponse>, ApiError> {
    let identity = context_identity(&ctx)?;
    let scope = state
        .scope
        .scoped_zone_ids(identity, &program_id)
        .await
        .map_err(map_domain_error)?;
    let (scope_label, zone_ids) = match scope {
        ZoneScope::Unrestricted => ("unrestricted", None),
        ZoneScope::Zones(zones) => ("zones", Some(zones.into_iter().collect())),
    };
    Ok(Json(ProgramZonesResponse {
        program_id,
        scope: scope_label,
        zone_ids,
    }))
}

async fn program_summary(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(program_id): Path<String>,
) -> Result<Json<khidmat_domain::aid::AidsProgram>, ApiError> {
    let identity = context_identity(&ctx)?;
    let program = state
        .distribution
        .program_summary(identity, &program_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(program))
}

#[derive(Serialize)]
struct MarkResponse {
    program_id: String,
    household_id: String,
    received: bool,
    marked_at_ms: Option<i64>,
    marked_by: Option<String>,
    distributed_households: u64,
}

impl From<AppliedMark> for MarkResponse {
    fn from(applied: AppliedMark) -> Self {
        Self {
            program_id: applied.mark.program_id,
            household_id: applied.mark.household_id,
            received: applied.mark.received,
            marked_at_ms: applied.mark.marked_at_ms,
            marked_by: applied.mark.marked_by,
            distributed_households: applied.distributed_households,
        }
    }
}

async fn mark_received(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path((program_id, household_id)): Path<(String, String)>,
) -> Result<Json<MarkResponse>, ApiError> {
    let identity = mutating_identity(&state, &ctx).await?;
    let applied = state
        .distribution
        .mark_received(&identity, &program_id, &household_id)
        .await
        .map_err(|err| {
            observability::register_distribution_mark("mark", "rejected");
            map_domain_error(err)
        })?;
    observability::register_distribution_mark("mark", "applied");
    Ok(Json(applied.into()))
}

async fn unmark_received(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path((program_id, household_id)): Path<(String, String)>,
) -> Result<Json<MarkResponse>, ApiError> {
    let identity = mutating_identity(&state, &ctx).await?;
    let applied = state
        .distribution
        .unmark_received(&identity, &program_id, &household_id)
        .await
        .map_err(|err| {
            observability::register_distribution_mark("unmark", "rejected");
            map_domain_error(err)
        })?;
    observability::register_distribution_mark("unmark", "applied");
    Ok(Json(applied.into()))
}

fn context_identity(ctx: &SessionContext) -> Result<&Identity, ApiError> {
    ctx.identity().ok_or(ApiError::Unauthorized)
}

/// Mutation handlers re-resolve through the mutating session variant so the
/// sliding expiry refresh lands; the dev-bypass context carries no token and
/// keeps its synthetic identity.
async fn mutating_identity(state: &AppState, ctx: &SessionContext) -> Result<Identity, ApiError> {
    let Some(token) = ctx.token.as_deref() else {
        return context_identity(ctx).cloned();
    };
    let session = state
        .sessions
        .resolve(token)
        .await
        .map_err(map_domain_error)?;
    session
        .identity()
        .cloned()
        .ok_or(ApiError::Unauthorized)
}
