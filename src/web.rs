//! HTTP API router and handlers.
//!
//! Exposes role/department sync and the permission view to the forum
//! frontend. Callers are identified by the `fcrp_session` cookie.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::{Layer, Service};

use crate::database::{AuditEntry, Database, Session, UserRecord};
use crate::error::{ErrorContext, RoleSyncError};
use crate::permissions::{has_admin_permission, has_staff_permission, PermissionSummary};
use crate::resolver::{ResolvedProfile, RoleResolver};
use crate::roles::{Department, Role};
use crate::session::SessionManager;
use crate::sync::{SyncOrchestrator, SyncResult};

const SESSION_COOKIE: &str = "fcrp_session";
const DEFAULT_AUDIT_LIMIT: u32 = 50;
const MAX_AUDIT_LIMIT: u32 = 500;

type ApiError = (StatusCode, Json<ErrorResponse>);
type SyncReply = (StatusCode, Json<SyncResult>);

/// Request logging middleware layer
#[derive(Clone)]
pub struct RequestLoggingLayer;

impl<S> Layer<S> for RequestLoggingLayer {
    type Service = RequestLoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLoggingService { inner }
    }
}

/// Service that logs all requests with method, path, status, and response time
#[derive(Clone)]
pub struct RequestLoggingService<S> {
    inner: S,
}

impl<S> Service<Request> for RequestLoggingService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let start = std::time::Instant::now();

        // Drive the clone that was polled ready.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let response = inner.call(req).await?;

            tracing::info!(
                method = %method,
                path = %path,
                status = response.status().as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                "HTTP request"
            );

            Ok(response)
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub sessions: Arc<SessionManager>,
    pub resolver: Arc<RoleResolver>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(error: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            request_id: Some(request_id.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MePermissions {
    pub user_id: i64,
    pub username: String,
    #[serde(flatten)]
    pub summary: PermissionSummary,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncDepartmentRequest {
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: &'static str,
    pub build_timestamp: &'static str,
    pub git_commit: &'static str,
}

fn error_response(status: StatusCode, msg: &str) -> ApiError {
    (status, Json(ErrorResponse::new(msg)))
}

fn status_for(error: &RoleSyncError) -> StatusCode {
    match error {
        RoleSyncError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        RoleSyncError::Forbidden(_) | RoleSyncError::NotWhitelisted => StatusCode::FORBIDDEN,
        RoleSyncError::UserNotFound(_) | RoleSyncError::NoRolesFound => StatusCode::NOT_FOUND,
        RoleSyncError::NoExternalIdentity
        | RoleSyncError::AmbiguousDepartment(_)
        | RoleSyncError::InvalidSelection(_)
        | RoleSyncError::UnknownRole(_)
        | RoleSyncError::UnknownDepartment(_) => StatusCode::BAD_REQUEST,
        RoleSyncError::ExternalServiceRateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        RoleSyncError::ExternalServiceUnavailable(_) => StatusCode::BAD_GATEWAY,
        RoleSyncError::Database(_) | RoleSyncError::PersistFailed(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        RoleSyncError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert a RoleSyncError to a user-friendly API error, logging it with context.
fn handle_error(error: RoleSyncError, context: ErrorContext) -> ApiError {
    error.log_with_context(&context);
    (
        status_for(&error),
        Json(ErrorResponse::with_request_id(
            error.user_message(),
            context.request_id,
        )),
    )
}

fn get_session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            cookie
                .trim()
                .strip_prefix(SESSION_COOKIE)?
                .strip_prefix('=')
                .map(|s| s.to_string())
        })
}

pub fn build_router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/api/version", get(get_version))
        .route("/api/me/permissions", get(get_my_permissions))
        .route("/api/users/{id}/discord-roles", get(get_discord_roles))
        .route("/api/users/{id}/sync-role", post(sync_role))
        .route("/api/users/{id}/sync-department", post(sync_department))
        .route("/api/users/{id}/role", put(set_role))
        .route("/api/users/{id}/audit", get(get_audit_log))
        .with_state(state.clone());

    api_router
        .merge(crate::health::router(state.db))
        .layer(RequestLoggingLayer)
}

async fn get_version() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        git_commit: env!("GIT_COMMIT"),
    })
}

async fn get_my_permissions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MePermissions>, ApiError> {
    let user = current_user(&state, &headers).await?;

    Ok(Json(MePermissions {
        user_id: user.id,
        username: user.username,
        summary: PermissionSummary::for_user(user.role, user.department),
    }))
}

async fn get_discord_roles(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
) -> Result<Json<ResolvedProfile>, ApiError> {
    let actor = current_user(&state, &headers).await?;
    if actor.id != user_id && !has_staff_permission(actor.role) {
        return Err(error_response(StatusCode::FORBIDDEN, "Staff only"));
    }

    let context = ErrorContext::new("get_discord_roles").with_user_id(user_id);
    let target = load_user(&state, user_id, &context).await?;
    let discord_id = target
        .discord_id
        .ok_or_else(|| handle_error(RoleSyncError::NoExternalIdentity, context))?;

    Ok(Json(state.resolver.resolve_profile(&discord_id).await))
}

async fn sync_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
) -> SyncReply {
    let session = match session_for_sync(&state, &headers).await {
        Ok(session) => session,
        Err(reply) => return reply,
    };

    let result = state.orchestrator.sync_role(session.as_ref(), user_id).await;
    (StatusCode::OK, Json(result))
}

async fn sync_department(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
    body: Option<Json<SyncDepartmentRequest>>,
) -> SyncReply {
    let session = match session_for_sync(&state, &headers).await {
        Ok(session) => session,
        Err(reply) => return reply,
    };

    let request = body.map(|Json(b)| b).unwrap_or_default();
    let selection = match request.department.as_deref().map(str::parse::<Department>) {
        None => None,
        Some(Ok(department)) => Some(department),
        Some(Err(e)) => return sync_refusal(StatusCode::BAD_REQUEST, &e),
    };

    let result = state
        .orchestrator
        .sync_department(session.as_ref(), user_id, selection)
        .await;
    (StatusCode::OK, Json(result))
}

async fn set_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
    Json(request): Json<SetRoleRequest>,
) -> SyncReply {
    let session = match session_for_sync(&state, &headers).await {
        Ok(session) => session,
        Err(reply) => return reply,
    };

    let role = match request.role.parse::<Role>() {
        Ok(role) => role,
        Err(e) => return sync_refusal(StatusCode::BAD_REQUEST, &e),
    };

    let result = state
        .orchestrator
        .set_role(session.as_ref(), user_id, role)
        .await;
    (StatusCode::OK, Json(result))
}

async fn get_audit_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
    let actor = current_user(&state, &headers).await?;
    if !has_admin_permission(actor.role) {
        return Err(error_response(StatusCode::FORBIDDEN, "Admins only"));
    }

    let context = ErrorContext::new("get_audit_log").with_user_id(user_id);
    load_user(&state, user_id, &context).await?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_AUDIT_LIMIT)
        .clamp(1, MAX_AUDIT_LIMIT);
    state
        .db
        .get_audit_log(user_id, limit)
        .await
        .map(Json)
        .map_err(|e| handle_error(e, context))
}

fn sync_refusal(status: StatusCode, error: &RoleSyncError) -> SyncReply {
    (status, Json(SyncResult::failure(error.user_message())))
}

/// Session for a sync endpoint.
///
/// Only a missing cookie short-circuits with 401; an unknown or expired
/// session is passed on as `None` and reported in the `SyncResult`.
async fn session_for_sync(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Session>, SyncReply> {
    let session_id = get_session_id(headers).ok_or_else(|| {
        sync_refusal(StatusCode::UNAUTHORIZED, &RoleSyncError::NotAuthenticated)
    })?;

    state
        .sessions
        .get_session(&session_id)
        .await
        .map_err(|e| {
            e.log_with_context(&ErrorContext::new("session_lookup"));
            sync_refusal(StatusCode::SERVICE_UNAVAILABLE, &e)
        })
}

async fn get_session(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    let session_id = get_session_id(headers)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

    state
        .sessions
        .get_session(&session_id)
        .await
        .map_err(|e| handle_error(e, ErrorContext::new("session_lookup")))?
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Session expired"))
}

async fn current_user(state: &AppState, headers: &HeaderMap) -> Result<UserRecord, ApiError> {
    let session = get_session(state, headers).await?;
    let context = ErrorContext::new("current_user").with_user_id(session.user_id);
    let user = state
        .db
        .get_user(session.user_id)
        .await
        .map_err(|e| handle_error(e, context.clone()))?
        .ok_or_else(|| handle_error(RoleSyncError::NotAuthenticated, context))?;
    Ok(user)
}

async fn load_user(
    state: &AppState,
    user_id: i64,
    context: &ErrorContext,
) -> Result<UserRecord, ApiError> {
    state
        .db
        .get_user(user_id)
        .await
        .map_err(|e| handle_error(e, context.clone()))?
        .ok_or_else(|| handle_error(RoleSyncError::UserNotFound(user_id), context.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ChangeSource;
    use crate::fetcher::testing::ScriptedDirectory;
    use crate::resolver::testing::*;
    use axum::body::Body;
    use axum::http::{HeaderValue, Method};
    use tower::ServiceExt;

    struct TestApp {
        db: Arc<Database>,
        sessions: Arc<SessionManager>,
        dir: Arc<ScriptedDirectory>,
        router: Router,
    }

    impl TestApp {
        async fn new() -> Self {
            let db = Arc::new(Database::in_memory().await.unwrap());
            let dir = Arc::new(ScriptedDirectory::new());
            let resolver = Arc::new(resolver(dir.clone()));
            let sessions = Arc::new(SessionManager::new(db.clone()));
            let orchestrator = Arc::new(SyncOrchestrator::new(db.clone(), resolver.clone()));
            let router = build_router(AppState {
                db: db.clone(),
                sessions: sessions.clone(),
                resolver,
                orchestrator,
            });
            Self {
                db,
                sessions,
                dir,
                router,
            }
        }

        /// Create a user holding `role` and return (user id, cookie).
        async fn login(&self, discord_id: &str, role: Role) -> (i64, String) {
            let user = self.db.create_user(discord_id, Some(discord_id)).await.unwrap();
            if role != user.role {
                self.db
                    .update_role(user.id, user.role, role, None, ChangeSource::Admin)
                    .await
                    .unwrap();
            }
            let session = self.sessions.create_session(user.id).await.unwrap();
            (user.id, format!("{}={}", SESSION_COOKIE, session.id))
        }

        async fn call(
            &self,
            method: Method,
            path: &str,
            cookie: Option<&str>,
            body: Option<serde_json::Value>,
        ) -> (StatusCode, serde_json::Value) {
            let mut builder = axum::http::Request::builder().method(method).uri(path);
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            let body = match body {
                Some(json) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Body::from(json.to_string())
                }
                None => Body::empty(),
            };

            let response = self
                .router
                .clone()
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
            (status, json)
        }
    }

    #[test]
    fn error_response_serializes() {
        let json = serde_json::to_string(&ErrorResponse::new("test error")).unwrap();
        assert!(json.contains("test error"));
        assert!(!json.contains("requestId"));
    }

    #[test]
    fn error_response_with_request_id() {
        let err = ErrorResponse::with_request_id("test error", "req-123");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("req-123"));
    }

    #[test]
    fn get_session_id_parses_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other=value; fcrp_session=abc123"),
        );
        assert_eq!(get_session_id(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn get_session_id_ignores_similar_names() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("fcrp_session_old=zzz"),
        );
        assert!(get_session_id(&headers).is_none());
        assert!(get_session_id(&HeaderMap::new()).is_none());
    }

    #[test]
    fn error_status_mapping() {
        assert_eq!(
            status_for(&RoleSyncError::NotAuthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&RoleSyncError::NotWhitelisted),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&RoleSyncError::UserNotFound(1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&RoleSyncError::ExternalServiceUnavailable("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&RoleSyncError::PersistFailed("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn sync_role_without_cookie_is_401() {
        let app = TestApp::new().await;
        let (status, body) = app
            .call(Method::POST, "/api/users/1/sync-role", None, None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not authenticated");
    }

    #[tokio::test]
    async fn sync_role_with_stale_cookie_is_failure_result() {
        let app = TestApp::new().await;
        let (status, body) = app
            .call(
                Method::POST,
                "/api/users/1/sync-role",
                Some("fcrp_session=missing"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not authenticated");
    }

    #[tokio::test]
    async fn sync_role_endpoint_updates_role() {
        let app = TestApp::new().await;
        let (id, cookie) = app.login("d1", Role::Applicant).await;
        app.dir.set_roles(MAIN, "d1", &[STAFF_ID]);

        let path = format!("/api/users/{}/sync-role", id);
        let (status, body) = app.call(Method::POST, &path, Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["changed"], true);
        assert_eq!(body["previousValue"], "APPLICANT");
        assert_eq!(body["newValue"], "STAFF");

        let (_, body) = app.call(Method::POST, &path, Some(&cookie), None).await;
        assert_eq!(body["changed"], false);
        assert_eq!(body["message"], "Role is already up to date");
    }

    #[tokio::test]
    async fn sync_department_prompts_then_accepts_selection() {
        let app = TestApp::new().await;
        let (id, cookie) = app.login("d1", Role::Member).await;
        app.dir.set_roles(COMMUNITY, "d1", &[WHITELISTED]);
        app.dir.set_roles(DEPT, "d1", &[BSO_ID, FHP_ID]);

        let path = format!("/api/users/{}/sync-department", id);
        let (status, body) = app.call(Method::POST, &path, Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["candidates"], serde_json::json!(["BSO", "FHP"]));

        let (_, body) = app
            .call(
                Method::POST,
                &path,
                Some(&cookie),
                Some(serde_json::json!({ "department": "bso" })),
            )
            .await;
        assert_eq!(body["success"], true);
        assert_eq!(body["newValue"], "BSO");
    }

    #[tokio::test]
    async fn sync_department_rejects_unknown_name() {
        let app = TestApp::new().await;
        let (id, cookie) = app.login("d1", Role::Member).await;

        let path = format!("/api/users/{}/sync-department", id);
        let (status, body) = app
            .call(
                Method::POST,
                &path,
                Some(&cookie),
                Some(serde_json::json!({ "department": "NAVY" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn set_role_endpoint_checks_rank() {
        let app = TestApp::new().await;
        let (_, admin_cookie) = app.login("a", Role::Admin).await;
        let (target, _) = app.login("t", Role::Member).await;

        let path = format!("/api/users/{}/role", target);
        let (status, body) = app
            .call(
                Method::PUT,
                &path,
                Some(&admin_cookie),
                Some(serde_json::json!({ "role": "STAFF" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["newValue"], "STAFF");

        let (_, body) = app
            .call(
                Method::PUT,
                &path,
                Some(&admin_cookie),
                Some(serde_json::json!({ "role": "HEAD_ADMIN" })),
            )
            .await;
        assert_eq!(body["success"], false);

        let (status, _) = app
            .call(
                Method::PUT,
                &path,
                Some(&admin_cookie),
                Some(serde_json::json!({ "role": "OWNER" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn my_permissions_reflect_stored_role() {
        let app = TestApp::new().await;
        let (id, cookie) = app.login("d1", Role::SeniorAdmin).await;

        let (status, body) = app
            .call(Method::GET, "/api/me/permissions", Some(&cookie), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], id);
        assert_eq!(body["role"], "SENIOR_ADMIN");
        assert_eq!(body["staffPanel"], true);
        assert_eq!(body["adminPanel"], true);
        assert_eq!(body["canOverride"], true);

        let (status, _) = app
            .call(Method::GET, "/api/me/permissions", None, None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn discord_roles_is_staff_only() {
        let app = TestApp::new().await;
        let (_, member_cookie) = app.login("m", Role::Member).await;
        let (_, staff_cookie) = app.login("s", Role::Staff).await;
        let (target, _) = app.login("t", Role::Applicant).await;
        app.dir.set_roles(MAIN, "t", &[ADMIN_ID]);
        app.dir.set_roles(DEPT, "t", &[DEV_ID]);

        let path = format!("/api/users/{}/discord-roles", target);
        let (status, _) = app
            .call(Method::GET, &path, Some(&member_cookie), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .call(Method::GET, &path, Some(&staff_cookie), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "ADMIN");
        assert_eq!(body["departments"], serde_json::json!(["DEV"]));
    }

    #[tokio::test]
    async fn audit_log_is_admin_only() {
        let app = TestApp::new().await;
        let (user, user_cookie) = app.login("u", Role::Member).await;
        let (_, admin_cookie) = app.login("a", Role::HeadAdmin).await;

        let path = format!("/api/users/{}/audit", user);
        let (status, _) = app.call(Method::GET, &path, Some(&user_cookie), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .call(Method::GET, &path, Some(&admin_cookie), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        // The role change made by `login`.
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let (status, body) = app
            .call(Method::GET, "/api/users/999/audit", Some(&admin_cookie), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn health_is_served() {
        let app = TestApp::new().await;
        let response = app
            .router
            .clone()
            .oneshot(
                axum::http::Request::get("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn version_reports_build_info() {
        let app = TestApp::new().await;
        let (status, body) = app.call(Method::GET, "/api/version", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["gitCommit"].is_string());
    }
}
