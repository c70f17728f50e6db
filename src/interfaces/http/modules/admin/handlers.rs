//! Admin API handlers
//!
//! Every mutation goes through the configuration store, which records an
//! audit entry and broadcasts the change. The acting admin is taken from
//! the verified token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use super::dto::{
    CreateRushHourRequest, CreateUserRequest, CreateVacationRequest, UpdateRatesRequest,
    ZoneOpenRequest,
};
use crate::application::{ParkingEngine, ZoneReport};
use crate::domain::{
    AuditLogEntry, Category, DomainError, RushHour, Subscription, User, Vacation, ZoneState,
};
use crate::infrastructure::crypto::password::hash_password;
use crate::interfaces::http::common::{ApiError, ApiResult, ErrorBody, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::auth::UserInfo;

#[derive(Clone)]
pub struct AdminState {
    pub engine: ParkingEngine,
    pub bcrypt_cost: u32,
}

// ── Configuration ───────────────────────────────────────────────

#[utoipa::path(
    put,
    path = "/api/v1/admin/categories/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Category ID")),
    request_body = UpdateRatesRequest,
    responses(
        (status = 200, description = "Category re-priced", body = Category),
        (status = 400, description = "Negative rate", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody),
        (status = 404, description = "Unknown category", body = ErrorBody)
    )
)]
pub async fn update_category_rates(
    State(state): State<AdminState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateRatesRequest>,
) -> ApiResult<Json<Category>> {
    let category = state
        .engine
        .config
        .update_rates(&id, body.rates(), Some(&admin.username))?;
    Ok(Json(category))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/zones/{id}/open",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Zone ID")),
    request_body = ZoneOpenRequest,
    responses(
        (status = 200, description = "Zone opened or closed", body = ZoneState),
        (status = 404, description = "Unknown zone", body = ErrorBody)
    )
)]
pub async fn set_zone_open(
    State(state): State<AdminState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<ZoneOpenRequest>,
) -> ApiResult<Json<ZoneState>> {
    let zone = state
        .engine
        .config
        .set_zone_open(&id, body.open, Some(&admin.username))?;
    Ok(Json(zone))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/rush-hours",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreateRushHourRequest,
    responses(
        (status = 201, description = "Rush hour added", body = RushHour),
        (status = 400, description = "Invalid window", body = ErrorBody)
    )
)]
pub async fn add_rush_hour(
    State(state): State<AdminState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Json(body): Json<CreateRushHourRequest>,
) -> ApiResult<(StatusCode, Json<RushHour>)> {
    let rush_hour = RushHour::parse(body.week_day, &body.from, &body.to)?;
    let rush_hour = state
        .engine
        .config
        .add_rush_hour(rush_hour, Some(&admin.username));
    Ok((StatusCode::CREATED, Json(rush_hour)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/vacations",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreateVacationRequest,
    responses(
        (status = 201, description = "Vacation added", body = Vacation),
        (status = 400, description = "Invalid dates", body = ErrorBody)
    )
)]
pub async fn add_vacation(
    State(state): State<AdminState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Json(body): Json<CreateVacationRequest>,
) -> ApiResult<(StatusCode, Json<Vacation>)> {
    let vacation = Vacation::parse(&body.name, &body.from, &body.to)?;
    let vacation = state
        .engine
        .config
        .add_vacation(vacation, Some(&admin.username));
    Ok((StatusCode::CREATED, Json(vacation)))
}

// ── Read models ─────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/admin/zones",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All zones", body = Vec<ZoneState>))
)]
pub async fn list_zones(State(state): State<AdminState>) -> ApiResult<Json<Vec<ZoneState>>> {
    Ok(Json(state.engine.config.zone_states()?))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/rush-hours",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Configured rush hours", body = Vec<RushHour>))
)]
pub async fn list_rush_hours(State(state): State<AdminState>) -> Json<Vec<RushHour>> {
    Json(state.engine.config.calendar().rush_hours().to_vec())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/vacations",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Configured vacations", body = Vec<Vacation>))
)]
pub async fn list_vacations(State(state): State<AdminState>) -> Json<Vec<Vacation>> {
    Json(state.engine.config.calendar().vacations().to_vec())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/subscriptions",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All subscriptions", body = Vec<Subscription>))
)]
pub async fn list_subscriptions(
    State(state): State<AdminState>,
) -> ApiResult<Json<Vec<Subscription>>> {
    let mut subscriptions = state.engine.repos.subscriptions().find_all().await?;
    subscriptions.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(subscriptions))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/audit-log",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Recent changes, newest first", body = Vec<AuditLogEntry>))
)]
pub async fn audit_log(State(state): State<AdminState>) -> Json<Vec<AuditLogEntry>> {
    Json(state.engine.config.audit_log())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/reports/parking-state",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Occupancy per zone", body = Vec<ZoneReport>))
)]
pub async fn parking_state(State(state): State<AdminState>) -> ApiResult<Json<Vec<ZoneReport>>> {
    Ok(Json(state.engine.parking_state().await?))
}

// ── Users ───────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Staff accounts", body = Vec<UserInfo>))
)]
pub async fn list_users(State(state): State<AdminState>) -> ApiResult<Json<Vec<UserInfo>>> {
    let mut users = state.engine.repos.users().find_all().await?;
    users.sort_by(|a, b| a.username.cmp(&b.username));
    Ok(Json(users.into_iter().map(UserInfo::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserInfo),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 409, description = "Username taken", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<AdminState>,
    Extension(admin): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let password_hash = hash_password(&body.password, state.bcrypt_cost)
        .map_err(|e| ApiError(DomainError::Internal(format!("password hashing failed: {}", e))))?;

    let user = User {
        id: format!("u_{}", Uuid::new_v4().simple()),
        username: body.username,
        name: body.name,
        password_hash,
        role: body.role,
        active: true,
    };
    state.engine.repos.users().create(user.clone()).await?;
    state
        .engine
        .config
        .record("user-created", "user", &user.id, Some(&admin.username));

    Ok((StatusCode::CREATED, Json(UserInfo::from(user))))
}
