//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::ErrorBody;
use super::middleware::{auth_middleware, require_admin, AuthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::{admin, auth, health, master, subscriptions, tickets};
use crate::application::{BillingSegment, CheckoutResult, ParkingEngine, ZoneReport};
use crate::domain::{
    AuditLogEntry, Car, Category, CurrentCheckin, Gate, RateMode, RushHour, Subscription, Ticket,
    TicketType, UserRole, Vacation, ZoneState,
};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::ws::{ws_handler, RealtimeState};
use crate::shared::ShutdownSignal;

/// Everything the HTTP layer needs; handlers extract their own slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub engine: ParkingEngine,
    pub auth: AuthState,
    pub bcrypt_cost: u32,
    pub started_at: Arc<Instant>,
    pub shutdown: ShutdownSignal,
}

impl AppState {
    pub fn new(
        engine: ParkingEngine,
        jwt_config: JwtConfig,
        bcrypt_cost: u32,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            engine,
            auth: AuthState { jwt_config },
            bcrypt_cost,
            started_at: Arc::new(Instant::now()),
            shutdown,
        }
    }
}

impl FromRef<AppState> for ParkingEngine {
    fn from_ref(s: &AppState) -> Self {
        s.engine.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        s.auth.clone()
    }
}

impl FromRef<AppState> for auth::AuthHandlerState {
    fn from_ref(s: &AppState) -> Self {
        auth::AuthHandlerState {
            engine: s.engine.clone(),
            jwt_config: s.auth.jwt_config.clone(),
        }
    }
}

impl FromRef<AppState> for admin::AdminState {
    fn from_ref(s: &AppState) -> Self {
        admin::AdminState {
            engine: s.engine.clone(),
            bcrypt_cost: s.bcrypt_cost,
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState {
            events: s.engine.events.clone(),
            started_at: s.started_at.clone(),
        }
    }
}

impl FromRef<AppState> for RealtimeState {
    fn from_ref(s: &AppState) -> Self {
        RealtimeState {
            events: s.engine.events.clone(),
            shutdown: s.shutdown.clone(),
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        master::list_gates,
        master::list_zones,
        master::list_categories,
        subscriptions::get_subscription,
        tickets::check_in,
        tickets::get_ticket,
        tickets::check_out,
        admin::update_category_rates,
        admin::set_zone_open,
        admin::add_rush_hour,
        admin::add_vacation,
        admin::list_zones,
        admin::list_rush_hours,
        admin::list_vacations,
        admin::list_subscriptions,
        admin::audit_log,
        admin::parking_state,
        admin::list_users,
        admin::create_user,
    ),
    components(
        schemas(
            ErrorBody,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            UserRole,
            // Master data
            Gate,
            Category,
            ZoneState,
            Subscription,
            Car,
            CurrentCheckin,
            // Tickets
            Ticket,
            TicketType,
            tickets::CheckInBody,
            tickets::CheckInResponse,
            tickets::CheckOutBody,
            CheckoutResult,
            BillingSegment,
            RateMode,
            // Admin
            admin::UpdateRatesRequest,
            admin::ZoneOpenRequest,
            admin::CreateRushHourRequest,
            admin::CreateVacationRequest,
            admin::CreateUserRequest,
            RushHour,
            Vacation,
            AuditLogEntry,
            ZoneReport,
            health::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Staff login (JWT)"),
        (name = "Master Data", description = "Gates, zones with live occupancy, pricing categories"),
        (name = "Subscriptions", description = "Subscription lookup at the gate"),
        (name = "Tickets", description = "Check-in and checkout with segment billing"),
        (name = "Admin", description = "Rates, zone availability, rush hours, vacations, reports and staff"),
    ),
    info(
        title = "Parking Service API",
        version = "1.0.0",
        description = "Zone occupancy, admission and billing for parking operations. \
            Realtime updates are pushed over the WebSocket at /api/v1/ws.",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Routes under `/api/v1`
fn api_routes(auth_state: AuthState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/master/gates", get(master::list_gates))
        .route("/master/zones", get(master::list_zones))
        .route("/master/categories", get(master::list_categories))
        .route("/subscriptions/{id}", get(subscriptions::get_subscription))
        .route("/tickets/checkin", post(tickets::check_in))
        .route("/tickets/{id}", get(tickets::get_ticket))
        .route("/ws", get(ws_handler));

    // Employees and admins
    let staff = Router::new()
        .route("/tickets/checkout", post(tickets::check_out))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ));

    let admin = Router::new()
        .route("/categories/{id}", put(admin::update_category_rates))
        .route("/zones", get(admin::list_zones))
        .route("/zones/{id}/open", put(admin::set_zone_open))
        .route(
            "/rush-hours",
            get(admin::list_rush_hours).post(admin::add_rush_hour),
        )
        .route(
            "/vacations",
            get(admin::list_vacations).post(admin::add_vacation),
        )
        .route("/subscriptions", get(admin::list_subscriptions))
        .route("/audit-log", get(admin::audit_log))
        .route("/reports/parking-state", get(admin::parking_state))
        .route("/users", get(admin::list_users).post(admin::create_user))
        // auth runs first, then the role check
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    public.merge(staff).nest("/admin", admin)
}

/// Create the application router.
///
/// `/metrics` is only mounted when a Prometheus recorder is installed.
pub fn create_api_router(state: AppState, metrics: Option<MetricsState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ws", get(ws_handler))
        .nest("/api/v1", api_routes(state.auth.clone()))
        .with_state(state)
        .merge(swagger_routes);

    if let Some(metrics_state) = metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(metrics_state),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────
