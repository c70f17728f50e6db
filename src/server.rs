//! Reusable parking service runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: metrics recorder, engine
//! construction, seed data, the default admin, the HTTP/WebSocket listener
//! and graceful shutdown. The CLI binary is a thin wrapper around it.

use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{error, info, warn};

use crate::application::{ensure_admin, EngineSettings, ParkingEngine, SeedData};
use crate::config::AppConfig;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::modules::metrics::MetricsState;
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::{ShutdownCoordinator, ShutdownSignal, SystemClock};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the parking service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Create the configured admin account if none exists (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            create_default_admin: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running parking service.
///
/// # Examples
///
/// ```rust,no_run
/// use parking_engine::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Engine shared with every handler.
    pub engine: ParkingEngine,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Port actually bound (differs from the config when it asked for 0).
    pub port: u16,

    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the service:
    ///
    /// 1. Install (or reuse) the Prometheus recorder
    /// 2. Build the engine and load seed data
    /// 3. Create the default admin (if enabled)
    /// 4. Serve REST, WebSocket, Swagger UI and `/metrics`
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting parking service...");

        let prometheus = prometheus_handle();

        // ── Engine ─────────────────────────────────────────────
        let settings = EngineSettings {
            utc_offset: app_cfg.utc_offset()?,
            channel_capacity: app_cfg.events.channel_capacity,
            audit_history: app_cfg.events.audit_history,
        };
        info!(utc_offset = %settings.utc_offset, "Rate calendar offset configured");
        let engine = ParkingEngine::new(settings, Arc::new(SystemClock));

        // ── Seed data ──────────────────────────────────────────
        let seed = match &app_cfg.seed.path {
            Some(path) => {
                info!(path = %path.display(), "Loading seed data");
                SeedData::from_file(path)?
            }
            None => {
                info!("No seed file configured, loading demo data");
                SeedData::demo()?
            }
        };
        let summary = seed.apply(&engine, app_cfg.security.bcrypt_cost).await?;
        info!(
            categories = summary.categories,
            gates = summary.gates,
            zones = summary.zones,
            subscriptions = summary.subscriptions,
            users = summary.users,
            rush_hours = summary.rush_hours,
            vacations = summary.vacations,
            "Seed data loaded"
        );

        if opts.create_default_admin {
            let created = ensure_admin(
                &engine,
                &app_cfg.admin.username,
                &app_cfg.admin.password,
                app_cfg.security.bcrypt_cost,
            )
            .await?;
            if created && app_cfg.admin.password == crate::config::AdminConfig::default().password {
                warn!("Default admin password in use; change [admin].password");
            }
        }

        // ── HTTP + WebSocket ───────────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let jwt_config = JwtConfig::new(
            app_cfg.security.jwt_secret.clone(),
            app_cfg.security.jwt_expiration_hours,
        );
        let state = AppState::new(
            engine.clone(),
            jwt_config,
            app_cfg.security.bcrypt_cost,
            shutdown_signal.clone(),
        );
        let router = create_api_router(state, prometheus.map(|handle| MetricsState { handle }));

        let listener = tokio::net::TcpListener::bind(app_cfg.address()).await?;
        let addr = listener.local_addr()?;
        info!("REST API listening on http://{}", addr);
        info!("WebSocket endpoint at ws://{}/api/v1/ws", addr);
        info!("Swagger UI available at http://{}/docs/", addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("HTTP server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("HTTP server error: {}", e);
            }
        });

        Ok(Self {
            engine,
            config: app_cfg,
            port: addr.port(),
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install SIGTERM / SIGINT listeners that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown without waiting.
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered.
    pub async fn wait(self) {
        let Self {
            shutdown, api_task, ..
        } = self;
        let abort = api_task.abort_handle();
        let finished = shutdown
            .drain(async move {
                if let Err(e) = api_task.await {
                    error!("HTTP server task panicked: {}", e);
                }
            })
            .await;
        if !finished {
            abort.abort();
        }
        info!("Parking service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down parking service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global recorder can only be installed once per process; restarts
/// within one process reuse it. Metrics are skipped when another recorder
/// already owns the slot.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Some(handle.clone());
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder installed");
            Some(PROM_HANDLE.get_or_init(|| handle).clone())
        }
        Err(e) => {
            warn!("Prometheus recorder unavailable, /metrics disabled: {}", e);
            None
        }
    }
}

/// Initialize tracing from the logging config; `RUST_LOG` overrides the level.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
