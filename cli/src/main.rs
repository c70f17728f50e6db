//! Parking Service CLI
//!
//! Headless zone occupancy and billing server suitable for deployment
//! as a systemd service, Docker container, or standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/parking-service/config.toml)
//! parking-service
//!
//! # Custom config path
//! parking-service --config /etc/parking-service/config.toml
//!
//! # Override the port and seed file
//! parking-service --port 8080 --seed ./seed/site.json
//!
//! # Validate config without starting
//! parking-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use parking_engine::config::{AppConfig, CONFIG_ENV};
use parking_engine::server::{init_tracing, ServerHandle, ServerOptions};

/// Parking Service: zone occupancy, admission and billing.
#[derive(Parser, Debug)]
#[command(
    name = "parking-service",
    version,
    about = "Zone occupancy, admission and billing server for parking lots",
    long_about = "Parking Service: REST API + WebSocket server for gate check-in, \
                  checkpoint checkout with rush-hour billing, and admin configuration.\n\n\
                  Default config: ~/.config/parking-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Load startup data from this JSON seed file.
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(parking_engine::default_config_path);

    let loaded = AppConfig::load(&config_path);
    if cli.check {
        if let Err(e) = &loaded {
            eprintln!("Configuration is invalid: {}", e);
            std::process::exit(1);
        }
    }
    let (mut config, load_error) = match loaded {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(seed) = cli.seed {
        config.seed.path = Some(seed);
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        if let Err(e) = config.validate() {
            eprintln!("Configuration is invalid: {}", e);
            std::process::exit(1);
        }
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.address());
        println!("   Log level   : {} ({})", config.logging.level, config.logging.format);
        println!("   UTC offset  : {} min", config.calendar.utc_offset_minutes);
        match &config.seed.path {
            Some(path) => println!("   Seed file   : {}", path.display()),
            None => println!("   Seed file   : built-in demo data"),
        }
        println!(
            "   Events      : queue {} / audit history {}",
            config.events.channel_capacity, config.events.audit_history
        );
        return Ok(());
    }

    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Start server ───────────────────────────────────────────
    let handle = match ServerHandle::start(ServerOptions {
        config,
        create_default_admin: !cli.no_admin,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Startup failed: {}", e);
            return Err(e);
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
