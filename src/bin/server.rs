use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;

use rusty_tasks::config::ServerConfig;
use rusty_tasks::handlers::admin::ensure_configured_admin;
use rusty_tasks::routes::routes;
use rusty_tasks::security_logger::get_security_logger;
use rusty_tasks::state::AppState;
use rusty_tasks::storage::{MemoryStorageProvider, StorageProvider};

#[tokio::main]
async fn main() {
    // Initialize env
    if let Err(e) = dotenvy::dotenv() {
        // Missing .env is normal in production; variables come from the environment
        eprintln!("No .env file loaded: {}", e);
    }

    // Initialize logging
    env_logger::init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration: host={}, port={}", config.host, config.port);
    if config.development_mode {
        warn!("Development mode enabled: {:?}", config);
    }
    if !config.require_verified_login {
        warn!("Unverified accounts are allowed to log in");
    }

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    let storage = Arc::new(MemoryStorageProvider::new());
    if let Err(e) = storage.initialize().await {
        error!("Failed to initialize storage: {}", e);
        std::process::exit(1);
    }

    let state = AppState::new(config, storage);

    match ensure_configured_admin(&state).await {
        Ok(Some(seeded)) => info!("{}: user {} <{}>", seeded.message, seeded.id, seeded.email),
        Ok(None) => info!("No admin credentials configured; use POST /api/admin/seed"),
        Err(e) => {
            error!("Failed to seed configured admin: {}", e);
            std::process::exit(1);
        }
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
    };

    let (bound, server) =
        match warp::serve(routes(state)).try_bind_with_graceful_shutdown(addr, shutdown) {
            Ok(bound) => bound,
            Err(e) => {
                error!("Failed to bind {}: {}", addr, e);
                std::process::exit(1);
            }
        };

    info!("Starting Rusty Tasks server on {}", bound);
    server.await;

    let security_events = get_security_logger().get_event_stats().await;
    info!("Server stopped; security events this run: {:?}", security_events);
}
