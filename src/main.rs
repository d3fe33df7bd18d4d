//! Postboard - accounts, tokens and owner-gated posts over HTTP

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use postboard_backend::{build_router, cors_layer, AppState, Config, Database};
use std::path::Path;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment first so clap's env fallbacks can see .env values
    load_env();
    init_tracing();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;

    info!("🚀 Postboard backend starting");

    if config.uses_dev_secret() {
        warn!("⚠️  JWT_SECRET not set, using the development secret. CHANGE IT IN PRODUCTION!");
    }

    let db = Database::open(&config.database_path)?;
    let state = AppState::new(db, config.jwt_handler()?, config.bcrypt_cost);

    info!(
        "🔐 Authentication initialized (access {}m, refresh {}d)",
        config.access_ttl_minutes, config.refresh_ttl_days
    );

    let app = build_router(state, cors_layer(&config.cors_origin));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postboard_backend=debug,postboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate directory, for runs started from elsewhere
    let candidate = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if candidate.exists() {
        let _ = dotenv::from_path(&candidate);
    }
}
