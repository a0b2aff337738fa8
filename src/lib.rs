use anyhow::Result;

pub mod ai;
pub mod api;
pub mod config;
pub mod error;
pub mod grocery;
pub mod normalize;
mod system_info;

pub use api::{router, AppState};
pub use config::Config;
pub use error::ApiError;
pub use grocery::{Category, FreshnessStatus, GroceryItem, GroceryRecord, GroceryStats};
pub use system_info::BuildInfo;

// ──────────────────────────────────────────────────────────────
// Logging
// ──────────────────────────────────────────────────────────────

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "expiry_tracker=debug,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

// ──────────────────────────────────────────────────────────────
// Main application setup
// ──────────────────────────────────────────────────────────────

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing();

    tracing::info!(build = %BuildInfo::current(), "Starting expiry tracker...");

    match &config.ai {
        Some(ai) => tracing::info!(model = %ai.gpt_model, "AI shelf-life lookups enabled"),
        None => tracing::warn!("OPENAI_API_KEY is not set; AI routes will answer with errors"),
    }

    let app = router(AppState::new(config.ai.as_ref()));

    let addr = config.addr()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
