//! Gumroad dashboard server
//!
//! Serves the admin pages and proxies the upstream API

use anyhow::{Context, Result};
use gumdash::config::{Settings, TokenConfig, TokenStore};
use gumdash::create_router;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load settings from environment (.env honoured)
    let settings = Settings::new().context("Failed to load server settings")?;

    init_logging(&settings);
    info!("{}", gumdash::version_info());

    let token_path = TokenConfig::resolve_path(settings.storage.token_file.as_deref());
    let tokens = TokenStore::open(token_path).context("Failed to load token configuration")?;
    info!("📁 Token file: {:?}", tokens.path());

    let configured = tokens.is_configured();
    let addr = settings.addr();
    let app = create_router(settings, tokens).await?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 Dashboard server started on {}", addr);
    if configured {
        info!("Visit http://{} to access the application", addr);
    } else {
        info!("Visit http://{}/setup to configure your Gumroad token", addr);
    }

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    Ok(())
}

/// Initialize logging system
fn init_logging(settings: &Settings) {
    let log_level = settings.logging.level.clone();

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if settings.logging.format == "json" {
        // JSON format logs (production environment)
        Box::new(tracing_subscriber::fmt()
            .with_env_filter(log_level)
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .finish())
    } else {
        // Human readable format (development environment)
        Box::new(tracing_subscriber::fmt()
            .with_env_filter(log_level)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish())
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Tracing subscriber already set");
    }

    info!("Logging system initialized");
}
