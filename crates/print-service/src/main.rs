//! Print Service
//!
//! REST API for starting badge print jobs + background pipeline for processing them

use anyhow::{Context, Result};
use badge_composer::Composer;
use print_service::{create_router, AppState, Config, JobRegistry, NoopPrinter, PrintPipeline};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "print_service=debug,badge_composer=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Starting Print Service");
    info!("Badge output directory: {}", config.output_dir.display());
    info!("Photo directory: {}", config.photo_dir.display());
    match &config.template_path {
        Some(template) => info!("Badge template: {}", template.display()),
        None => info!("Badge template disabled"),
    }

    config.ensure_directories()?;

    let composer = Composer::new(config.composer_config());
    let registry = Arc::new(JobRegistry::new());
    let pipeline = PrintPipeline::new(registry, Arc::new(composer), Arc::new(NoopPrinter))
        .with_delays(config.stage_delays);

    let state = AppState::new(pipeline, config.photo_dir.clone());
    let app = create_router(state);

    // Start API server
    let addr = config.api_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("Print Service API running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
