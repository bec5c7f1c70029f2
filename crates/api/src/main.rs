use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use family_visits_api::{app, config, jobs, middleware, services};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);

    info!("Starting Family Visits API v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let db_config = persistence::db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        connect_timeout_secs: config.database.connect_timeout_secs,
        idle_timeout_secs: config.database.idle_timeout_secs,
    };
    let pool = persistence::db::create_pool(&db_config).await?;

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    // WhatsApp transport shared by the HTTP layer and the background jobs
    let sender: Arc<dyn domain::services::WhatsAppSender> = Arc::new(
        services::TwilioWhatsAppService::new(config.whatsapp.clone()),
    );

    // Background jobs
    let mut scheduler = jobs::JobScheduler::new();
    if config.app.jobs_enabled {
        scheduler.register(jobs::DispatchNotificationsJob::new(
            pool.clone(),
            sender.clone(),
            config.app.dispatch_interval_minutes,
            config.app.dispatch_batch_size,
        ));
        scheduler.register(jobs::GapDetectionJob::new(
            pool.clone(),
            config.app.gap_detection_days,
        ));
        scheduler.register(jobs::ActivityNudgeJob::new(
            pool.clone(),
            config.app.inactive_threshold_days,
        ));
        scheduler.register(jobs::TokenCleanupJob::new(
            pool.clone(),
            sender.clone(),
            config.app.base_url.clone(),
        ));
        scheduler.start();
    } else {
        info!("Background jobs disabled by configuration");
    }

    // Build application
    let addr = config.socket_addr();
    let app = app::create_app(config, pool, sender);

    // Start server
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
