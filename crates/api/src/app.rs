use axum::{
    routing::{delete, get, post, put},
    Router,
};
use domain::services::calendar::{HebrewCalendar, WeekdayCalendar};
use domain::services::WhatsAppSender;
use shared::jwt::SessionKeys;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::routes::{
    coordinator, health, invites, magic_link, notifications, profiles, visits, webhook,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub sender: Arc<dyn WhatsAppSender>,
    pub calendar: Arc<dyn HebrewCalendar>,
    pub session_keys: SessionKeys,
}

pub fn create_app(config: Config, pool: PgPool, sender: Arc<dyn WhatsAppSender>) -> Router {
    let session_keys = SessionKeys::new(
        &config.auth.session_secret,
        config.auth.session_expiry_secs,
    );
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
        sender,
        calendar: Arc::new(WeekdayCalendar),
        session_keys,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Authenticated routes: handlers extract and validate the session token
    // themselves, so profile and admin checks stay next to the logic that
    // needs them.
    let api_routes = Router::new()
        // Visit slots
        .route("/api/v1/visits", post(visits::book_slot))
        .route("/api/v1/visits/:slot_id", delete(visits::cancel_slot))
        .route("/api/v1/visits/schedule", get(visits::get_schedule))
        .route("/api/v1/visits/by-date/:date", get(visits::get_slots_by_date))
        .route("/api/v1/visits/slot", get(visits::get_slot))
        .route("/api/v1/visits/mine", get(visits::get_my_bookings))
        // Profiles
        .route("/api/v1/profiles/me", get(profiles::get_my_profile))
        .route("/api/v1/profiles/me", put(profiles::upsert_my_profile))
        .route("/api/v1/profiles", get(profiles::list_profiles))
        .route("/api/v1/profiles/:profile_id/admin", put(profiles::set_admin))
        .route("/api/v1/profiles/:profile_id", delete(profiles::delete_profile))
        // Invites
        .route("/api/v1/invites", post(invites::create_invite))
        .route("/api/v1/invites", get(invites::list_invites))
        .route("/api/v1/invites/:invite_id/resend", post(invites::resend_invite))
        .route("/api/v1/invites/:invite_id", delete(invites::delete_invite))
        .route("/api/v1/invites/accept", post(invites::accept_invite))
        // Notifications
        .route("/api/v1/notifications/mine", get(notifications::get_my_notifications))
        .route("/api/v1/notifications", get(notifications::list_notifications))
        .route("/api/v1/notifications/nudge", post(notifications::send_nudge))
        .route(
            "/api/v1/notifications/:notification_id",
            delete(notifications::cancel_notification),
        )
        // Coordinator dashboard
        .route("/api/v1/coordinator/stats", get(coordinator::get_stats))
        .route("/api/v1/coordinator/gaps", get(coordinator::get_gaps))
        .route("/api/v1/coordinator/members", get(coordinator::get_members))
        .route("/api/v1/coordinator/visits", post(coordinator::book_for_member));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live));

    // Messaging-provider webhook and the magic-link lifecycle
    let auth_routes = Router::new()
        .route("/api/whatsapp/webhook", post(webhook::receive_message))
        .route("/api/whatsapp/webhook", get(webhook::verify))
        .route(
            "/api/internal/store-magic-token",
            post(magic_link::store_token),
        )
        .route(
            "/api/auth/magic-link/validate",
            get(magic_link::validate_token),
        )
        .route(
            "/api/auth/magic-link/consume",
            post(magic_link::consume_token),
        );

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
