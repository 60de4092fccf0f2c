//! HTTP route definitions

use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method},
    middleware,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::app::AppState;
use crate::http::middleware::require_auth;
use crate::http::{guilds, profile, shop, social, workouts};
use crate::realtime::handler::ws_handler;
use crate::store::avatars::MAX_AVATAR_BYTES;
use crate::util::time::uptime_secs;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const JSON_BODY_LIMIT: usize = 64 * 1024;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - support multiple origins (comma-separated in CLIENT_ORIGIN)
    let allowed_origins: Vec<header::HeaderValue> = state
        .config
        .client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .route(
            "/profiles/username-available",
            get(profile::username_available_handler),
        );

    // Avatar uploads carry raw image bytes
    let upload_routes = Router::new()
        .route("/profile/avatar", post(profile::avatar_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_AVATAR_BYTES));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/profile", get(profile::get_profile_handler))
        .route("/profile/onboarding", post(profile::onboarding_handler))
        .route("/profile/class", post(profile::class_handler))
        .route("/profile/stats", post(profile::stats_handler))
        .route("/profile/training-path", post(profile::training_path_handler))
        .route("/profile/program-mode", post(profile::program_mode_handler))
        .route("/profile/evolution", get(profile::evolution_handler))
        .route("/campaign", get(workouts::campaign_handler))
        .route("/workouts/complete", post(workouts::complete_handler))
        .route("/history", get(workouts::history_handler))
        .route(
            "/guilds",
            get(guilds::list_guilds_handler).post(guilds::create_guild_handler),
        )
        .route("/guilds/leave", post(guilds::leave_guild_handler))
        .route("/guilds/:id/join", post(guilds::join_guild_handler))
        .route("/guilds/:id/members", get(guilds::members_handler))
        .route(
            "/guilds/:id/messages",
            get(guilds::messages_handler).post(guilds::send_message_handler),
        )
        .route(
            "/friends",
            get(social::list_friends_handler).post(social::send_request_handler),
        )
        .route("/friends/search", get(social::search_handler))
        .route("/friends/:id/accept", post(social::accept_friend_handler))
        .route("/friends/:id", delete(social::remove_friend_handler))
        .route("/invites", post(social::send_invite_handler))
        .route("/invites/:id/accept", post(social::accept_invite_handler))
        .route("/invites/:id/decline", post(social::decline_invite_handler))
        .route("/shop", get(shop::shop_handler))
        .route("/shop/buy", post(shop::buy_handler))
        .route("/inventory", get(shop::inventory_handler))
        .route(
            "/inventory/:id/toggle-equip",
            post(shop::toggle_equip_handler),
        )
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .merge(upload_routes)
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    online_users: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        online_users: state.realtime.online_count(),
    })
}
