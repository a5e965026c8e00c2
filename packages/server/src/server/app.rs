//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{admin, health_handler, releases, storage, tracks};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub server_deps: ServerDeps,
}

/// Build the Axum application router
///
/// Rate limiting is left to [`with_rate_limit`] because it keys on the peer
/// address, which only exists when served with connect info.
pub fn build_app(server_deps: ServerDeps) -> Router {
    let jwt_service_for_middleware = server_deps.jwt_service.clone();
    let app_state = AppState { server_deps };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        // Artist routes
        .route(
            "/releases",
            post(releases::create_release_handler).get(releases::list_releases_handler),
        )
        .route(
            "/releases/:id",
            get(releases::get_release_handler).patch(releases::update_release_handler),
        )
        .route("/releases/:id/submit", post(releases::submit_release_handler))
        .route(
            "/releases/:id/tracks",
            post(tracks::create_track_handler).get(tracks::list_tracks_handler),
        )
        .route(
            "/releases/:id/tracks/:track_id",
            patch(tracks::update_track_handler).delete(tracks::delete_track_handler),
        )
        // Upload finalization
        .route(
            "/storage/finalize/cover-art",
            post(storage::finalize_cover_art_handler),
        )
        .route(
            "/storage/finalize/track-audio",
            post(storage::finalize_track_audio_handler),
        )
        // Admin routes
        .route("/admin/releases", get(admin::list_releases_handler))
        .route(
            "/admin/releases/pending-review",
            get(admin::pending_review_handler),
        )
        .route("/admin/releases/:id/approve", post(admin::approve_handler))
        .route("/admin/releases/:id/reject", post(admin::reject_handler))
        // Health check
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service_for_middleware.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Per-IP rate limit: 10 requests per second with bursts of 20.
///
/// Keyed on the peer address from `ConnectInfo<SocketAddr>`.
pub fn with_rate_limit(router: Router) -> Result<Router> {
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            // One token back every 100ms
            .per_millisecond(100)
            .burst_size(20)
            .use_headers() // x-ratelimit-* response headers
            .finish()
            .context("invalid rate limit configuration")?,
    );

    Ok(router.layer(GovernorLayer {
        config: rate_limit_config,
    }))
}
