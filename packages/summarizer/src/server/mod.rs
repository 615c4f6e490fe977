pub mod error;
pub mod routes;
pub mod state;

use axum::http::Method;
use axum::routing::{any, get};
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::{analytics, events, feed, health, search, similar, source, static_ui};
use state::AppState;

/// Build the summarizer's Axum router: permissive GET-only CORS, tracing
/// on every request, static UI falling through to the API routes.
pub fn build_app(pool: PgPool) -> Router {
    let state = AppState { pool };

    let cors = CorsLayer::new().allow_origin(Any).allow_methods([Method::GET]);

    Router::new()
        .route("/health", get(health::health))
        .route("/feed/dates", get(feed::feed_dates))
        .route("/feed", get(feed::feed))
        .route("/search", get(search::search))
        .route("/similar", get(similar::similar))
        .route("/analytics/trending", get(analytics::trending))
        .route("/analytics/timeline", get(analytics::timeline))
        .route("/events", get(events::events))
        .route("/articles/:id/source", get(source::source))
        .with_state(state)
        .fallback(any(static_ui::serve_ui))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
