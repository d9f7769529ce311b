//! wbq-dash library - well-being questionnaire dashboard
//!
//! Serves the dashboard page and the JSON endpoints it draws from. All
//! statistics come from a [`StatsProvider`]; scoring is delegated to
//! [`ScoreNormalizer`].

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use wbq_common::config::DisplayConfig;
use wbq_common::provider::StatsProvider;
use wbq_common::ScoreNormalizer;

pub mod api;
pub mod view;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Source of statistics (usually cached HTTP client)
    pub provider: Arc<dyn StatsProvider>,
    pub normalizer: ScoreNormalizer,
    pub display: DisplayConfig,
}

impl AppState {
    /// Create new application state
    pub fn new(
        provider: Arc<dyn StatsProvider>,
        normalizer: ScoreNormalizer,
        display: DisplayConfig,
    ) -> Self {
        Self {
            provider,
            normalizer,
            display,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let api = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/stats", get(api::get_population_stats))
        .route("/api/stats/:id", get(api::get_user_stats))
        .route("/api/dashboard", get(api::get_dashboard))
        .route("/api/export", get(api::get_export));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
