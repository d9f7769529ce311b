//! Liveness endpoint
//!
//! Reports how this instance is wired (upstream, cache, scoring policy)
//! without contacting the statistics API, so it stays fast when the
//! upstream is down.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use wbq_common::config::DisplayScale;
use wbq_common::scoring::UnknownSectionPolicy;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// Provider description, including cache lifetime when cached
    pub upstream: String,
    pub unknown_sections: UnknownSectionPolicy,
    pub scale: DisplayScale,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        upstream: state.provider.describe(),
        unknown_sections: state.normalizer.policy(),
        scale: state.display.scale,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
