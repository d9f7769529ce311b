//! Build information endpoint

use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::AppState;

/// Build information response
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
    /// Statistics API the dashboard reads from
    pub upstream: String,
}

/// GET /api/buildinfo
pub async fn get_build_info(State(state): State<AppState>) -> Json<BuildInfo> {
    Json(BuildInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
        upstream: state.provider.describe(),
    })
}
