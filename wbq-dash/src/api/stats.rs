//! Normalized statistics endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::error;
use wbq_common::provider::{is_valid_user_id, FetchError};
use wbq_common::scoring::IndexBasis;
use wbq_common::{Error, GlobalIndex, NormalizedSectionStat, SectionStat};

use super::ApiError;
use crate::AppState;

/// Normalized records plus their global index
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent: Option<String>,
    pub sections: Vec<NormalizedSectionStat>,
    /// Absent when there are no sections
    pub global_index: Option<GlobalIndex>,
}

fn stats_response(
    state: &AppState,
    respondent: Option<String>,
    stats: &[SectionStat],
) -> Result<StatsResponse, ApiError> {
    let sections = state.normalizer.normalize_all(stats)?;
    let global_index = match state.normalizer.global_index(&sections, IndexBasis::Normalized) {
        Ok(index) => Some(index),
        Err(Error::EmptyInput) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(StatsResponse {
        respondent,
        sections,
        global_index,
    })
}

/// GET /api/stats
///
/// Population statistics on the common 1–10 scale.
pub async fn get_population_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.provider.fetch_stats().await.map_err(|e| {
        error!("Failed to fetch population statistics: {}", e);
        e
    })?;

    Ok(Json(stats_response(&state, None, &stats)?))
}

/// GET /api/stats/:id
pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<StatsResponse>, ApiError> {
    if !is_valid_user_id(&user_id) {
        return Err(FetchError::InvalidUserId(user_id).into());
    }

    let stats = state
        .provider
        .fetch_user_stats(&user_id)
        .await
        .map_err(|e| {
            error!(user_id = %user_id, "Failed to fetch respondent statistics: {}", e);
            e
        })?;

    Ok(Json(stats_response(&state, Some(user_id), &stats)?))
}
