//! Dashboard view endpoint
//!
//! Unlike the raw statistics endpoints, a failed upstream fetch here does
//! not produce an error status: the page gets an empty view carrying a
//! warning so it can still render.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{error, warn};
use wbq_common::config::DisplayScale;
use wbq_common::provider::{is_valid_user_id, FetchError};
use wbq_common::NormalizedSectionStat;

use super::ApiError;
use crate::view::{build_view, unavailable_view, DashboardView, ViewRequest};
use crate::AppState;

/// Query parameters of GET /api/dashboard
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Respondent id; population view when absent
    pub user: Option<String>,
    /// `raw` or `normalized`; configured scale when absent
    pub scale: Option<String>,
    /// Compare the respondent with the population
    pub overlay: Option<bool>,
}

/// GET /api/dashboard?user=&scale=&overlay=
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, ApiError> {
    let scale = match query.scale.as_deref() {
        Some(s) => DisplayScale::from_str(s)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid scale '{}'", s)))?,
        None => state.display.scale,
    };

    let respondent = query.user.filter(|u| !u.is_empty());
    if let Some(user_id) = respondent.as_deref() {
        if !is_valid_user_id(user_id) {
            return Err(FetchError::InvalidUserId(user_id.to_string()).into());
        }
    }

    let fetched = match respondent.as_deref() {
        Some(user_id) => state.provider.fetch_user_stats(user_id).await,
        None => state.provider.fetch_stats().await,
    };
    let stats = match fetched {
        Ok(stats) => stats,
        Err(e) => {
            error!("Dashboard statistics unavailable: {}", e);
            return Ok(Json(unavailable_view(
                scale,
                &state.display.palette,
                respondent,
            )));
        }
    };

    let records = state.normalizer.normalize_all(&stats)?;

    let overlay = respondent.is_some()
        && query.overlay.unwrap_or(state.display.show_global_overlay);
    let population = if overlay {
        population_records(&state).await
    } else {
        None
    };

    let view = build_view(
        &state.normalizer,
        ViewRequest {
            records: &records,
            population: population.as_deref(),
            respondent,
            scale,
            palette: &state.display.palette,
        },
    );

    Ok(Json(view))
}

/// Population records for the overlay; a failure only drops the overlay
async fn population_records(state: &AppState) -> Option<Vec<NormalizedSectionStat>> {
    let stats = match state.provider.fetch_stats().await {
        Ok(stats) => stats,
        Err(e) => {
            warn!("Population overlay unavailable: {}", e);
            return None;
        }
    };

    match state.normalizer.normalize_all(&stats) {
        Ok(records) => Some(records),
        Err(e) => {
            warn!("Population overlay unavailable: {}", e);
            None
        }
    }
}
