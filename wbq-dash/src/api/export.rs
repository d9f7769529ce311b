//! CSV export passthrough

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::ApiError;
use crate::AppState;

/// File name offered to the browser
pub const EXPORT_FILENAME: &str = "responses_export.csv";

/// GET /api/export
///
/// Streams the upstream CSV as a download. Never cached.
pub async fn get_export(State(state): State<AppState>) -> Result<Response, ApiError> {
    let csv = state.provider.fetch_export().await.map_err(|e| {
        error!("Failed to fetch export: {}", e);
        e
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        csv,
    )
        .into_response())
}
