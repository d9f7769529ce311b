//! Dashboard page and script
//!
//! The page template carries `{{...}}` placeholders that are filled from
//! the display configuration: tier palette, default scale, overlay default
//! and the caption under the charts.

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
};
use wbq_common::config::{DisplayConfig, DisplayScale};

use crate::view::{CAPTION, RADAR_LINE_COLOR};
use crate::AppState;

const INDEX_TEMPLATE: &str = include_str!("../ui/index.html");
const APP_JS: &str = include_str!("../ui/app.js");

/// Fill the page template for one display configuration
pub fn render_index(display: &DisplayConfig) -> String {
    let (normalized_selected, raw_selected) = match display.scale {
        DisplayScale::Normalized => ("selected", ""),
        DisplayScale::Raw => ("", "selected"),
    };

    INDEX_TEMPLATE
        .replace("{{COLOR_LOW}}", &display.palette.low)
        .replace("{{COLOR_MEDIUM}}", &display.palette.medium)
        .replace("{{COLOR_HIGH}}", &display.palette.high)
        .replace("{{COLOR_RADAR}}", RADAR_LINE_COLOR)
        .replace("{{NORMALIZED_SELECTED}}", normalized_selected)
        .replace("{{RAW_SELECTED}}", raw_selected)
        .replace(
            "{{OVERLAY_CHECKED}}",
            if display.show_global_overlay { "checked" } else { "" },
        )
        .replace("{{CAPTION}}", CAPTION)
}

/// GET /
pub async fn serve_index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.display))
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        APP_JS,
    )
        .into_response()
}
