//! Integration tests for wbq-dash API endpoints
//!
//! Tests cover:
//! - Health and build info endpoints
//! - Normalized statistics for the population and one respondent
//! - Dashboard view: ordering, scales, overlay, empty and degraded states
//! - CSV export passthrough
//! - Error status mapping (400 / 422 / 502)

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt; // for `collect` method
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method
use wbq_common::config::{DisplayConfig, DisplayScale};
use wbq_common::provider::{FetchError, StatsProvider};
use wbq_common::scoring::{TierThresholds, UnknownSectionPolicy};
use wbq_common::{ScoreNormalizer, SectionStat};
use wbq_dash::view::{EMPTY_MESSAGE, FETCH_WARNING};
use wbq_dash::{build_router, AppState};

/// In-memory statistics API; `None` fields fail with a network error
#[derive(Clone, Default)]
struct FakeProvider {
    population: Option<Vec<SectionStat>>,
    respondent: Option<Vec<SectionStat>>,
    export: Option<Vec<u8>>,
}

fn unreachable() -> FetchError {
    FetchError::Network("connection refused".to_string())
}

#[async_trait]
impl StatsProvider for FakeProvider {
    async fn fetch_stats(&self) -> Result<Vec<SectionStat>, FetchError> {
        self.population.clone().ok_or_else(unreachable)
    }

    async fn fetch_user_stats(&self, user_id: &str) -> Result<Vec<SectionStat>, FetchError> {
        if user_id == "404" {
            return Err(FetchError::Status(404, "unknown respondent".to_string()));
        }
        self.respondent.clone().ok_or_else(unreachable)
    }

    async fn fetch_export(&self) -> Result<Vec<u8>, FetchError> {
        self.export.clone().ok_or_else(unreachable)
    }

    fn describe(&self) -> String {
        "fake".to_string()
    }
}

fn population() -> Vec<SectionStat> {
    vec![
        SectionStat::new("Charge de travail", 2.0, 12),
        SectionStat::new("Efficacité personnelle", 3.25, 12),
        SectionStat::new("Énergie et engagement", 5.0, 12),
        SectionStat::new("Reconnaissance", 4.0, 11),
    ]
}

fn healthy_provider() -> FakeProvider {
    FakeProvider {
        population: Some(population()),
        respondent: Some(vec![
            SectionStat::new("Charge de travail", 4.0, 1),
            SectionStat::new("Efficacité personnelle", 2.0, 1),
        ]),
        export: Some(b"id,section,score\n1,Charge de travail,4\n".to_vec()),
    }
}

/// Test helper: Create app around a fake provider with default settings
fn setup_app(provider: FakeProvider) -> axum::Router {
    setup_app_with(provider, ScoreNormalizer::default(), DisplayConfig::default())
}

fn setup_app_with(
    provider: FakeProvider,
    normalizer: ScoreNormalizer,
    display: DisplayConfig,
) -> axum::Router {
    build_router(AppState::new(Arc::new(provider), normalizer, display))
}

fn test_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app.oneshot(test_request(uri)).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

fn sections(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|s| s["section"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Health and build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get_json(setup_app(FakeProvider::default()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "wbq-dash");
    assert!(body["version"].is_string());
    assert_eq!(body["upstream"], "fake");
    assert_eq!(body["unknown_sections"], "default");
    assert_eq!(body["scale"], "normalized");
}

#[tokio::test]
async fn test_health_does_not_contact_upstream() {
    // Every fetch of the default fake fails
    let normalizer =
        ScoreNormalizer::new(UnknownSectionPolicy::Reject, TierThresholds::NORMALIZED);
    let app = setup_app_with(FakeProvider::default(), normalizer, DisplayConfig::default());

    let (status, body) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unknown_sections"], "reject");
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let (status, body) = get_json(setup_app(FakeProvider::default()), "/api/buildinfo").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["git_hash"].is_string());
    assert!(body["build_timestamp"].is_string());
    assert_eq!(body["upstream"], "fake");
}

#[tokio::test]
async fn test_index_and_script_served() {
    let app = setup_app(FakeProvider::default());
    let response = app.clone().oneshot(test_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
    let page = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(page.to_vec()).unwrap();
    assert!(page.contains("--tier-medium: #F5B041"));
    assert!(page.contains("moyennes corrigées"));

    let response = app.oneshot(test_request("/static/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/javascript"
    );
}

// =============================================================================
// Statistics endpoints
// =============================================================================

#[tokio::test]
async fn test_population_stats_normalized() {
    let (status, body) = get_json(setup_app(healthy_provider()), "/api/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("respondent").is_none());
    assert_eq!(
        sections(&body["sections"]),
        vec![
            "Charge de travail",
            "Efficacité personnelle",
            "Énergie et engagement",
            "Reconnaissance"
        ]
    );
    assert_eq!(body["sections"][0]["normalized_score"], 3.25);
    assert_eq!(body["sections"][0]["moyenne"], 2.0);
    assert_eq!(body["sections"][0]["nb_reponses"], 12);
    assert_eq!(body["sections"][0]["tier"], "medium");
    assert_eq!(body["sections"][1]["normalized_score"], 7.75);
    assert_eq!(body["sections"][1]["tier"], "high");

    assert_eq!(body["global_index"]["value"], 6.4375);
    assert_eq!(body["global_index"]["tier"], "high");
    assert_eq!(body["global_index"]["basis"], "normalized");
}

#[tokio::test]
async fn test_user_stats() {
    let (status, body) = get_json(setup_app(healthy_provider()), "/api/stats/17").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["respondent"], "17");
    assert_eq!(body["sections"][0]["normalized_score"], 7.75);
    assert_eq!(body["sections"][1]["normalized_score"], 4.0);
}

#[tokio::test]
async fn test_empty_stats_has_no_index() {
    let provider = FakeProvider {
        population: Some(vec![]),
        ..FakeProvider::default()
    };
    let (status, body) = get_json(setup_app(provider), "/api/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sections"], Value::Array(vec![]));
    assert!(body["global_index"].is_null());
}

#[tokio::test]
async fn test_stats_upstream_failure_is_bad_gateway() {
    let (status, body) = get_json(setup_app(FakeProvider::default()), "/api/stats").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream");
    assert!(body["message"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_user_stats_upstream_status_is_bad_gateway() {
    let (status, body) = get_json(setup_app(healthy_provider()), "/api/stats/404").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["message"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn test_unknown_section_rejected_with_422() {
    let normalizer =
        ScoreNormalizer::new(UnknownSectionPolicy::Reject, TierThresholds::NORMALIZED);
    let app = setup_app_with(healthy_provider(), normalizer, DisplayConfig::default());

    let (status, body) = get_json(app, "/api/stats").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "unknown_section");
    assert!(body["message"].as_str().unwrap().contains("Charge de travail"));
}

// =============================================================================
// Dashboard view
// =============================================================================

#[tokio::test]
async fn test_dashboard_population_view() {
    let (status, body) = get_json(setup_app(healthy_provider()), "/api/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scale"], "normalized");
    assert_eq!(body["axis_max"], 10.0);
    assert_eq!(body["radar_color"], "#007BFF");
    assert!(body.get("warning").is_none());
    assert!(body.get("empty_message").is_none());

    // Radar keeps questionnaire order, bars are sorted by score and
    // equal scores keep questionnaire order
    assert_eq!(
        sections(&body["radar"]),
        vec![
            "Charge de travail",
            "Efficacité personnelle",
            "Énergie et engagement",
            "Reconnaissance"
        ]
    );
    assert_eq!(
        sections(&body["bars"]),
        vec![
            "Efficacité personnelle",
            "Reconnaissance",
            "Énergie et engagement",
            "Charge de travail"
        ]
    );

    assert_eq!(body["global_index"]["tier"], "high");
    assert_eq!(body["global_index"]["color"], "#2ECC71");
    assert_eq!(body["global_index"]["label"], "6.44 / 10");
    assert!(body["caption"].as_str().unwrap().contains("moyennes corrigées"));
}

#[tokio::test]
async fn test_dashboard_raw_scale() {
    let (status, body) =
        get_json(setup_app(healthy_provider()), "/api/dashboard?scale=raw").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scale"], "raw");
    assert_eq!(body["axis_max"], 5.0);
    assert_eq!(body["radar"][0]["score"], 2.0);
    assert_eq!(body["radar"][0]["tier"], "low");
    assert_eq!(body["global_index"]["basis"], "raw");
    assert_eq!(body["global_index"]["label"], "3.56 / 5");
}

#[tokio::test]
async fn test_dashboard_configured_scale_is_default() {
    let display = DisplayConfig {
        scale: DisplayScale::Raw,
        ..DisplayConfig::default()
    };
    let app = setup_app_with(healthy_provider(), ScoreNormalizer::default(), display);

    let (_, body) = get_json(app.clone(), "/api/dashboard").await;
    assert_eq!(body["scale"], "raw");

    let (_, body) = get_json(app, "/api/dashboard?scale=normalized").await;
    assert_eq!(body["scale"], "normalized");
}

#[tokio::test]
async fn test_dashboard_invalid_scale() {
    let (status, body) =
        get_json(setup_app(healthy_provider()), "/api/dashboard?scale=percent").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_dashboard_respondent_with_overlay() {
    let (status, body) = get_json(
        setup_app(healthy_provider()),
        "/api/dashboard?user=17&overlay=true",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["respondent"], "17");
    assert_eq!(body["radar"][0]["score"], 7.75);
    assert_eq!(body["radar"][0]["population_score"], 3.25);
    assert_eq!(body["radar"][0]["delta"], 4.5);
    assert_eq!(body["radar"][1]["delta"], 4.0 - 7.75);
}

#[tokio::test]
async fn test_dashboard_respondent_without_overlay() {
    let (_, body) = get_json(setup_app(healthy_provider()), "/api/dashboard?user=17").await;

    assert!(body["radar"][0].get("population_score").is_none());
    assert!(body["radar"][0].get("delta").is_none());
}

#[tokio::test]
async fn test_dashboard_overlay_enabled_by_config() {
    let display = DisplayConfig {
        show_global_overlay: true,
        ..DisplayConfig::default()
    };
    let app = setup_app_with(healthy_provider(), ScoreNormalizer::default(), display);

    let (_, body) = get_json(app.clone(), "/api/dashboard?user=17").await;
    assert_eq!(body["radar"][0]["population_score"], 3.25);

    let (_, body) = get_json(app, "/api/dashboard?user=17&overlay=false").await;
    assert!(body["radar"][0].get("population_score").is_none());
}

#[tokio::test]
async fn test_dashboard_overlay_failure_keeps_respondent_view() {
    let provider = FakeProvider {
        population: None,
        ..healthy_provider()
    };
    let (status, body) =
        get_json(setup_app(provider), "/api/dashboard?user=17&overlay=true").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("warning").is_none());
    assert_eq!(body["radar"][0]["score"], 7.75);
    assert!(body["radar"][0].get("delta").is_none());
}

#[tokio::test]
async fn test_dashboard_empty_state() {
    let provider = FakeProvider {
        population: Some(vec![]),
        ..FakeProvider::default()
    };
    let (status, body) = get_json(setup_app(provider), "/api/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["empty_message"], EMPTY_MESSAGE);
    assert!(body["global_index"].is_null());
    assert_eq!(body["radar"], Value::Array(vec![]));
    assert!(body.get("warning").is_none());
}

#[tokio::test]
async fn test_dashboard_degrades_on_upstream_failure() {
    let (status, body) = get_json(setup_app(FakeProvider::default()), "/api/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["warning"], FETCH_WARNING);
    assert_eq!(body["empty_message"], EMPTY_MESSAGE);
    assert!(body["global_index"].is_null());
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_is_csv_attachment() {
    let app = setup_app(healthy_provider());
    let response = app.oneshot(test_request("/api/export")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"responses_export.csv\""
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"id,section,score\n1,Charge de travail,4\n");
}

#[tokio::test]
async fn test_export_upstream_failure() {
    let (status, body) = get_json(setup_app(FakeProvider::default()), "/api/export").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream");
}
