//! Dashboard view model
//!
//! Turns normalized records into what the page draws: radar points in
//! questionnaire order, bars sorted by score, the global index with its
//! color, and the optional comparison with the whole population.
//! Chart drawing itself happens in the browser.

use std::collections::HashMap;

use serde::Serialize;
use wbq_common::config::{DisplayConfig, DisplayScale, Palette};
use wbq_common::scoring::{IndexBasis, ScoreNormalizer, Tier, TierThresholds};
use wbq_common::{Error, NormalizedSectionStat};

/// Shown instead of charts when a result set is empty
pub const EMPTY_MESSAGE: &str = "Aucune donnée à afficher. Complétez d’abord le questionnaire.";

/// Shown when the statistics API could not be reached
pub const FETCH_WARNING: &str = "Impossible de récupérer les statistiques depuis l’API.";

pub const CAPTION: &str =
    "Ces scores représentent les moyennes corrigées des réponses (inversées incluses).";

/// Color of the radar outline
pub const RADAR_LINE_COLOR: &str = "#007BFF";

/// One section as displayed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub section: String,
    /// Score on the display scale
    pub score: f64,
    pub raw_average: f64,
    pub normalized_score: f64,
    pub response_count: u32,
    pub tier: Tier,
    pub color: String,
    /// Population score for the same section, on the display scale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population_score: Option<f64>,
    /// `score - population_score`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
}

/// Global index as displayed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexView {
    pub value: f64,
    pub tier: Tier,
    pub color: String,
    pub basis: IndexBasis,
    /// e.g. `6.78 / 10`
    pub label: String,
}

/// Everything the page needs for one render
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub generated_at: String,
    pub scale: DisplayScale,
    pub axis_max: f64,
    pub radar_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent: Option<String>,
    pub global_index: Option<IndexView>,
    pub radar: Vec<SectionView>,
    pub bars: Vec<SectionView>,
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Inputs of one dashboard render
pub struct ViewRequest<'a> {
    pub records: &'a [NormalizedSectionStat],
    /// Population records for the comparison overlay
    pub population: Option<&'a [NormalizedSectionStat]>,
    pub respondent: Option<String>,
    pub scale: DisplayScale,
    pub palette: &'a Palette,
}

impl<'a> ViewRequest<'a> {
    pub fn new(records: &'a [NormalizedSectionStat], display: &'a DisplayConfig) -> Self {
        Self {
            records,
            population: None,
            respondent: None,
            scale: display.scale,
            palette: &display.palette,
        }
    }
}

/// Tier color from the palette
pub fn tier_color(palette: &Palette, tier: Tier) -> &str {
    match tier {
        Tier::Low => &palette.low,
        Tier::Medium => &palette.medium,
        Tier::High => &palette.high,
    }
}

fn index_basis(scale: DisplayScale) -> IndexBasis {
    match scale {
        DisplayScale::Normalized => IndexBasis::Normalized,
        DisplayScale::Raw => IndexBasis::Raw,
    }
}

/// Score and tier of a record on the display scale
fn displayed(record: &NormalizedSectionStat, scale: DisplayScale) -> (f64, Tier) {
    match scale {
        DisplayScale::Normalized => (record.normalized_score, record.tier),
        DisplayScale::Raw => (
            record.raw_average,
            TierThresholds::RAW.classify(record.raw_average),
        ),
    }
}

/// Build the view for one result set
///
/// An empty `records` slice yields an empty view carrying
/// [`EMPTY_MESSAGE`] and no global index.
pub fn build_view(normalizer: &ScoreNormalizer, request: ViewRequest<'_>) -> DashboardView {
    let scale = request.scale;

    let population: HashMap<&str, f64> = request
        .population
        .unwrap_or_default()
        .iter()
        .map(|record| (record.section.as_str(), displayed(record, scale).0))
        .collect();

    let radar: Vec<SectionView> = request
        .records
        .iter()
        .map(|record| {
            let (score, tier) = displayed(record, scale);
            let population_score = population.get(record.section.as_str()).copied();
            SectionView {
                section: record.section.clone(),
                score,
                raw_average: record.raw_average,
                normalized_score: record.normalized_score,
                response_count: record.response_count,
                tier,
                color: tier_color(request.palette, tier).to_string(),
                population_score,
                delta: population_score.map(|p| score - p),
            }
        })
        .collect();

    let mut bars = radar.clone();
    // Stable sort: equal scores keep questionnaire order
    bars.sort_by(|a, b| b.score.total_cmp(&a.score));

    let basis = index_basis(scale);
    let global_index = match normalizer.global_index(request.records, basis) {
        Ok(index) => Some(IndexView {
            value: index.value,
            tier: index.tier,
            color: tier_color(request.palette, index.tier).to_string(),
            basis,
            label: format!("{:.2} / {}", index.value, scale.axis_max()),
        }),
        Err(Error::EmptyInput) => None,
        Err(e) => {
            tracing::warn!("Global index unavailable: {}", e);
            None
        }
    };

    DashboardView {
        generated_at: chrono::Utc::now().to_rfc3339(),
        scale,
        axis_max: scale.axis_max(),
        radar_color: RADAR_LINE_COLOR.to_string(),
        respondent: request.respondent,
        empty_message: radar.is_empty().then(|| EMPTY_MESSAGE.to_string()),
        global_index,
        radar,
        bars,
        caption: CAPTION.to_string(),
        warning: None,
    }
}

/// Empty view shown when statistics could not be fetched
pub fn unavailable_view(
    scale: DisplayScale,
    palette: &Palette,
    respondent: Option<String>,
) -> DashboardView {
    let mut view = build_view(
        &ScoreNormalizer::default(),
        ViewRequest {
            records: &[],
            population: None,
            respondent,
            scale,
            palette,
        },
    );
    view.warning = Some(FETCH_WARNING.to_string());
    view
}
