//! Survey statistics records
//!
//! Field names on the wire follow the upstream JSON contract
//! (`section`, `moyenne`, `nb_reponses`); Rust field names describe the value.

use serde::{Deserialize, Serialize};

use crate::scoring::{IndexBasis, Tier};

/// Per-section statistic as produced by the upstream API
///
/// # Examples
///
/// ```
/// use wbq_common::model::SectionStat;
///
/// let json = r#"{"section": "Charge de travail", "moyenne": 3.0, "nb_reponses": 10}"#;
/// let stat: SectionStat = serde_json::from_str(json).unwrap();
/// assert_eq!(stat.raw_average, 3.0);
/// assert_eq!(stat.response_count, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionStat {
    /// Thematic dimension of the questionnaire
    pub section: String,

    /// Mean of responses on the section's native scale
    #[serde(rename = "moyenne")]
    pub raw_average: f64,

    /// Number of responses contributing to the average
    #[serde(rename = "nb_reponses", default)]
    pub response_count: u32,
}

impl SectionStat {
    pub fn new(section: impl Into<String>, raw_average: f64, response_count: u32) -> Self {
        Self {
            section: section.into(),
            raw_average,
            response_count,
        }
    }
}

/// Body of `GET /stats` and `GET /stats/{id}`
///
/// A missing `stats` key is read as an empty set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsEnvelope {
    #[serde(default)]
    pub stats: Vec<SectionStat>,
}

/// Section statistic rescaled onto 1–10 and classified
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSectionStat {
    pub section: String,
    #[serde(rename = "moyenne")]
    pub raw_average: f64,
    #[serde(rename = "nb_reponses")]
    pub response_count: u32,
    /// Raw average mapped onto the common 1–10 scale
    pub normalized_score: f64,
    /// Tier of `normalized_score`
    pub tier: Tier,
}

/// Aggregate score over all sections of one result set
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlobalIndex {
    /// Arithmetic mean of the field selected by `basis`
    pub value: f64,
    pub tier: Tier,
    pub basis: IndexBasis,
}
