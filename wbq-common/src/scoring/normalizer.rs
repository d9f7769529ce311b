//! Linear rescaling of section averages onto the common 1–10 scale
//!
//! ```text
//! normalized = 1 + (raw_average - 1) * (9 / (scale_max(section) - 1))
//! ```
//!
//! The map is affine and strictly increasing: the bottom of the native scale
//! lands on 1, the top on 10. Values outside the native scale are passed
//! through the same formula without clamping so upstream data problems stay
//! visible in the output.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::index::{global_index_with, IndexBasis};
use super::scale::{known_scale_max, scale_max, UnknownSectionPolicy, DEFAULT_SCALE_MAX};
use super::tier::TierThresholds;
use crate::model::{GlobalIndex, NormalizedSectionStat, SectionStat};
use crate::{Error, Result};

/// Bottom of every native scale and of the common scale
pub const SCALE_MIN: f64 = 1.0;

/// Top of the common scale
pub const NORMALIZED_MAX: f64 = 10.0;

/// Rescale a raw average for the given section onto 1–10
///
/// # Examples
///
/// ```
/// use wbq_common::scoring::normalize;
///
/// assert_eq!(normalize(3.0, "Charge de travail"), 5.5);
/// assert_eq!(normalize(4.0, "Efficacité personnelle"), 10.0);
/// assert_eq!(normalize(1.0, "Énergie et engagement"), 1.0);
/// ```
pub fn normalize(raw_average: f64, section: &str) -> f64 {
    normalize_on_scale(raw_average, scale_max(section))
}

/// Rescale a raw average from a `1..=scale_max` scale onto 1–10
///
/// `scale_max` must be greater than 1.
pub fn normalize_on_scale(raw_average: f64, scale_max: u8) -> f64 {
    let max = f64::from(scale_max);
    debug_assert!(max > SCALE_MIN, "scale max must exceed 1");

    if !(SCALE_MIN..=max).contains(&raw_average) {
        debug!(
            raw_average,
            scale_max, "Raw average outside native scale; normalized score will leave 1-10"
        );
    }

    SCALE_MIN + (raw_average - SCALE_MIN) * ((NORMALIZED_MAX - SCALE_MIN) / (max - SCALE_MIN))
}

/// Map a 1–10 score back onto the section's native scale
///
/// Inverse of [`normalize`].
pub fn denormalize(score: f64, section: &str) -> f64 {
    denormalize_on_scale(score, scale_max(section))
}

/// Map a 1–10 score back onto a `1..=scale_max` scale
pub fn denormalize_on_scale(score: f64, scale_max: u8) -> f64 {
    let max = f64::from(scale_max);
    SCALE_MIN + (score - SCALE_MIN) * ((max - SCALE_MIN) / (NORMALIZED_MAX - SCALE_MIN))
}

/// Normalize and classify every record, preserving input order
///
/// Unknown sections use the default 5-point scale. Never fails; empty input
/// yields an empty vector.
pub fn normalize_all(stats: &[SectionStat]) -> Vec<NormalizedSectionStat> {
    stats
        .iter()
        .map(|stat| build_record(stat, scale_max(&stat.section), &TierThresholds::NORMALIZED))
        .collect()
}

fn build_record(
    stat: &SectionStat,
    scale_max: u8,
    thresholds: &TierThresholds,
) -> NormalizedSectionStat {
    let normalized_score = normalize_on_scale(stat.raw_average, scale_max);
    NormalizedSectionStat {
        section: stat.section.clone(),
        raw_average: stat.raw_average,
        response_count: stat.response_count,
        normalized_score,
        tier: thresholds.classify(normalized_score),
    }
}

/// Configurable score normalizer
///
/// Bundles the unknown-section policy, extra section scales from
/// configuration and the tier boundaries used on the normalized scale.
/// `ScoreNormalizer::default()` produces the same records as the free
/// functions of this module; in addition it logs each distinct section that
/// falls back to the default scale, once per normalizer.
#[derive(Debug, Clone, Default)]
pub struct ScoreNormalizer {
    policy: UnknownSectionPolicy,
    thresholds: TierThresholds,
    section_scales: BTreeMap<String, u8>,
    reported: Arc<Mutex<BTreeSet<String>>>,
}

impl ScoreNormalizer {
    pub fn new(policy: UnknownSectionPolicy, thresholds: TierThresholds) -> Self {
        Self {
            policy,
            thresholds,
            ..Self::default()
        }
    }

    /// Declare the native scale of sections absent from the built-in table
    ///
    /// Every scale must exceed 1, and entries may not contradict the
    /// built-in table.
    pub fn with_section_scales(mut self, scales: BTreeMap<String, u8>) -> Result<Self> {
        for (section, max) in &scales {
            if *max <= 1 {
                return Err(Error::InvalidInput(format!(
                    "scale max for section '{}' must exceed 1 (got {})",
                    section, max
                )));
            }
            if let Some(builtin) = known_scale_max(section) {
                if builtin != *max {
                    return Err(Error::InvalidInput(format!(
                        "section '{}' is fixed to a {}-point scale (got {})",
                        section, builtin, max
                    )));
                }
            }
        }
        self.section_scales = scales;
        Ok(self)
    }

    pub fn policy(&self) -> UnknownSectionPolicy {
        self.policy
    }

    pub fn thresholds(&self) -> TierThresholds {
        self.thresholds
    }

    fn declared_scale(&self, section: &str) -> Option<u8> {
        known_scale_max(section).or_else(|| self.section_scales.get(section).copied())
    }

    /// Resolve the native scale of a section under this normalizer's policy
    pub fn resolve_scale(&self, section: &str) -> Result<u8> {
        if let Some(max) = self.declared_scale(section) {
            return Ok(max);
        }
        match self.policy {
            UnknownSectionPolicy::Default => {
                self.report_fallback(section);
                Ok(DEFAULT_SCALE_MAX)
            }
            UnknownSectionPolicy::Reject => Err(Error::UnknownSection(section.to_string())),
        }
    }

    fn report_fallback(&self, section: &str) {
        let first_time = match self.reported.lock() {
            Ok(mut reported) => reported.insert(section.to_string()),
            Err(_) => false,
        };
        if first_time {
            warn!(
                section = %section,
                scale_max = DEFAULT_SCALE_MAX,
                "Section has no declared scale; assuming default scale"
            );
        } else {
            debug!(section = %section, "Default scale fallback");
        }
    }

    /// Normalize and classify one record
    pub fn normalize(&self, stat: &SectionStat) -> Result<NormalizedSectionStat> {
        let scale_max = self.resolve_scale(&stat.section)?;
        Ok(build_record(stat, scale_max, &self.thresholds))
    }

    /// Normalize and classify every record, preserving input order
    ///
    /// Fails only under [`UnknownSectionPolicy::Reject`], on the first
    /// section without a declared scale.
    pub fn normalize_all(&self, stats: &[SectionStat]) -> Result<Vec<NormalizedSectionStat>> {
        stats.iter().map(|stat| self.normalize(stat)).collect()
    }

    /// Global index over normalized records
    ///
    /// On the normalized basis this normalizer's thresholds apply; the raw
    /// basis always uses [`TierThresholds::RAW`].
    pub fn global_index(
        &self,
        stats: &[NormalizedSectionStat],
        basis: IndexBasis,
    ) -> Result<GlobalIndex> {
        let thresholds = match basis {
            IndexBasis::Normalized => self.thresholds,
            IndexBasis::Raw => TierThresholds::RAW,
        };
        global_index_with(stats, basis, &thresholds)
    }
}
