//! Global well-being index

use serde::{Deserialize, Serialize};

use super::tier::TierThresholds;
use crate::model::{GlobalIndex, NormalizedSectionStat};
use crate::{Error, Result};

/// Which field of the normalized records the global index averages
///
/// The population dashboard historically averaged raw `moyenne` values and
/// read them on a 1–5 scale; the comparison dashboard averaged normalized
/// scores on 1–10. Callers pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBasis {
    /// Mean of `normalized_score` (1–10)
    #[default]
    Normalized,
    /// Mean of `raw_average` (native scales, read as 1–5)
    Raw,
}

impl IndexBasis {
    /// Tier boundaries matching this basis' scale
    pub fn default_thresholds(&self) -> TierThresholds {
        match self {
            IndexBasis::Normalized => TierThresholds::NORMALIZED,
            IndexBasis::Raw => TierThresholds::RAW,
        }
    }

    fn value_of(&self, stat: &NormalizedSectionStat) -> f64 {
        match self {
            IndexBasis::Normalized => stat.normalized_score,
            IndexBasis::Raw => stat.raw_average,
        }
    }
}

/// Arithmetic mean over all records of the field selected by `basis`
///
/// Fails with [`Error::EmptyInput`] when `stats` is empty.
///
/// # Examples
///
/// ```
/// use wbq_common::model::SectionStat;
/// use wbq_common::scoring::{global_index, normalize_all, IndexBasis, Tier};
///
/// let records = normalize_all(&[SectionStat::new("Charge de travail", 3.0, 10)]);
/// let index = global_index(&records, IndexBasis::Normalized).unwrap();
/// assert_eq!(index.value, 5.5);
/// assert_eq!(index.tier, Tier::Medium);
/// ```
pub fn global_index(stats: &[NormalizedSectionStat], basis: IndexBasis) -> Result<GlobalIndex> {
    global_index_with(stats, basis, &basis.default_thresholds())
}

/// Same as [`global_index`] with explicit tier boundaries
pub fn global_index_with(
    stats: &[NormalizedSectionStat],
    basis: IndexBasis,
    thresholds: &TierThresholds,
) -> Result<GlobalIndex> {
    if stats.is_empty() {
        return Err(Error::EmptyInput);
    }

    let sum: f64 = stats.iter().map(|stat| basis.value_of(stat)).sum();
    let value = sum / stats.len() as f64;

    Ok(GlobalIndex {
        value,
        tier: thresholds.classify(value),
        basis,
    })
}
