//! Three-tier score classification
//!
//! Boundaries are closed-low: a score equal to a threshold belongs to the
//! lower tier.
//!
//! ```text
//! score <= low          -> Low
//! low < score <= high   -> Medium
//! score > high          -> High
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Coarse classification of a score, used for color-coding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Low => "Low",
            Tier::Medium => "Medium",
            Tier::High => "High",
        }
    }

    /// All tiers, lowest first
    pub fn all_variants() -> &'static [Tier] {
        &[Tier::Low, Tier::Medium, Tier::High]
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Tier boundaries on one display scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Highest score still classified `Low`
    pub low: f64,
    /// Highest score still classified `Medium`
    pub high: f64,
}

impl TierThresholds {
    /// Boundaries on the common 1–10 scale
    pub const NORMALIZED: TierThresholds = TierThresholds { low: 3.0, high: 6.0 };

    /// Boundaries on the raw 1–5 scale
    pub const RAW: TierThresholds = TierThresholds { low: 3.0, high: 4.0 };

    /// Create validated thresholds
    ///
    /// Both bounds must be finite and `low` must be strictly below `high`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(Error::InvalidInput(format!(
                "tier thresholds must be finite (low={}, high={})",
                low, high
            )));
        }
        if low >= high {
            return Err(Error::InvalidInput(format!(
                "low threshold {} must be below high threshold {}",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    /// Classify a score against these boundaries
    pub fn classify(&self, score: f64) -> Tier {
        classify_with(score, self.low, self.high)
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        TierThresholds::NORMALIZED
    }
}

/// Classify a normalized 1–10 score with the default boundaries (3, 6)
///
/// # Examples
///
/// ```
/// use wbq_common::scoring::{classify, Tier};
///
/// assert_eq!(classify(3.0), Tier::Low);
/// assert_eq!(classify(5.5), Tier::Medium);
/// assert_eq!(classify(6.0001), Tier::High);
/// ```
pub fn classify(score: f64) -> Tier {
    TierThresholds::NORMALIZED.classify(score)
}

/// Classify a score against explicit boundaries
///
/// Total over the real line. NaN compares false everywhere and lands in `High`;
/// callers feeding NaN get no guarantee beyond determinism.
pub fn classify_with(score: f64, low: f64, high: f64) -> Tier {
    if score <= low {
        Tier::Low
    } else if score <= high {
        Tier::Medium
    } else {
        Tier::High
    }
}
