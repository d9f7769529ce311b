//! Native measurement scale of each questionnaire section
//!
//! Most sections are answered on a 5-point Likert scale. Two instruments use
//! their own scale and are listed in a fixed table; the lookup is an exact,
//! case-sensitive match on the section name.

use serde::{Deserialize, Serialize};

/// Scale maximum assumed for sections absent from the table
pub const DEFAULT_SCALE_MAX: u8 = 5;

/// Sections whose instrument is not a 5-point scale
///
/// Every entry must stay strictly greater than 1: the rescaling divides by
/// `scale_max - 1`.
const SCALE_TABLE: &[(&str, u8)] = &[
    ("Efficacité personnelle", 4),
    ("Énergie et engagement", 7),
];

/// Look up the scale maximum of a section listed in the table
///
/// Returns `None` for any other section name.
pub fn known_scale_max(section: &str) -> Option<u8> {
    SCALE_TABLE
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, max)| *max)
}

/// Maximum value of the section's native scale
///
/// Unrecognized section names fall back to [`DEFAULT_SCALE_MAX`].
/// Use [`crate::scoring::ScoreNormalizer`] with
/// [`UnknownSectionPolicy::Reject`] to refuse them instead.
///
/// # Examples
///
/// ```
/// use wbq_common::scoring::scale_max;
///
/// assert_eq!(scale_max("Efficacité personnelle"), 4);
/// assert_eq!(scale_max("Énergie et engagement"), 7);
/// assert_eq!(scale_max("Charge de travail"), 5);
/// ```
pub fn scale_max(section: &str) -> u8 {
    known_scale_max(section).unwrap_or(DEFAULT_SCALE_MAX)
}

/// Sections with a non-default scale, in table order
pub fn known_sections() -> impl Iterator<Item = (&'static str, u8)> {
    SCALE_TABLE.iter().copied()
}

/// What to do with a section name missing from the scale table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownSectionPolicy {
    /// Assume a 5-point scale and log a warning
    #[default]
    #[serde(alias = "default_scale")]
    Default,

    /// Refuse the record with [`crate::Error::UnknownSection`]
    Reject,
}

impl UnknownSectionPolicy {
    /// Parse policy from configuration string
    ///
    /// Accepts `default` / `default_scale` and `reject` (case insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" | "default_scale" => Some(UnknownSectionPolicy::Default),
            "reject" => Some(UnknownSectionPolicy::Reject),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnknownSectionPolicy::Default => "default",
            UnknownSectionPolicy::Reject => "reject",
        }
    }
}
