//! Score normalization and classification
//!
//! Pure, synchronous transformations from raw per-section statistics into
//! normalized, tier-classified records ready for display:
//! - [`scale_max`]: native scale of a section
//! - [`normalize`]: affine rescaling onto 1–10
//! - [`classify`] / [`classify_with`]: Low / Medium / High
//! - [`normalize_all`]: whole result set, order preserved
//! - [`global_index`]: mean over a result set on a chosen basis
//!
//! [`ScoreNormalizer`] wraps the same operations with configurable policy
//! and thresholds.

pub mod index;
pub mod normalizer;
pub mod scale;
pub mod tier;

pub use index::{global_index, global_index_with, IndexBasis};
pub use normalizer::{
    denormalize, denormalize_on_scale, normalize, normalize_all, normalize_on_scale,
    ScoreNormalizer, NORMALIZED_MAX, SCALE_MIN,
};
pub use scale::{known_scale_max, scale_max, UnknownSectionPolicy, DEFAULT_SCALE_MAX};
pub use tier::{classify, classify_with, Tier, TierThresholds};
