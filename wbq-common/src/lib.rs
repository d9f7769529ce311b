//! # Well-being Questionnaire Common Library
//!
//! Shared code for the well-being dashboard including:
//! - Survey statistics records (wire format of the questionnaire API)
//! - Score normalization onto the common 1–10 scale and tier classification
//! - Statistics API client and the caching layer in front of it
//! - Configuration loading
//! - Error types

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod scoring;

pub use error::{Error, Result};
pub use model::{GlobalIndex, NormalizedSectionStat, SectionStat};
pub use scoring::{IndexBasis, ScoreNormalizer, Tier, TierThresholds};
