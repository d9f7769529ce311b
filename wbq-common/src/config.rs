//! Configuration loading and resolution
//!
//! Settings are resolved with the following priority:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables (handled by the binary's argument parser)
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing or unreadable TOML file never aborts startup: a warning is
//! logged and defaults apply. Values that are present but invalid are
//! rejected with [`Error::Config`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::scoring::{ScoreNormalizer, TierThresholds, UnknownSectionPolicy};
use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "WBQ_CONFIG";

/// Built-in defaults used when neither CLI, environment nor TOML set a value
pub struct CompiledDefaults;

impl CompiledDefaults {
    pub const API_URL: &'static str = "https://questionnairesantementale.onrender.com";
    pub const BIND: &'static str = "127.0.0.1";
    pub const PORT: u16 = 5810;
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;
    pub const CACHE_TTL_SECS: u64 = 300;
    /// One week
    pub const MAX_CACHE_TTL_SECS: u64 = 7 * 24 * 3600;
    pub const LOG_LEVEL: &'static str = "info";
}

/// Scale on which the dashboard displays section scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayScale {
    /// Common 1–10 scale
    #[default]
    Normalized,
    /// Native scale of each section, axis capped at 5
    Raw,
}

impl DisplayScale {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normalized" | "10" => Some(DisplayScale::Normalized),
            "raw" | "5" => Some(DisplayScale::Raw),
            _ => None,
        }
    }

    /// Upper bound of the chart axes on this scale
    pub fn axis_max(&self) -> f64 {
        match self {
            DisplayScale::Normalized => 10.0,
            DisplayScale::Raw => 5.0,
        }
    }
}

/// Tier colors as `#RRGGBB`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default = "default_low_color")]
    pub low: String,
    #[serde(default = "default_medium_color")]
    pub medium: String,
    #[serde(default = "default_high_color")]
    pub high: String,
}

fn default_low_color() -> String {
    "#E74C3C".to_string()
}

fn default_medium_color() -> String {
    "#F5B041".to_string()
}

fn default_high_color() -> String {
    "#2ECC71".to_string()
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            low: default_low_color(),
            medium: default_medium_color(),
            high: default_high_color(),
        }
    }
}

impl Palette {
    fn validate(&self) -> Result<()> {
        for (name, color) in [("low", &self.low), ("medium", &self.medium), ("high", &self.high)] {
            if !is_hex_color(color) {
                return Err(Error::Config(format!(
                    "display.palette.{} must be #RRGGBB (got '{}')",
                    name, color
                )));
            }
        }
        Ok(())
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

// ========================================
// TOML schema
// ========================================

/// Configuration file contents
///
/// Every key is optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the statistics API
    #[serde(default)]
    pub api_url: Option<String>,

    /// Listen address of the dashboard
    #[serde(default)]
    pub bind: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Upstream request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub scoring: ScoringSection,

    #[serde(default)]
    pub display: DisplaySection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSection {
    /// Seconds a fetched result stays fresh; 0 disables caching
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSection {
    #[serde(default)]
    pub unknown_sections: Option<String>,
    #[serde(default)]
    pub low_threshold: Option<f64>,
    #[serde(default)]
    pub high_threshold: Option<f64>,
    /// Native scale of sections outside the built-in table
    #[serde(default)]
    pub scales: BTreeMap<String, u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplaySection {
    #[serde(default)]
    pub scale: Option<String>,
    #[serde(default)]
    pub show_global_overlay: Option<bool>,
    #[serde(default)]
    pub palette: Option<Palette>,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Load a config file, falling back to defaults when it cannot be read
    ///
    /// Unreadable or unparsable files are logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{} ({}); using defaults", e, path.display());
                Self::default()
            }
        }
    }
}

// ========================================
// Resolved configuration
// ========================================

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub cache_ttl_secs: Option<u64>,
    pub log_level: Option<String>,
    pub display_scale: Option<DisplayScale>,
    pub show_global_overlay: Option<bool>,
}

/// Scoring settings after resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub unknown_sections: UnknownSectionPolicy,
    pub thresholds: TierThresholds,
    pub section_scales: BTreeMap<String, u8>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            unknown_sections: UnknownSectionPolicy::Default,
            thresholds: TierThresholds::NORMALIZED,
            section_scales: BTreeMap::new(),
        }
    }
}

impl ScoringConfig {
    /// Build the normalizer these settings describe
    pub fn normalizer(&self) -> Result<ScoreNormalizer> {
        ScoreNormalizer::new(self.unknown_sections, self.thresholds)
            .with_section_scales(self.section_scales.clone())
            .map_err(|e| Error::Config(e.to_string()))
    }
}

/// Presentation settings after resolution
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayConfig {
    pub scale: DisplayScale,
    pub show_global_overlay: bool,
    pub palette: Palette,
}

/// Complete dashboard configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub api_url: String,
    pub bind: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub scoring: ScoringConfig,
    pub display: DisplayConfig,
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: CompiledDefaults::API_URL.to_string(),
            bind: CompiledDefaults::BIND.to_string(),
            port: CompiledDefaults::PORT,
            request_timeout: Duration::from_secs(CompiledDefaults::REQUEST_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(CompiledDefaults::CACHE_TTL_SECS),
            scoring: ScoringConfig::default(),
            display: DisplayConfig::default(),
            log_level: CompiledDefaults::LOG_LEVEL.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Locate and read the config file, then merge overrides on top
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let toml_config = match locate_config_file(overrides.config_path.as_deref()) {
            Some(path) => TomlConfig::load_or_default(&path),
            None => {
                info!("No config file found; using compiled defaults");
                TomlConfig::default()
            }
        };
        Self::merge(toml_config, overrides)
    }

    /// Merge TOML values and overrides over compiled defaults
    pub fn merge(toml_config: TomlConfig, overrides: ConfigOverrides) -> Result<Self> {
        let defaults = Self::default();
        // Borrows `overrides`; resolved before its fields are moved out below
        let display = resolve_display(&toml_config.display, &overrides)?;

        let api_url = overrides
            .api_url
            .or(toml_config.api_url)
            .unwrap_or(defaults.api_url);
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "api_url must be an http(s) URL (got '{}')",
                api_url
            )));
        }

        let timeout_secs = toml_config
            .request_timeout_secs
            .unwrap_or(CompiledDefaults::REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".to_string()));
        }

        let cache_ttl_secs = overrides
            .cache_ttl_secs
            .or(toml_config.cache.ttl_secs)
            .unwrap_or(CompiledDefaults::CACHE_TTL_SECS);
        if cache_ttl_secs > CompiledDefaults::MAX_CACHE_TTL_SECS {
            return Err(Error::Config(format!(
                "cache.ttl_secs must not exceed {} (got {})",
                CompiledDefaults::MAX_CACHE_TTL_SECS,
                cache_ttl_secs
            )));
        }

        let scoring = resolve_scoring(&toml_config.scoring)?;

        Ok(Self {
            api_url,
            bind: overrides.bind.or(toml_config.bind).unwrap_or(defaults.bind),
            port: overrides.port.or(toml_config.port).unwrap_or(defaults.port),
            request_timeout: Duration::from_secs(timeout_secs),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            scoring,
            display,
            log_level: overrides
                .log_level
                .or(toml_config.logging.level)
                .unwrap_or(defaults.log_level),
        })
    }

    /// Socket address string the server binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn resolve_scoring(section: &ScoringSection) -> Result<ScoringConfig> {
    let unknown_sections = match &section.unknown_sections {
        Some(value) => UnknownSectionPolicy::from_str(value).ok_or_else(|| {
            Error::Config(format!(
                "scoring.unknown_sections must be 'default' or 'reject' (got '{}')",
                value
            ))
        })?,
        None => UnknownSectionPolicy::Default,
    };

    let thresholds = TierThresholds::new(
        section.low_threshold.unwrap_or(TierThresholds::NORMALIZED.low),
        section.high_threshold.unwrap_or(TierThresholds::NORMALIZED.high),
    )
    .map_err(|e| Error::Config(e.to_string()))?;

    let config = ScoringConfig {
        unknown_sections,
        thresholds,
        section_scales: section.scales.clone(),
    };
    // Validates section scales against the built-in table
    config.normalizer()?;
    Ok(config)
}

fn resolve_display(section: &DisplaySection, overrides: &ConfigOverrides) -> Result<DisplayConfig> {
    let scale = match (overrides.display_scale, &section.scale) {
        (Some(scale), _) => scale,
        (None, Some(value)) => DisplayScale::from_str(value).ok_or_else(|| {
            Error::Config(format!(
                "display.scale must be 'normalized' or 'raw' (got '{}')",
                value
            ))
        })?,
        (None, None) => DisplayScale::default(),
    };

    let palette = section.palette.clone().unwrap_or_default();
    palette.validate()?;

    Ok(DisplayConfig {
        scale,
        show_global_overlay: overrides
            .show_global_overlay
            .or(section.show_global_overlay)
            .unwrap_or(false),
        palette,
    })
}

/// Find the config file to read
///
/// Order: explicit path, `WBQ_CONFIG`, user config dir (`wbq/config.toml`),
/// then `/etc/wbq/config.toml` on Linux. Only the explicit path and the
/// environment variable are returned without an existence check.
pub fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    if let Some(user_config) = dirs::config_dir().map(|d| d.join("wbq").join("config.toml")) {
        if user_config.exists() {
            return Some(user_config);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/wbq/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
