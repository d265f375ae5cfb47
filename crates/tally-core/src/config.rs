//! # Analysis Configuration
//!
//! Tunables for the built-in policies and report shape.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_TOP_PRODUCTS_LIMIT=10                                        │
//! │     TALLY_BONUS_TIER_ORDER=last_place_first                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tally/analysis.toml (Linux)                              │
//! │     ~/Library/Application Support/com.tally.tally/analysis.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     top 10 products, 15% / 10% / 5% / 0% bonus, podium checked first  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # analysis.toml
//! [report]
//! top_products_limit = 10
//!
//! [bonus]
//! first_place_bps = 1500
//! podium_bps = 1000
//! standard_bps = 500
//! last_place_bps = 0
//! tier_order = "podium_first"  # podium_first | last_place_first
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::policy::BonusTierOrder;
use crate::DEFAULT_TOP_PRODUCTS_LIMIT;

/// Upper bound for any basis-point rate (100%).
const MAX_BPS: u32 = 10_000;

// =============================================================================
// Report Settings
// =============================================================================

/// Shape of each seller report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Maximum number of products kept per seller.
    #[serde(default = "default_top_products_limit")]
    pub top_products_limit: usize,
}

fn default_top_products_limit() -> usize {
    DEFAULT_TOP_PRODUCTS_LIMIT
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            top_products_limit: default_top_products_limit(),
        }
    }
}

// =============================================================================
// Bonus Settings
// =============================================================================

/// Rates for [`crate::policy::BonusByProfit`], in basis points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusSettings {
    /// Rank 0. Default: 1500 (15%)
    #[serde(default = "default_first_place_bps")]
    pub first_place_bps: u32,

    /// Ranks 1 and 2. Default: 1000 (10%)
    #[serde(default = "default_podium_bps")]
    pub podium_bps: u32,

    /// Everyone between the podium and last place. Default: 500 (5%)
    #[serde(default = "default_standard_bps")]
    pub standard_bps: u32,

    /// Last place. Default: 0
    #[serde(default)]
    pub last_place_bps: u32,

    /// Whether podium or last-place checks win for small teams.
    #[serde(default)]
    pub tier_order: BonusTierOrder,
}

fn default_first_place_bps() -> u32 {
    1500
}

fn default_podium_bps() -> u32 {
    1000
}

fn default_standard_bps() -> u32 {
    500
}

impl Default for BonusSettings {
    fn default() -> Self {
        BonusSettings {
            first_place_bps: default_first_place_bps(),
            podium_bps: default_podium_bps(),
            standard_bps: default_standard_bps(),
            last_place_bps: 0,
            tier_order: BonusTierOrder::default(),
        }
    }
}

// =============================================================================
// Main Analysis Configuration
// =============================================================================

/// Complete analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub report: ReportSettings,

    #[serde(default)]
    pub bonus: BonusSettings,
}

impl AnalysisConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (analysis.toml), skipped when absent
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading analysis config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load analysis config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections and keys take defaults.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Analysis config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.report.top_products_limit == 0 {
            return Err(ConfigError::Invalid(
                "top_products_limit must be greater than 0".into(),
            ));
        }

        let rates = [
            ("first_place_bps", self.bonus.first_place_bps),
            ("podium_bps", self.bonus.podium_bps),
            ("standard_bps", self.bonus.standard_bps),
            ("last_place_bps", self.bonus.last_place_bps),
        ];
        for (field, bps) in rates {
            if bps > MAX_BPS {
                return Err(ConfigError::Invalid(format!(
                    "{} must be at most {}, got {}",
                    field, MAX_BPS, bps
                )));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(limit) = std::env::var("TALLY_TOP_PRODUCTS_LIMIT") {
            match limit.parse::<usize>() {
                Ok(l) => {
                    debug!(limit = l, "Overriding top products limit from environment");
                    self.report.top_products_limit = l;
                }
                Err(_) => warn!(value = %limit, "Invalid TALLY_TOP_PRODUCTS_LIMIT"),
            }
        }

        if let Ok(order) = std::env::var("TALLY_BONUS_TIER_ORDER") {
            match order.parse::<BonusTierOrder>() {
                Ok(parsed) => {
                    debug!(tier_order = %parsed, "Overriding bonus tier order from environment");
                    self.bonus.tier_order = parsed;
                }
                Err(e) => warn!("{}", e),
            }
        }

        let rates: [(&str, &mut u32); 4] = [
            ("TALLY_BONUS_FIRST_PLACE_BPS", &mut self.bonus.first_place_bps),
            ("TALLY_BONUS_PODIUM_BPS", &mut self.bonus.podium_bps),
            ("TALLY_BONUS_STANDARD_BPS", &mut self.bonus.standard_bps),
            ("TALLY_BONUS_LAST_PLACE_BPS", &mut self.bonus.last_place_bps),
        ];
        for (var, slot) in rates {
            if let Ok(value) = std::env::var(var) {
                match value.parse::<u32>() {
                    Ok(bps) => *slot = bps,
                    Err(_) => warn!(var, value = %value, "Ignoring non-numeric bonus rate"),
                }
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "tally")
            .map(|dirs| dirs.config_dir().join("analysis.toml"))
    }

    /// Reads a config file without consulting the environment.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// Tests that touch `TALLY_*` variables hold this for their whole body.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 6] = [
        "TALLY_TOP_PRODUCTS_LIMIT",
        "TALLY_BONUS_TIER_ORDER",
        "TALLY_BONUS_FIRST_PLACE_BPS",
        "TALLY_BONUS_PODIUM_BPS",
        "TALLY_BONUS_STANDARD_BPS",
        "TALLY_BONUS_LAST_PLACE_BPS",
    ];

    /// Locks the environment and starts from a clean slate.
    fn lock_env() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
        guard
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("analysis.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.report.top_products_limit, 10);
        assert_eq!(config.bonus.first_place_bps, 1500);
        assert_eq!(config.bonus.podium_bps, 1000);
        assert_eq!(config.bonus.standard_bps, 500);
        assert_eq!(config.bonus.last_place_bps, 0);
        assert_eq!(config.bonus.tier_order, BonusTierOrder::PodiumFirst);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_takes_defaults() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            [bonus]
            tier_order = "last_place_first"
            standard_bps = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.report.top_products_limit, 10);
        assert_eq!(config.bonus.standard_bps, 250);
        assert_eq!(config.bonus.first_place_bps, 1500);
        assert_eq!(config.bonus.tier_order, BonusTierOrder::LastPlaceFirst);
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = AnalysisConfig::from_toml_str("[report]\ntop_products_limit = \"ten\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_config_validation() {
        let mut config = AnalysisConfig::default();

        config.report.top_products_limit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.report.top_products_limit = 5;
        config.bonus.podium_bps = 10_001;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.bonus.podium_bps = 10_000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("analysis.toml");

        let mut config = AnalysisConfig::default();
        config.report.top_products_limit = 3;
        config.bonus.tier_order = BonusTierOrder::LastPlaceFirst;
        config.save(Some(path.clone())).unwrap();

        let loaded = AnalysisConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_on_invalid_file() {
        let _env = lock_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.toml");
        std::fs::write(&path, "[report]\ntop_products_limit = 0\n").unwrap();

        assert!(AnalysisConfig::from_file(&path).is_err());
        let config = AnalysisConfig::load_or_default(Some(path));
        assert_eq!(config.report.top_products_limit, 10);
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&AnalysisConfig::default()).unwrap();
        assert!(toml_str.contains("[report]"));
        assert!(toml_str.contains("[bonus]"));
        assert!(toml_str.contains("tier_order = \"podium_first\""));
    }

    #[test]
    fn test_env_overrides_file() {
        let _env = lock_env();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[report]\ntop_products_limit = 3\n\n[bonus]\nstandard_bps = 250\n",
        );

        std::env::set_var("TALLY_TOP_PRODUCTS_LIMIT", "7");
        std::env::set_var("TALLY_BONUS_TIER_ORDER", "last_place_first");
        std::env::set_var("TALLY_BONUS_FIRST_PLACE_BPS", "2000");
        std::env::set_var("TALLY_BONUS_LAST_PLACE_BPS", "100");
        let config = AnalysisConfig::load(Some(path)).unwrap();
        for var in ENV_VARS {
            std::env::remove_var(var);
        }

        assert_eq!(config.report.top_products_limit, 7);
        assert_eq!(config.bonus.tier_order, BonusTierOrder::LastPlaceFirst);
        assert_eq!(config.bonus.first_place_bps, 2000);
        assert_eq!(config.bonus.last_place_bps, 100);
        // Untouched by the environment
        assert_eq!(config.bonus.standard_bps, 250);
        assert_eq!(config.bonus.podium_bps, 1000);
    }

    #[test]
    fn test_unparseable_env_values_ignored() {
        let _env = lock_env();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[report]\ntop_products_limit = 4\n");

        std::env::set_var("TALLY_TOP_PRODUCTS_LIMIT", "lots");
        std::env::set_var("TALLY_BONUS_TIER_ORDER", "random");
        std::env::set_var("TALLY_BONUS_PODIUM_BPS", "ten");
        let config = AnalysisConfig::load(Some(path)).unwrap();
        for var in ENV_VARS {
            std::env::remove_var(var);
        }

        assert_eq!(config.report.top_products_limit, 4);
        assert_eq!(config.bonus.tier_order, BonusTierOrder::PodiumFirst);
        assert_eq!(config.bonus.podium_bps, 1000);
    }

    #[test]
    fn test_env_overrides_are_validated() {
        let _env = lock_env();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[report]\ntop_products_limit = 4\n");

        std::env::set_var("TALLY_TOP_PRODUCTS_LIMIT", "0");
        let zero_limit = AnalysisConfig::load(Some(path.clone()));
        std::env::remove_var("TALLY_TOP_PRODUCTS_LIMIT");
        assert!(matches!(zero_limit, Err(ConfigError::Invalid(_))));

        std::env::set_var("TALLY_BONUS_STANDARD_BPS", "10001");
        let too_high = AnalysisConfig::load(Some(path.clone()));
        std::env::remove_var("TALLY_BONUS_STANDARD_BPS");
        assert!(matches!(too_high, Err(ConfigError::Invalid(_))));

        assert_eq!(AnalysisConfig::load(Some(path)).unwrap().report.top_products_limit, 4);
    }

    #[test]
    fn test_env_applies_without_file() {
        let _env = lock_env();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        std::env::set_var("TALLY_BONUS_TIER_ORDER", "last-place-first");
        let config = AnalysisConfig::load(Some(missing)).unwrap();
        std::env::remove_var("TALLY_BONUS_TIER_ORDER");

        assert_eq!(config.report, ReportSettings::default());
        assert_eq!(config.bonus.tier_order, BonusTierOrder::LastPlaceFirst);
    }
}
