//! # Service Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TABLEMETER_PRICE_PER_MINUTE=750                                    │
//! │     TABLEMETER_TABLE_COUNT=24                                          │
//! │     TABLEMETER_LOG=debug                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tablemeter/tablemeter.toml (Linux)                       │
//! │     ~/Library/Application Support/com.tablemeter.tablemeter/... (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     5.00 per minute, 10 tables                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [pricing]
//! price_per_minute_cents = 500
//!
//! [floor]
//! table_count = 10
//!
//! [logging]
//! filter = "info,tablemeter=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tablemeter_core::validation::{validate_price_per_minute, validate_table_count};
use tablemeter_core::{PricePerMinute, DEFAULT_PRICE_PER_MINUTE_CENTS, DEFAULT_TABLE_COUNT};
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};

/// Default tracing filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,tablemeter=debug";

const CONFIG_FILE_NAME: &str = "tablemeter.toml";

// =============================================================================
// Sections
// =============================================================================

/// `[pricing]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Charge per whole minute, in cents.
    #[serde(default = "default_price_per_minute")]
    pub price_per_minute_cents: i64,
}

fn default_price_per_minute() -> i64 {
    DEFAULT_PRICE_PER_MINUTE_CENTS
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            price_per_minute_cents: default_price_per_minute(),
        }
    }
}

/// `[floor]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorSettings {
    /// Tables numbered `1..=table_count` are created at startup.
    #[serde(default = "default_table_count")]
    pub table_count: u32,
}

fn default_table_count() -> u32 {
    DEFAULT_TABLE_COUNT
}

impl Default for FloorSettings {
    fn default() -> Self {
        FloorSettings {
            table_count: default_table_count(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive string.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Service Configuration
// =============================================================================

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub floor: FloorSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl ServiceConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`tablemeter.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ServiceResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
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
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections and keys take defaults.
    pub fn from_toml(contents: &str) -> ServiceResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ServiceResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ServiceError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ServiceError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ServiceError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ServiceResult<()> {
        validate_price_per_minute(self.pricing.price_per_minute_cents)
            .map_err(|e| ServiceError::InvalidConfig(e.to_string()))?;
        validate_table_count(self.floor.table_count)
            .map_err(|e| ServiceError::InvalidConfig(e.to_string()))?;
        Ok(())
    }

    /// The configured rate.
    pub fn price_per_minute(&self) -> ServiceResult<PricePerMinute> {
        Ok(PricePerMinute::from_cents(self.pricing.price_per_minute_cents)?)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key/value source. Unparseable values are
    /// logged and ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(price) = lookup("TABLEMETER_PRICE_PER_MINUTE") {
            match price.parse::<i64>() {
                Ok(cents) => {
                    debug!(cents, "Overriding price per minute from environment");
                    self.pricing.price_per_minute_cents = cents;
                }
                Err(_) => warn!(value = %price, "Ignoring invalid TABLEMETER_PRICE_PER_MINUTE"),
            }
        }

        if let Some(count) = lookup("TABLEMETER_TABLE_COUNT") {
            match count.parse::<u32>() {
                Ok(n) => {
                    debug!(tables = n, "Overriding table count from environment");
                    self.floor.table_count = n;
                }
                Err(_) => warn!(value = %count, "Ignoring invalid TABLEMETER_TABLE_COUNT"),
            }
        }

        if let Some(filter) = lookup("TABLEMETER_LOG") {
            self.logging.filter = filter;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tablemeter", "tablemeter")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}
