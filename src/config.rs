use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::core::presets::{Category, Preset, WeightConfig};
use crate::core::selector::SelectionPolicy;
use crate::core::Matcher;
use crate::error::ConfigurationError;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub selection: SelectionPolicy,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Complete category weight override, rescaled to the preset total
    #[serde(default)]
    pub weights: Option<HashMap<String, i64>>,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            weights: None,
        }
    }
}

fn default_preset() -> String { "current".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CARE_MATCH)
    pub fn load() -> Result<Self, ConfigurationError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CARE_MATCH__SCORING__PRESET -> scoring.preset
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Resolve the configured preset and weight override
    pub fn weight_config(&self) -> Result<WeightConfig, ConfigurationError> {
        let preset: Preset = self.scoring.preset.parse()?;
        let overrides = self
            .scoring
            .weights
            .as_ref()
            .map(parse_weight_overrides)
            .transpose()?;
        preset.resolve(overrides.as_ref())
    }

    /// Build a matcher from these settings
    pub fn build_matcher(&self) -> Result<Matcher, ConfigurationError> {
        self.selection.check()?;
        let config = self.weight_config()?;

        tracing::info!(
            preset = ?config.preset,
            total_points = config.total_points,
            weights = ?config.weights,
            "Matcher configured"
        );

        Ok(Matcher::new(config, self.selection))
    }
}

fn environment() -> Environment {
    Environment::with_prefix("CARE_MATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Map free-form category keys onto the fixed category set
pub fn parse_weight_overrides(
    raw: &HashMap<String, i64>,
) -> Result<BTreeMap<Category, i64>, ConfigurationError> {
    let mut weights = BTreeMap::new();
    for (name, weight) in raw {
        let category: Category = name.parse()?;
        if weights.insert(category, *weight).is_some() {
            return Err(ConfigurationError::DuplicateCategory(category));
        }
    }
    Ok(weights)
}
