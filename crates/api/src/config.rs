//! Service configuration

use anyhow::{bail, Context};
use feature_engine::{AliasTable, FeatureBuilder, ValidationConfig, Validator};
use inference_engine::ModelConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::rate_limit::RateLimitConfig;

/// Default configuration file, overridable with `VALUATOR_CONFIG`
pub const DEFAULT_CONFIG_PATH: &str = "valuator.toml";

/// Prefix for environment overrides, e.g. `VALUATOR_BIND_ADDR`
pub const ENV_PREFIX: &str = "VALUATOR";

/// Feature naming configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Accept the naming variants of known model artifacts (`soft`, `property_type_Bunglow`, ...)
    pub known_variants: bool,
    /// Extra aliases: schema name -> canonical feature name
    pub aliases: HashMap<String, String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            known_variants: true,
            aliases: HashMap::new(),
        }
    }
}

impl FeatureConfig {
    /// Build the alias table this configuration describes
    pub fn alias_table(&self) -> anyhow::Result<AliasTable> {
        let mut table = if self.known_variants {
            AliasTable::with_known_variants()
        } else {
            AliasTable::canonical()
        };
        for (alias, target) in &self.aliases {
            table
                .insert(alias.clone(), target)
                .with_context(|| format!("invalid alias '{alias}'"))?;
        }
        Ok(table)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listen address
    pub bind_addr: String,
    /// Maximum log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Serve Prometheus metrics on `/metrics`
    pub metrics_enabled: bool,
    pub model: ModelConfig,
    pub features: FeatureConfig,
    /// Range checks; replaced by `validation_preset` when that is set
    pub validation: ValidationConfig,
    /// Named range preset (`default` or `strict`)
    pub validation_preset: Option<String>,
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            metrics_enabled: true,
            model: ModelConfig::default(),
            features: FeatureConfig::default(),
            validation: ValidationConfig::default(),
            validation_preset: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the default file location and the environment
    pub fn load() -> anyhow::Result<Self> {
        let path =
            std::env::var("VALUATOR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from `path` (optional) layered under environment overrides
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {path}"))?;

        settings
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Effective range checks after applying the preset.
    ///
    /// The age policy always comes from `validation`.
    pub fn validation_config(&self) -> anyhow::Result<ValidationConfig> {
        match &self.validation_preset {
            None => Ok(self.validation.clone()),
            Some(name) => match ValidationConfig::preset(name) {
                Some(preset) => Ok(ValidationConfig {
                    allow_negative_age: self.validation.allow_negative_age,
                    ..preset
                }),
                None => bail!("unknown validation preset '{name}'"),
            },
        }
    }

    /// Feature builder described by this configuration
    pub fn feature_builder(&self) -> anyhow::Result<FeatureBuilder> {
        let validation = self.validation_config()?;
        info!(
            "Validation: preset={}, allow_negative_age={}",
            self.validation_preset.as_deref().unwrap_or("custom"),
            validation.allow_negative_age
        );
        Ok(FeatureBuilder::new(
            Validator::new(validation),
            self.features.alias_table()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment overrides are process-wide
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn temp_config(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "valuator-config-{}-{}.toml",
            std::process::id(),
            contents.len()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = AppConfig::load_from("does/not/exist.toml").unwrap();
        assert_eq!(config.model, ModelConfig::default());
        assert!(config.features.known_variants);
        assert!(config.validation.allow_negative_age);
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_config(
            r#"
log_level = "debug"
validation_preset = "strict"

[model]
path = "models/other.json"

[features]
known_variants = false

[features.aliases]
living_area = "square_footage"

[validation]
allow_negative_age = false
"#,
        );
        let config = {
            let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            AppConfig::load_from(path.to_str().unwrap()).unwrap()
        };
        std::fs::remove_file(&path).ok();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.model.path, "models/other.json");
        assert!(!config.features.known_variants);
        assert_eq!(
            config.features.aliases.get("living_area").map(String::as_str),
            Some("square_footage")
        );

        let validation = config.validation_config().unwrap();
        assert_eq!(validation.square_footage_range, (500.0, 10_000.0));
        assert!(!validation.allow_negative_age);

        let table = config.features.alias_table().unwrap();
        assert!(table.resolve("living_area").is_some());
        assert!(table.resolve("soft").is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("VALUATOR_BIND_ADDR", "127.0.0.1:9999");
        std::env::set_var("VALUATOR_MODEL__PATH", "single.json");
        let result = AppConfig::load_from("does/not/exist.toml");
        std::env::remove_var("VALUATOR_BIND_ADDR");
        std::env::remove_var("VALUATOR_MODEL__PATH");

        let config = result.unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9999");
        assert_eq!(config.model.path, "single.json");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_unknown_preset() {
        let config = AppConfig {
            validation_preset: Some("lenient".to_string()),
            ..Default::default()
        };
        assert!(config.validation_config().is_err());
    }

    #[test]
    fn test_bad_alias_target() {
        let mut features = FeatureConfig::default();
        features
            .aliases
            .insert("garage".to_string(), "garage_spaces".to_string());
        assert!(features.alias_table().is_err());
    }
}
