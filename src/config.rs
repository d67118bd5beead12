use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use jsonschema::{JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_window_capacity() -> usize {
    10
}

/// Bounded per-device history. The default capacity matches the window the
/// backing smoke scorer was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_capacity")]
    pub capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            capacity: default_window_capacity(),
        }
    }
}

fn default_fire_co() -> f64 {
    300.0
}

fn default_smoke_co() -> f64 {
    100.0
}

fn default_cooking_co2() -> f64 {
    800.0
}

fn default_clean_co() -> f64 {
    10.0
}

fn default_clean_co2() -> f64 {
    600.0
}

fn default_score_epsilon() -> f64 {
    0.05
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// CO at or above this level classifies as fire.
    #[serde(default = "default_fire_co")]
    pub fire_co: f64,
    /// CO at or above this level (below `fire_co`) classifies as smoke.
    #[serde(default = "default_smoke_co")]
    pub smoke_co: f64,
    /// Elevated CO2 with low CO classifies as cooking.
    #[serde(default = "default_cooking_co2")]
    pub cooking_co2: f64,
    #[serde(default = "default_clean_co")]
    pub clean_co: f64,
    #[serde(default = "default_clean_co2")]
    pub clean_co2: f64,
    /// Candidate scores closer than this resolve to the higher-severity label.
    #[serde(default = "default_score_epsilon")]
    pub score_epsilon: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            fire_co: default_fire_co(),
            smoke_co: default_smoke_co(),
            cooking_co2: default_cooking_co2(),
            clean_co: default_clean_co(),
            clean_co2: default_clean_co2(),
            score_epsilon: default_score_epsilon(),
        }
    }
}

fn default_probability_weight() -> f64 {
    0.55
}

fn default_label_weight() -> f64 {
    0.45
}

fn default_low_threshold() -> f64 {
    0.3
}

fn default_medium_threshold() -> f64 {
    0.5
}

fn default_high_threshold() -> f64 {
    0.75
}

fn default_min_dwell_ms() -> u64 {
    30_000
}

fn default_fire_override_confidence() -> f64 {
    0.8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_probability_weight")]
    pub probability_weight: f64,
    #[serde(default = "default_label_weight")]
    pub label_weight: f64,
    /// Severity at or above which the target state is LOW.
    #[serde(default = "default_low_threshold")]
    pub low_threshold: f64,
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: f64,
    #[serde(default = "default_high_threshold")]
    pub high_threshold: f64,
    /// Minimum time a state must persist before a non-forced transition,
    /// measured on reading timestamps.
    #[serde(default = "default_min_dwell_ms")]
    pub min_dwell_ms: u64,
    /// Fire-label confidence at or above which HIGH is forced immediately,
    /// bypassing dwell and the one-step rule.
    #[serde(default = "default_fire_override_confidence")]
    pub fire_override_confidence: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            probability_weight: default_probability_weight(),
            label_weight: default_label_weight(),
            low_threshold: default_low_threshold(),
            medium_threshold: default_medium_threshold(),
            high_threshold: default_high_threshold(),
            min_dwell_ms: default_min_dwell_ms(),
            fire_override_confidence: default_fire_override_confidence(),
        }
    }
}

fn default_max_append_attempts() -> u32 {
    3
}

fn default_writer_identity() -> String {
    "aerolog-core".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Bounded retry budget for one append; the same dedupe key is reused on
    /// every attempt so an ambiguous failure cannot double-record.
    #[serde(default = "default_max_append_attempts")]
    pub max_append_attempts: u32,
    #[serde(default = "default_writer_identity")]
    pub writer_identity: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_append_attempts: default_max_append_attempts(),
            writer_identity: default_writer_identity(),
        }
    }
}

fn default_logging_dir() -> PathBuf {
    PathBuf::from("./logs/aerolog")
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_logging_rotation() -> LoggingRotation {
    LoggingRotation::Daily
}

fn default_enabled_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoggingRotation {
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    #[serde(default = "default_logging_rotation")]
    pub rotation: LoggingRotation,
    #[serde(default = "default_enabled_true")]
    pub stderr_warn_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logging_dir(),
            filter: default_logging_filter(),
            rotation: default_logging_rotation(),
            stderr_warn_enabled: true,
        }
    }
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config_value: Value = json5::from_str(&config_content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let config_base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let schema_path = resolve_schema_path(config_base, &config_value)?;
        validate_against_schema(&config_value, &schema_path)?;

        let mut config: Config =
            serde_json::from_value(config_value).context("failed to deserialize aerolog config")?;

        if !config.logging.dir.is_absolute() {
            config.logging.dir = config_base.join(&config.logging.dir);
        }
        config.validate()?;

        Ok(config)
    }

    /// Range checks the schema cannot express across fields.
    pub fn validate(&self) -> Result<()> {
        if self.window.capacity == 0 {
            return Err(anyhow!("window.capacity must be at least 1"));
        }
        if self.ledger.max_append_attempts == 0 {
            return Err(anyhow!("ledger.max_append_attempts must be at least 1"));
        }
        if self.policy.low_threshold > self.policy.medium_threshold
            || self.policy.medium_threshold > self.policy.high_threshold
        {
            return Err(anyhow!(
                "policy thresholds must be ordered low <= medium <= high"
            ));
        }
        Ok(())
    }
}

fn resolve_schema_path(config_base: &Path, config_value: &Value) -> Result<PathBuf> {
    if let Some(path_text) = config_value.get("$schema").and_then(|value| value.as_str()) {
        let configured = PathBuf::from(path_text);
        if configured.is_absolute() {
            return Ok(configured);
        }
        return Ok(config_base.join(&configured));
    }

    let local_default = config_base.join("aerolog.schema.json");
    if local_default.exists() {
        return Ok(local_default);
    }

    Err(anyhow!(
        "unable to resolve schema path: expected $schema in config or aerolog.schema.json beside it"
    ))
}

fn validate_against_schema(config_value: &Value, schema_path: &Path) -> Result<()> {
    let schema_content = fs::read_to_string(schema_path)
        .with_context(|| format!("failed to read schema {}", schema_path.display()))?;
    let schema: Value = serde_json::from_str(&schema_content)
        .with_context(|| format!("failed to parse schema {}", schema_path.display()))?;

    let compiled =
        JSONSchema::compile(&schema).map_err(|e| anyhow!("failed to compile schema: {e}"))?;

    match compiled.validate(config_value) {
        Ok(()) => Ok(()),
        Err(errors_iter) => {
            let validation_errors: Vec<ValidationError> = errors_iter.collect();
            let messages: Vec<String> = validation_errors
                .into_iter()
                .map(|error| error.to_string())
                .collect();
            Err(anyhow!("config validation failed: {}", messages.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use uuid::Uuid;

    use super::{Config, LoggingRotation};

    #[test]
    fn defaults_match_contract() {
        let config = Config::default();
        assert_eq!(config.window.capacity, 10);
        assert_eq!(config.ledger.max_append_attempts, 3);
        assert_eq!(config.policy.min_dwell_ms, 30_000);
        assert_eq!(config.logging.rotation, LoggingRotation::Daily);
        config.validate().expect("default config should validate");
    }

    #[test]
    fn rotation_hourly_is_deserialized() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            logging: super::LoggingConfig,
        }

        let parsed: Wrapper = serde_json::from_value(serde_json::json!({
            "logging": { "rotation": "hourly" }
        }))
        .expect("wrapper should deserialize");
        assert_eq!(parsed.logging.rotation, LoggingRotation::Hourly);
    }

    #[test]
    fn load_rejects_zero_window_capacity() {
        let work_dir = std::env::temp_dir().join(format!("aerolog-config-test-{}", Uuid::now_v7()));
        fs::create_dir_all(&work_dir).expect("temp work dir should be created");

        let config_path = work_dir.join("aerolog.jsonc");
        let schema_path =
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("aerolog.schema.json");
        let config_text = format!(
            r#"{{
  "$schema": "{}",
  "window": {{ "capacity": 0 }}
}}"#,
            schema_path.display(),
        );
        fs::write(&config_path, config_text).expect("config should be written");

        let err = Config::load(&config_path).expect_err("capacity=0 should fail schema");
        assert!(
            err.to_string().contains("minimum") || err.to_string().contains("at least"),
            "unexpected error: {err}",
        );

        let _ = fs::remove_file(&config_path);
        let _ = fs::remove_dir(&work_dir);
    }
}
