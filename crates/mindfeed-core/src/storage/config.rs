//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - The active mode and the selected interests
//! - Feed batch sizes, load latencies and the image provider
//! - Thresholds and break length for each pacing policy
//!
//! Configuration is stored at `~/.config/mindfeed/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};
use crate::feed::{InterestSet, LoaderConfig, DEFAULT_PROVIDER};
use crate::pacing::{Mode, ModePolicy};

/// Feed generation and loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(flatten)]
    pub loader: LoaderConfig,
    /// How often front ends should call `tick()`.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Use a random interest set in unrestricted mode instead of the
    /// user's selection.
    #[serde(default = "default_true")]
    pub random_unrestricted_interests: bool,
}

/// One pacing policy. Absent thresholds are unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub item_count_threshold: Option<u64>,
    #[serde(default)]
    pub time_threshold_secs: Option<u64>,
    #[serde(default = "default_break_duration_secs")]
    pub break_duration_secs: u64,
}

impl PolicyConfig {
    fn mindful() -> Self {
        Self::from_policy(&ModePolicy::mindful())
    }

    fn unrestricted() -> Self {
        Self::from_policy(&ModePolicy::unrestricted())
    }

    fn from_policy(policy: &ModePolicy) -> Self {
        Self {
            item_count_threshold: policy.item_count_threshold,
            time_threshold_secs: policy.time_threshold_ms.map(|ms| ms / 1000),
            break_duration_secs: policy.break_duration_ms / 1000,
        }
    }

    pub fn to_policy(&self) -> ModePolicy {
        ModePolicy {
            item_count_threshold: self.item_count_threshold,
            time_threshold_ms: self.time_threshold_secs.map(|s| s.saturating_mul(1000)),
            break_duration_ms: self.break_duration_secs.saturating_mul(1000),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/mindfeed/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mode: Mode,
    /// Selected topics, in display order.
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default = "PolicyConfig::mindful")]
    pub mindful: PolicyConfig,
    #[serde(default = "PolicyConfig::unrestricted")]
    pub unrestricted: PolicyConfig,
}

// Default functions
fn default_provider() -> String {
    DEFAULT_PROVIDER.into()
}
fn default_tick_interval_ms() -> u64 {
    500
}
fn default_true() -> bool {
    true
}
fn default_break_duration_secs() -> u64 {
    90
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            loader: LoaderConfig::default(),
            tick_interval_ms: default_tick_interval_ms(),
            random_unrestricted_interests: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            interests: Vec::new(),
            feed: FeedConfig::default(),
            mindful: PolicyConfig::mindful(),
            unrestricted: PolicyConfig::unrestricted(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    // Optional thresholds: "none" clears, a number sets.
                    serde_json::Value::Number(_) | serde_json::Value::Null => {
                        match value.trim().to_ascii_lowercase().as_str() {
                            "none" | "null" | "unbounded" => serde_json::Value::Null,
                            trimmed => trimmed
                                .parse::<u64>()
                                .map(|n| serde_json::Value::Number(n.into()))
                                .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                CoreError::Config(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// into the field's type.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.policy(Mode::Mindful)?;
        updated.policy(Mode::Unrestricted)?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Validated pacing policy for `mode`.
    pub fn policy(&self, mode: Mode) -> Result<ModePolicy> {
        let policy = match mode {
            Mode::Mindful => self.mindful.to_policy(),
            Mode::Unrestricted => self.unrestricted.to_policy(),
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn interest_set(&self) -> InterestSet {
        InterestSet::new(self.interests.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.mode, Mode::Mindful);
        assert_eq!(parsed.feed.loader.initial_batch_size, 20);
        assert_eq!(parsed.mindful, cfg.mindful);
        assert_eq!(parsed.unrestricted.time_threshold_secs, None);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            mode = "unrestricted"
            interests = ["food"]

            [feed]
            append_batch_size = 5
            "#,
        )
        .unwrap();
        assert_eq!(parsed.mode, Mode::Unrestricted);
        assert_eq!(parsed.feed.loader.append_batch_size, 5);
        assert_eq!(parsed.feed.loader.initial_delay_ms, 400);
        assert_eq!(parsed.feed.provider, "https://static.photos");
        assert_eq!(parsed.mindful.time_threshold_secs, Some(300));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("mode").as_deref(), Some("mindful"));
        assert_eq!(cfg.get("feed.append_batch_size").as_deref(), Some("10"));
        assert_eq!(cfg.get("mindful.break_duration_secs").as_deref(), Some("90"));
        assert_eq!(cfg.get("mindful.item_count_threshold").as_deref(), Some("null"));
        assert!(cfg.get("feed.missing_key").is_none());
    }

    #[test]
    fn set_value_updates_nested_fields() {
        let mut cfg = Config::default();
        cfg.set_value("feed.append_batch_size", "25").unwrap();
        cfg.set_value("mindful.item_count_threshold", "100").unwrap();
        cfg.set_value("feed.random_unrestricted_interests", "false").unwrap();
        cfg.set_value("mode", "unrestricted").unwrap();
        cfg.set_value("interests", r#"["nature","office"]"#).unwrap();

        assert_eq!(cfg.feed.loader.append_batch_size, 25);
        assert_eq!(cfg.mindful.item_count_threshold, Some(100));
        assert!(!cfg.feed.random_unrestricted_interests);
        assert_eq!(cfg.mode, Mode::Unrestricted);
        assert_eq!(cfg.interests, ["nature", "office"]);

        cfg.set_value("mindful.time_threshold_secs", "none").unwrap();
        assert_eq!(cfg.mindful.time_threshold_secs, None);
    }

    #[test]
    fn set_value_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.set_value("feed.nonexistent_key", "1").is_err());
        assert!(cfg.set_value("", "1").is_err());
    }

    #[test]
    fn set_value_rejects_invalid_values() {
        let mut cfg = Config::default();
        assert!(cfg.set_value("feed.random_unrestricted_interests", "maybe").is_err());
        assert!(cfg.set_value("feed.append_batch_size", "lots").is_err());
        assert!(cfg.set_value("mode", "sideways").is_err());
        // Zero break duration fails policy validation.
        assert!(cfg.set_value("mindful.break_duration_secs", "0").is_err());
        assert_eq!(cfg.mindful.break_duration_secs, 90);
    }

    #[test]
    fn policy_conversion() {
        let cfg = Config::default();
        assert_eq!(cfg.policy(Mode::Mindful).unwrap(), ModePolicy::mindful());
        assert_eq!(cfg.policy(Mode::Unrestricted).unwrap(), ModePolicy::unrestricted());
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.feed.tick_interval_ms, 500);

        let mut cfg = cfg;
        cfg.interests = vec!["science".into()];
        cfg.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.interest_set(), InterestSet::new(["science"]));
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "mode = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
