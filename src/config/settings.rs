//! Runtime configuration
//!
//! JSON file under the user config dir. Every field has a serde default so a
//! partial or missing file still loads; environment variables override the
//! file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{Level as TraceLevel, info, warn};

use crate::constants::config::{
    APP_DIR, ENV_AUTOSAVE_MS, ENV_LOG_LEVEL, ENV_SETTINGS_DIR, FILENAME, PLUGINS_DIR,
};
use crate::constants::file::SESSION_FILE;
use crate::constants::validation::{DEFAULT_AUTOSAVE_MS, MAX_AUTOSAVE_MS, MIN_AUTOSAVE_MS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Holds the session file, script dirs and plugin data
    #[serde(default = "default_settings_dir")]
    pub settings_dir: PathBuf,

    /// Plugin roots to scan; empty means `<settings_dir>/plugins`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugin_dirs: Vec<PathBuf>,

    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn config_root() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

fn default_settings_dir() -> PathBuf {
    config_root()
}

fn default_autosave_delay_ms() -> u64 {
    DEFAULT_AUTOSAVE_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings_dir: default_settings_dir(),
            plugin_dirs: Vec::new(),
            autosave_delay_ms: default_autosave_delay_ms(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn path() -> PathBuf {
        config_root().join(FILENAME)
    }

    /// Load from the default location and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::path())?;
        config.apply_env_overrides();
        config.validate_and_clamp();
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .context(format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&contents)
            .context(format!("Failed to parse config file {}", path.display()))?;
        config.validate_and_clamp();
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        fs::write(path, contents).context(format!("Failed to write config file to {}", path.display()))?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from `lookup`, ignoring values that do not parse
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_SETTINGS_DIR).filter(|v| !v.trim().is_empty()) {
            self.settings_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_AUTOSAVE_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.autosave_delay_ms = ms,
                Err(_) => warn!(value = %raw, "Ignoring unparsable {ENV_AUTOSAVE_MS}"),
            }
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.log_level = level;
        }
    }

    pub fn validate_and_clamp(&mut self) {
        if self.autosave_delay_ms < MIN_AUTOSAVE_MS {
            warn!(autosave_delay_ms = self.autosave_delay_ms, min = MIN_AUTOSAVE_MS, "autosave_delay_ms below minimum, clamping");
            self.autosave_delay_ms = MIN_AUTOSAVE_MS;
        } else if self.autosave_delay_ms > MAX_AUTOSAVE_MS {
            warn!(autosave_delay_ms = self.autosave_delay_ms, max = MAX_AUTOSAVE_MS, "autosave_delay_ms exceeds maximum, clamping");
            self.autosave_delay_ms = MAX_AUTOSAVE_MS;
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.settings_dir.join(SESSION_FILE)
    }

    pub fn plugin_dirs(&self) -> Vec<PathBuf> {
        if self.plugin_dirs.is_empty() {
            vec![self.settings_dir.join(PLUGINS_DIR)]
        } else {
            self.plugin_dirs.clone()
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn trace_level(&self) -> TraceLevel {
        match self.log_level.to_lowercase().as_str() {
            "trace" => TraceLevel::TRACE,
            "debug" => TraceLevel::DEBUG,
            "warn" => TraceLevel::WARN,
            "error" => TraceLevel::ERROR,
            _ => TraceLevel::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&tmp.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.autosave_delay_ms, DEFAULT_AUTOSAVE_MS);
        assert_eq!(config.trace_level(), TraceLevel::INFO);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{ "settings_dir": "/srv/xset", "autosave_delay_ms": 5 }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.settings_dir, PathBuf::from("/srv/xset"));
        assert_eq!(config.autosave_delay_ms, MIN_AUTOSAVE_MS);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.session_path(), PathBuf::from("/srv/xset/session"));
        assert_eq!(config.plugin_dirs(), vec![PathBuf::from("/srv/xset/plugins")]);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        let config = Config {
            settings_dir: tmp.path().to_path_buf(),
            plugin_dirs: vec![PathBuf::from("/usr/share/xset/plugins")],
            autosave_delay_ms: 2500,
            log_level: "debug".to_string(),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_SETTINGS_DIR, "/tmp/xset-env"),
            (ENV_AUTOSAVE_MS, "999999999"),
            (ENV_LOG_LEVEL, "TRACE"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        config.validate_and_clamp();
        assert_eq!(config.settings_dir, PathBuf::from("/tmp/xset-env"));
        assert_eq!(config.autosave_delay_ms, MAX_AUTOSAVE_MS);
        assert_eq!(config.trace_level(), TraceLevel::TRACE);

        let mut config = Config::default();
        config.apply_overrides(|key| (key == ENV_AUTOSAVE_MS).then(|| "soon".to_string()));
        assert_eq!(config.autosave_delay_ms, DEFAULT_AUTOSAVE_MS);
    }
}
