//! Configuration loading for glosor.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.glosor/config.toml`)
//! 3. User config (`~/.glosor/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The trainer runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{DirectionId, ENGLISH_TO_SWEDISH, SWEDISH_TO_ENGLISH};
use crate::error::{FailOpen, Result, VocabError};

/// Main configuration struct for glosor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Vocabulary database configuration.
    pub store: StoreConfig,
    /// Question selection configuration.
    pub scheduler: SchedulerConfig,
    /// Daily and weekly answer targets.
    pub progress: ProgressConfig,
}

/// Vocabulary database configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. `None` means `<glosor_home>/vocabulary.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// How long a write waits for a locked database, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    /// Resolved database path.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(default_database_path)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Question selection configuration.
///
/// Immutable once a scheduler is built from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Weight multiplier per step of age in the error rate. In (0, 1).
    pub decay_rate: f64,
    /// Upper bound of the staleness boost. In [0, 1).
    pub boost_cap: f64,
    /// Hours after which half of the boost cap is reached.
    pub boost_half_life_hours: f64,
    /// Translation directions to ask.
    pub directions: Vec<DirectionId>,
    /// Parts of speech to ask. Empty means all.
    pub parts_of_speech: Vec<i64>,
    /// Word categories to ask. Empty means all.
    pub word_categories: Vec<i64>,
}

impl SchedulerConfig {
    /// Check if a decay rate is valid (exclusive range 0.0 to 1.0).
    pub fn is_valid_decay_rate(value: f64) -> bool {
        value > 0.0 && value < 1.0
    }

    /// Check if a boost cap keeps seen pairs below the unseen tier.
    pub fn is_valid_boost_cap(value: f64) -> bool {
        (0.0..1.0).contains(&value)
    }

    /// Check if a half-life is a positive, finite number of hours.
    pub fn is_valid_half_life(value: f64) -> bool {
        value.is_finite() && value > 0.0
    }

    /// Reject constants the priority formulas are not defined for.
    pub fn validate(&self) -> Result<()> {
        if !Self::is_valid_decay_rate(self.decay_rate) {
            return Err(VocabError::config(format!(
                "scheduler.decay_rate must be in (0, 1), got {}",
                self.decay_rate
            )));
        }
        if !Self::is_valid_boost_cap(self.boost_cap) {
            return Err(VocabError::config(format!(
                "scheduler.boost_cap must be in [0, 1), got {}",
                self.boost_cap
            )));
        }
        if !Self::is_valid_half_life(self.boost_half_life_hours) {
            return Err(VocabError::config(format!(
                "scheduler.boost_half_life_hours must be positive, got {}",
                self.boost_half_life_hours
            )));
        }
        if self.directions.is_empty() {
            return Err(VocabError::config(
                "scheduler.directions must name at least one direction",
            ));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            decay_rate: 0.7,
            boost_cap: 0.5,
            boost_half_life_hours: 72.0,
            directions: vec![ENGLISH_TO_SWEDISH, SWEDISH_TO_ENGLISH],
            parts_of_speech: Vec::new(),
            word_categories: Vec::new(),
        }
    }
}

/// Daily and weekly answer targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProgressConfig {
    pub daily_target: u32,
    pub weekly_target: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            daily_target: 80,
            weekly_target: 560,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.glosor/config.toml` in cwd)
    /// 3. User config (`~/.glosor/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        // Layer 4 → 3: Apply user config
        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        // Layer 3 → 2: Apply project config
        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        // Layer 2 → 1: Apply environment variables
        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.glosor/config.toml`.
    fn load_user_config() -> Option<Config> {
        let path = glosor_home()?.join("config.toml");
        Self::load_layer(&path)
    }

    /// Load project config from `.glosor/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let path = project_config_path(cwd);
        Self::load_layer(&path)
    }

    /// Load one optional layer. A missing file is silently skipped; a broken
    /// one is logged and skipped.
    fn load_layer(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        Self::load_from_file(path)
            .map(Some)
            .fail_open_with(&format!("loading config {}", path.display()), None)
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| VocabError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| VocabError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    ///
    /// Invalid values are logged and ignored.
    fn apply_env_overrides(&mut self) {
        // GLOSOR_DB
        if let Ok(val) = env::var("GLOSOR_DB") {
            if val.is_empty() {
                tracing::warn!("GLOSOR_DB is empty, ignoring");
            } else {
                self.store.path = Some(PathBuf::from(val));
            }
        }

        // GLOSOR_DECAY_RATE
        if let Some(n) = parse_env::<f64>("GLOSOR_DECAY_RATE", "a decimal number") {
            if SchedulerConfig::is_valid_decay_rate(n) {
                self.scheduler.decay_rate = n;
            } else {
                tracing::warn!(
                    "Invalid GLOSOR_DECAY_RATE value '{}'. Must be in range (0.0, 1.0). Using '{}'.",
                    n,
                    self.scheduler.decay_rate
                );
            }
        }

        // GLOSOR_BOOST_CAP
        if let Some(n) = parse_env::<f64>("GLOSOR_BOOST_CAP", "a decimal number") {
            if SchedulerConfig::is_valid_boost_cap(n) {
                self.scheduler.boost_cap = n;
            } else {
                tracing::warn!(
                    "Invalid GLOSOR_BOOST_CAP value '{}'. Must be in range [0.0, 1.0). Using '{}'.",
                    n,
                    self.scheduler.boost_cap
                );
            }
        }

        // GLOSOR_BOOST_HALF_LIFE_HOURS
        if let Some(n) = parse_env::<f64>("GLOSOR_BOOST_HALF_LIFE_HOURS", "a decimal number") {
            if SchedulerConfig::is_valid_half_life(n) {
                self.scheduler.boost_half_life_hours = n;
            } else {
                tracing::warn!(
                    "Invalid GLOSOR_BOOST_HALF_LIFE_HOURS value '{}'. Must be positive. Using '{}'.",
                    n,
                    self.scheduler.boost_half_life_hours
                );
            }
        }

        // GLOSOR_DIRECTIONS
        if let Ok(val) = env::var("GLOSOR_DIRECTIONS") {
            match parse_id_list(&val) {
                Some(ids) if !ids.is_empty() => {
                    self.scheduler.directions = ids.into_iter().map(DirectionId).collect();
                }
                _ => tracing::warn!(
                    "Invalid GLOSOR_DIRECTIONS value '{}'. \
                    Expected a comma-separated list of direction ids. Using {:?}.",
                    val,
                    self.scheduler.directions
                ),
            }
        }

        // GLOSOR_DAILY_TARGET
        if let Some(n) = parse_env::<u32>("GLOSOR_DAILY_TARGET", "a positive integer") {
            self.progress.daily_target = n;
        }

        // GLOSOR_WEEKLY_TARGET
        if let Some(n) = parse_env::<u32>("GLOSOR_WEEKLY_TARGET", "a positive integer") {
            self.progress.weekly_target = n;
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence. Every field of `other` that
    /// differs from the default is applied to `self`, so an explicit default
    /// in one layer does not block an override from another.
    ///
    /// A layer cannot set a value back to its default to undo a lower layer.
    fn merge(mut self, other: Config) -> Self {
        // Store
        let default_store = StoreConfig::default();
        if other.store.path.is_some() {
            self.store.path = other.store.path;
        }
        if other.store.busy_timeout_ms != default_store.busy_timeout_ms {
            self.store.busy_timeout_ms = other.store.busy_timeout_ms;
        }

        // Scheduler: merge field by field
        let default_scheduler = SchedulerConfig::default();
        if other.scheduler.decay_rate != default_scheduler.decay_rate {
            self.scheduler.decay_rate = other.scheduler.decay_rate;
        }
        if other.scheduler.boost_cap != default_scheduler.boost_cap {
            self.scheduler.boost_cap = other.scheduler.boost_cap;
        }
        if other.scheduler.boost_half_life_hours != default_scheduler.boost_half_life_hours {
            self.scheduler.boost_half_life_hours = other.scheduler.boost_half_life_hours;
        }
        if other.scheduler.directions != default_scheduler.directions {
            self.scheduler.directions = other.scheduler.directions;
        }
        if !other.scheduler.parts_of_speech.is_empty() {
            self.scheduler.parts_of_speech = other.scheduler.parts_of_speech;
        }
        if !other.scheduler.word_categories.is_empty() {
            self.scheduler.word_categories = other.scheduler.word_categories;
        }

        // Progress
        let default_progress = ProgressConfig::default();
        if other.progress.daily_target != default_progress.daily_target {
            self.progress.daily_target = other.progress.daily_target;
        }
        if other.progress.weekly_target != default_progress.weekly_target {
            self.progress.weekly_target = other.progress.weekly_target;
        }

        self
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, expected: &str) -> Option<T> {
    let val = env::var(name).ok()?;
    match val.trim().parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(
                "Invalid {} value '{}'. Expected {}. Ignoring.",
                name,
                val,
                expected
            );
            None
        }
    }
}

fn parse_id_list(value: &str) -> Option<Vec<i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().ok())
        .collect()
}

/// Get the glosor home directory.
///
/// Checks `GLOSOR_HOME` first, then falls back to `~/.glosor`. An empty
/// `GLOSOR_HOME` is ignored.
pub fn glosor_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("GLOSOR_HOME") {
        if home.is_empty() {
            tracing::warn!("GLOSOR_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("GLOSOR_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    dirs::home_dir().map(|home| home.join(".glosor"))
}

/// Default database path: `<glosor_home>/vocabulary.db`.
pub fn default_database_path() -> Option<PathBuf> {
    glosor_home().map(|h| h.join("vocabulary.db"))
}

/// Project config path: `<cwd>/.glosor/config.toml`.
pub fn project_config_path(cwd: &Path) -> PathBuf {
    cwd.join(".glosor").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const ENV_VARS: &[&str] = &[
        "GLOSOR_HOME",
        "GLOSOR_DB",
        "GLOSOR_DECAY_RATE",
        "GLOSOR_BOOST_CAP",
        "GLOSOR_BOOST_HALF_LIFE_HOURS",
        "GLOSOR_DIRECTIONS",
        "GLOSOR_DAILY_TARGET",
        "GLOSOR_WEEKLY_TARGET",
    ];

    /// Point the user layer at an empty home and clear overrides.
    fn isolate_env() -> TempDir {
        for var in ENV_VARS {
            env::remove_var(var);
        }
        let home = TempDir::new().unwrap();
        env::set_var("GLOSOR_HOME", home.path());
        home
    }

    fn write_project_config(dir: &Path, content: &str) {
        let path = project_config_path(dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.store.path.is_none());
        assert_eq!(config.store.busy_timeout_ms, 5_000);
        assert!((config.scheduler.decay_rate - 0.7).abs() < f64::EPSILON);
        assert!((config.scheduler.boost_cap - 0.5).abs() < f64::EPSILON);
        assert!((config.scheduler.boost_half_life_hours - 72.0).abs() < f64::EPSILON);
        assert_eq!(
            config.scheduler.directions,
            vec![ENGLISH_TO_SWEDISH, SWEDISH_TO_ENGLISH]
        );
        assert!(config.scheduler.parts_of_speech.is_empty());
        assert_eq!(config.progress.daily_target, 80);
        assert_eq!(config.progress.weekly_target, 560);
        assert!(config.scheduler.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[scheduler]
decay_rate = 0.5
directions = [2]

[progress]
daily_target = 20
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();

        assert!((config.scheduler.decay_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.scheduler.directions, vec![SWEDISH_TO_ENGLISH]);
        assert_eq!(config.progress.daily_target, 20);
        assert_eq!(config.progress.weekly_target, 560);
        assert_eq!(config.store.busy_timeout_ms, 5_000);
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        assert!(matches!(
            Config::load_from_file(&config_path),
            Err(VocabError::Config { .. })
        ));
    }

    #[test]
    fn test_load_from_file_missing() {
        let result = Config::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(VocabError::Storage { .. })));
    }

    #[test]
    #[serial]
    fn test_project_config_overrides_user_config() {
        let home = isolate_env();
        fs::write(
            home.path().join("config.toml"),
            "[scheduler]\nboost_cap = 0.3\ndecay_rate = 0.6\n",
        )
        .unwrap();

        let project = TempDir::new().unwrap();
        write_project_config(project.path(), "[scheduler]\ndecay_rate = 0.8\n");

        let config = Config::load_from_cwd(project.path());

        assert!((config.scheduler.decay_rate - 0.8).abs() < f64::EPSILON);
        assert!((config.scheduler.boost_cap - 0.3).abs() < f64::EPSILON);

        env::remove_var("GLOSOR_HOME");
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        let _home = isolate_env();
        let project = TempDir::new().unwrap();
        write_project_config(project.path(), "[progress]\ndaily_target = 10\n");

        env::set_var("GLOSOR_DAILY_TARGET", "42");
        let config = Config::load_from_cwd(project.path());
        assert_eq!(config.progress.daily_target, 42);

        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        let _home = isolate_env();
        env::set_var("GLOSOR_DB", "/tmp/words.db");
        env::set_var("GLOSOR_DECAY_RATE", "0.9");
        env::set_var("GLOSOR_BOOST_CAP", "0.25");
        env::set_var("GLOSOR_BOOST_HALF_LIFE_HOURS", "24");
        env::set_var("GLOSOR_DIRECTIONS", "2");
        env::set_var("GLOSOR_WEEKLY_TARGET", "100");

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.store.path, Some(PathBuf::from("/tmp/words.db")));
        assert!((config.scheduler.decay_rate - 0.9).abs() < f64::EPSILON);
        assert!((config.scheduler.boost_cap - 0.25).abs() < f64::EPSILON);
        assert!((config.scheduler.boost_half_life_hours - 24.0).abs() < f64::EPSILON);
        assert_eq!(config.scheduler.directions, vec![SWEDISH_TO_ENGLISH]);
        assert_eq!(config.progress.weekly_target, 100);

        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_env_var_invalid_values_ignored() {
        let _home = isolate_env();
        env::set_var("GLOSOR_DECAY_RATE", "1.5");
        env::set_var("GLOSOR_BOOST_CAP", "lots");
        env::set_var("GLOSOR_DIRECTIONS", "1,x");
        env::set_var("GLOSOR_DAILY_TARGET", "-3");

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.scheduler, SchedulerConfig::default());
        assert_eq!(config.progress.daily_target, 80);

        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_broken_project_config_is_skipped() {
        let _home = isolate_env();
        let project = TempDir::new().unwrap();
        write_project_config(project.path(), "[scheduler\ndecay_rate = ");

        let config = Config::load_from_cwd(project.path());
        assert_eq!(config, Config::default());

        env::remove_var("GLOSOR_HOME");
    }

    #[test]
    fn test_merge_field_by_field() {
        let mut user = Config::default();
        user.scheduler.boost_cap = 0.2;
        user.store.busy_timeout_ms = 1_000;

        let mut project = Config::default();
        project.scheduler.decay_rate = 0.4;
        project.scheduler.parts_of_speech = vec![3];

        let merged = Config::default().merge(user).merge(project);

        assert!((merged.scheduler.boost_cap - 0.2).abs() < f64::EPSILON);
        assert!((merged.scheduler.decay_rate - 0.4).abs() < f64::EPSILON);
        assert_eq!(merged.scheduler.parts_of_speech, vec![3]);
        assert_eq!(merged.store.busy_timeout_ms, 1_000);
    }

    #[test]
    fn test_validate_rejects_out_of_range_constants() {
        let valid = SchedulerConfig::default();

        let mut config = valid.clone();
        config.decay_rate = 1.0;
        assert!(config.validate().is_err());

        let mut config = valid.clone();
        config.decay_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = valid.clone();
        config.boost_cap = 1.0;
        assert!(config.validate().is_err());

        let mut config = valid.clone();
        config.boost_half_life_hours = 0.0;
        assert!(config.validate().is_err());

        let mut config = valid;
        config.directions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_glosor_home_with_env() {
        let dir = TempDir::new().unwrap();
        env::set_var("GLOSOR_HOME", dir.path());

        assert_eq!(glosor_home(), Some(dir.path().to_path_buf()));
        assert_eq!(
            default_database_path(),
            Some(dir.path().join("vocabulary.db"))
        );

        env::remove_var("GLOSOR_HOME");
    }

    #[test]
    #[serial]
    fn test_glosor_home_empty_env() {
        env::set_var("GLOSOR_HOME", "");
        let home = glosor_home();
        if let Some(path) = home {
            assert!(path.ends_with(".glosor"));
        }
        env::remove_var("GLOSOR_HOME");
    }

    #[test]
    fn test_store_path_prefers_explicit_value() {
        let config = StoreConfig {
            path: Some(PathBuf::from("/data/glosor.db")),
            ..Default::default()
        };
        assert_eq!(
            config.database_path(),
            Some(PathBuf::from("/data/glosor.db"))
        );
        assert_eq!(config.busy_timeout(), Duration::from_millis(5_000));
    }
}
