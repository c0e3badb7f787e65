//! Exporter configuration.
//!
//! Configuration is loaded once at startup from the JSON file named by the
//! `CONFIG_FILE_PATH` environment variable and is immutable afterwards;
//! there is no hot-reload. Recognized keys:
//!
//! ```json
//! {
//!   "sampling_interval": 5,
//!   "metrics": ["cpu", "memory", "disk"]
//! }
//! ```
//!
//! When the `metrics` array is absent, the default enablement applies
//! (memory only). When it is present it fully determines which families
//! are enabled; unrecognized names are ignored with a warning.

use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Environment variable naming the configuration file.
pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE_PATH";

/// Error type for configuration loading failures. All of these are fatal
/// at startup.
#[derive(Debug)]
pub enum ConfigError {
    /// The `CONFIG_FILE_PATH` environment variable is not set.
    EnvMissing,
    /// The configuration file could not be read.
    Io(std::io::Error),
    /// The configuration file is not valid JSON.
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvMissing => {
                write!(f, "environment variable {} is not set", CONFIG_FILE_ENV)
            }
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// Enablement flags for the ten metric families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricToggles {
    pub cpu: bool,
    pub memory: bool,
    pub battery: bool,
    pub avg_load: bool,
    pub cpu_temp: bool,
    pub cpu_speed: bool,
    pub processes: bool,
    pub sys_calls: bool,
    pub disk: bool,
    pub network: bool,
}

impl Default for MetricToggles {
    /// Default enablement when no `metrics` array is configured:
    /// memory only.
    fn default() -> Self {
        Self {
            cpu: false,
            memory: true,
            battery: false,
            avg_load: false,
            cpu_temp: false,
            cpu_speed: false,
            processes: false,
            sys_calls: false,
            disk: false,
            network: false,
        }
    }
}

impl MetricToggles {
    /// All families disabled; the starting point when an explicit
    /// `metrics` array is present.
    pub fn none() -> Self {
        Self {
            cpu: false,
            memory: false,
            battery: false,
            avg_load: false,
            cpu_temp: false,
            cpu_speed: false,
            processes: false,
            sys_calls: false,
            disk: false,
            network: false,
        }
    }

    /// Enables the family named by a config string. Returns false for
    /// unrecognized names.
    fn enable(&mut self, name: &str) -> bool {
        match name {
            "cpu" => self.cpu = true,
            "memory" => self.memory = true,
            "battery" => self.battery = true,
            "avg_load" => self.avg_load = true,
            "cpu_temp" => self.cpu_temp = true,
            "cpu_speed" => self.cpu_speed = true,
            "processes" => self.processes = true,
            "sys_calls" => self.sys_calls = true,
            "disk" => self.disk = true,
            "network" => self.network = true,
            _ => return false,
        }
        true
    }

    /// Names of the enabled families, for startup logging.
    pub fn enabled_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.cpu {
            names.push("cpu");
        }
        if self.memory {
            names.push("memory");
        }
        if self.battery {
            names.push("battery");
        }
        if self.avg_load {
            names.push("avg_load");
        }
        if self.cpu_temp {
            names.push("cpu_temp");
        }
        if self.cpu_speed {
            names.push("cpu_speed");
        }
        if self.processes {
            names.push("processes");
        }
        if self.sys_calls {
            names.push("sys_calls");
        }
        if self.disk {
            names.push("disk");
        }
        if self.network {
            names.push("network");
        }
        names
    }
}

/// Wire shape of the configuration file. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct RawConfig {
    sampling_interval: Option<u64>,
    metrics: Option<Vec<String>>,
}

/// Immutable exporter configuration, constructed once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Delay between sampling passes.
    pub sampling_interval: Duration,
    /// Which metric families are collected and registered.
    pub metrics: MetricToggles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sampling_interval: Duration::from_secs(1),
            metrics: MetricToggles::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the file named by `CONFIG_FILE_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_FILE_ENV).map_err(|_| ConfigError::EnvMissing)?;
        Self::from_file(&path)
    }

    /// Loads configuration from a JSON file at `path`.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(content).map_err(ConfigError::Parse)?;

        let interval = match raw.sampling_interval {
            Some(0) => {
                warn!("sampling_interval 0 is below the 1s minimum, clamping to 1s");
                1
            }
            Some(secs) => secs,
            None => 1,
        };

        let metrics = match raw.metrics {
            Some(names) => {
                let mut toggles = MetricToggles::none();
                for name in &names {
                    if !toggles.enable(name) {
                        warn!("ignoring unrecognized metric name {:?} in config", name);
                    }
                }
                toggles
            }
            None => MetricToggles::default(),
        };

        Ok(Self {
            sampling_interval: Duration::from_secs(interval),
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_full_config() {
        let config =
            Config::from_json(r#"{"sampling_interval": 5, "metrics": ["cpu", "memory"]}"#).unwrap();

        assert_eq!(config.sampling_interval, Duration::from_secs(5));
        assert!(config.metrics.cpu);
        assert!(config.metrics.memory);
        assert!(!config.metrics.disk);
        assert!(!config.metrics.network);
        assert_eq!(config.metrics.enabled_names(), vec!["cpu", "memory"]);
    }

    #[test]
    fn test_defaults_when_keys_absent() {
        let config = Config::from_json("{}").unwrap();

        assert_eq!(config.sampling_interval, Duration::from_secs(1));
        assert_eq!(config.metrics, MetricToggles::default());
        assert!(config.metrics.memory);
        assert!(!config.metrics.cpu);
    }

    #[test]
    fn test_explicit_metrics_array_replaces_defaults() {
        // An explicit array fully determines enablement: memory is off
        // unless listed.
        let config = Config::from_json(r#"{"metrics": ["cpu"]}"#).unwrap();
        assert!(config.metrics.cpu);
        assert!(!config.metrics.memory);

        let config = Config::from_json(r#"{"metrics": []}"#).unwrap();
        assert_eq!(config.metrics, MetricToggles::none());
    }

    #[test]
    fn test_unrecognized_metric_names_ignored() {
        let config = Config::from_json(r#"{"metrics": ["cpu", "gpu", "quantum"]}"#).unwrap();
        assert!(config.metrics.cpu);
        assert_eq!(config.metrics.enabled_names(), vec!["cpu"]);
    }

    #[test]
    fn test_all_recognized_names() {
        let config = Config::from_json(
            r#"{"metrics": ["cpu", "memory", "battery", "avg_load", "cpu_temp",
                            "cpu_speed", "processes", "sys_calls", "disk", "network"]}"#,
        )
        .unwrap();
        assert_eq!(config.metrics.enabled_names().len(), 10);
    }

    #[test]
    fn test_zero_interval_clamped() {
        let config = Config::from_json(r#"{"sampling_interval": 0}"#).unwrap();
        assert_eq!(config.sampling_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(matches!(
            Config::from_json("not json").unwrap_err(),
            ConfigError::Parse(_)
        ));
        assert!(matches!(
            Config::from_json(r#"{"metrics": "cpu"}"#).unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sampling_interval": 2, "metrics": ["disk"]}}"#).unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.sampling_interval, Duration::from_secs(2));
        assert!(config.metrics.disk);
        assert!(!config.metrics.memory);
    }

    #[test]
    fn test_from_file_missing() {
        assert!(matches!(
            Config::from_file("/nonexistent/config.json").unwrap_err(),
            ConfigError::Io(_)
        ));
    }
}
