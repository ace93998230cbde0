use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub report: ReportConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub interval_ms: u64,
    /// Stop after this many reported cycles; 0 runs until interrupted.
    pub cycles: u64,
    pub stat_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            interval_ms: 1000,
            cycles: 0,
            stat_path: None,
            log_level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub cores: String,
    pub format: String,
    pub console: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            cores: "all".to_string(),
            format: "text".to_string(),
            console: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub enabled: bool,
    pub directory: PathBuf,
    pub file_prefix: String,
    pub max_probe: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            enabled: true,
            directory: PathBuf::from("."),
            file_prefix: "log".to_string(),
            max_probe: 100,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("corestat").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), %err, "invalid config, using defaults");
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.general.interval_ms, 1000);
        assert_eq!(config.general.cycles, 0);
        assert!(config.general.stat_path.is_none());
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.report.cores, "all");
        assert_eq!(config.report.format, "text");
        assert!(config.report.console);
        assert!(config.log.enabled);
        assert_eq!(config.log.file_prefix, "log");
        assert_eq!(config.log.max_probe, 100);
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[general]
interval_ms = 250
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.interval_ms, 250);
        // Other fields should be defaults
        assert_eq!(config.report.cores, "all");
        assert_eq!(config.log.directory, PathBuf::from("."));
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[general]
interval_ms = 500
cycles = 10
stat_path = "/tmp/stat"
log_level = "debug"

[report]
cores = "last5"
format = "json"
console = false

[log]
enabled = false
directory = "/var/log/corestat"
file_prefix = "cpu"
max_probe = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.interval_ms, 500);
        assert_eq!(config.general.cycles, 10);
        assert_eq!(config.general.stat_path, Some(PathBuf::from("/tmp/stat")));
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.report.cores, "last5");
        assert_eq!(config.report.format, "json");
        assert!(!config.report.console);
        assert!(!config.log.enabled);
        assert_eq!(config.log.directory, PathBuf::from("/var/log/corestat"));
        assert_eq!(config.log.file_prefix, "cpu");
        assert_eq!(config.log.max_probe, 5);
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.general.interval_ms, 1000);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("corestat_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.general.interval_ms, 1000);
        let _ = std::fs::remove_file(&temp);
    }
}
