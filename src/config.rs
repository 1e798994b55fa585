use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub coingecko_api_key: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coingecko_api_key: String::new(),
            request_timeout_secs: default_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads the YAML config at `path`, writing defaults there if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let cfg: Config = serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid config in {}", path.display()))?;
            Ok(cfg.normalized())
        } else {
            let cfg = Config::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("viewcoin");
        path.push("config.yaml");
        path
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }

    fn normalized(mut self) -> Self {
        if self.request_timeout_secs < 5 {
            self.request_timeout_secs = 5;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let cfg: Config = serde_yaml::from_str("coingecko_api_key: abc\n").unwrap();
        assert_eq!(cfg.coingecko_api_key, "abc");
        assert_eq!(cfg.request_timeout_secs, 15);
        assert_eq!(cfg.tracing_level(), tracing::Level::INFO);
    }

    #[test]
    fn timeout_is_clamped_and_level_parsed() {
        let cfg: Config = serde_yaml::from_str("request_timeout_secs: 1\nlog_level: debug\n").unwrap();
        let cfg = cfg.normalized();
        assert_eq!(cfg.request_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.tracing_level(), tracing::Level::DEBUG);

        let cfg = Config {
            log_level: "loud".into(),
            ..Config::default()
        };
        assert_eq!(cfg.tracing_level(), tracing::Level::INFO);
    }

    #[test]
    fn load_creates_default_file() {
        let dir = std::env::temp_dir().join(format!("viewcoin-config-{}", std::process::id()));
        let path = dir.join("config.yaml");
        let _ = fs::remove_dir_all(&dir);

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
        assert_eq!(Config::load(&path).unwrap(), cfg);

        let _ = fs::remove_dir_all(&dir);
    }
}
