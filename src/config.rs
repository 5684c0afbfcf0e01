use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const PRODUCTION_URL: &str = "https://datachat-server.up.railway.app";
const LOCAL_URL: &str = "http://localhost:8000";

pub const SERVER_URL_ENV: &str = "DATACHAT_SERVER_URL";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub server_url: Option<String>,
    pub example_queries: Option<Vec<String>>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            server_url: None,
            example_queries: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the query-server address: env var, then config file, then the
    /// build-profile default (local server in debug builds, the hosted one in
    /// release).
    pub fn server_url(&self) -> String {
        std::env::var(SERVER_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| default_server_url().to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("datachat").join("config.json"))
    }
}

pub fn default_server_url() -> &'static str {
    if cfg!(debug_assertions) {
        LOCAL_URL
    } else {
        PRODUCTION_URL
    }
}

/// Directory for the session log file.
pub fn log_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;

    Ok(config_dir.join("datachat").join("logs"))
}

/// Canned questions shown in the example picker when the config file does
/// not override them.
pub fn default_example_queries() -> Vec<String> {
    [
        "What's our total sales revenue this year?",
        "Which products have the highest profit margins?",
        "Show me customer churn rate by region",
        "What are the top 5 selling products?",
        "How do sales compare month over month?",
        "Which customers have the highest lifetime value?",
        "What's the average order value by product category?",
        "Show me sales performance by sales rep",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.server_url.is_none());
        assert!(config.example_queries.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.server_url = Some("http://example.test:9000".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server_url.as_deref(), Some("http://example.test:9000"));
    }

    #[test]
    fn config_file_url_wins_over_default() {
        let mut config = Config::new();
        config.server_url = Some("http://example.test:9000".to_string());
        // Assumes the env override is unset in the test environment.
        if std::env::var(SERVER_URL_ENV).is_err() {
            assert_eq!(config.server_url(), "http://example.test:9000");
        }
    }
}
