use anyhow::Context;
use dashboard::DashboardConfig;
use report_loader::DEFAULT_RESOURCE_PATH;
use serde::Deserialize;
use std::path::Path;

/// Optional settings file read from the working directory
pub const CONFIG_FILE: &str = "dashboard.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory or `http(s)://` base URL the document is resolved against
    pub source: String,
    pub resource_path: String,
    /// Where the HTML snapshot is written
    pub output_path: String,
    #[serde(flatten)]
    pub dashboard: DashboardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: ".".to_string(),
            resource_path: DEFAULT_RESOURCE_PATH.to_string(),
            output_path: "dashboard.html".to_string(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read `path` if it exists; a missing file yields the defaults.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No {} found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let config = serde_json::from_slice(&raw)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join(CONFIG_FILE)).await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.resource_path, "data/analysis_results.json");
    }

    #[tokio::test]
    async fn test_partial_file_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"source": "http://localhost:8000", "candidate_limit": 10}"#).unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert_eq!(config.source, "http://localhost:8000");
        assert_eq!(config.output_path, "dashboard.html");
        assert_eq!(config.dashboard.candidate_limit, 10);
        assert_eq!(config.dashboard.history_window, 12);
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load(&path).await.is_err());
    }
}
