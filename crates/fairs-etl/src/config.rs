//! Source archive configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Archive published by the city's open data portal
pub const DEFAULT_ARCHIVE_URL: &str =
    "http://www.prefeitura.sp.gov.br/cidade/secretarias/upload/chamadas/feiras_livres_1429113213.zip";

/// Where the source archive comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Read the archive from disk instead of downloading it
    pub local_archive_path: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ARCHIVE_URL.to_string(),
            timeout_secs: 120,
            user_agent: format!("fairs-etl/{}", env!("CARGO_PKG_VERSION")),
            local_archive_path: None,
        }
    }
}

impl SourceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set archive URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Use a zip already on disk
    pub fn with_local_archive(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_archive_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SourceConfig::default();
        assert_eq!(config.url, DEFAULT_ARCHIVE_URL);
        assert_eq!(config.timeout_secs, 120);
        assert!(config.user_agent.starts_with("fairs-etl/"));
        assert!(config.local_archive_path.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let config = SourceConfig::new()
            .with_url("http://localhost/feiras.zip")
            .with_timeout(5)
            .with_local_archive("/tmp/feiras.zip");

        assert_eq!(config.url, "http://localhost/feiras.zip");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.local_archive_path, Some(PathBuf::from("/tmp/feiras.zip")));
    }
}
