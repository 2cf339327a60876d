//! HTTP download of the source archive

use reqwest::Client;
use std::time::Duration;
use tracing::info;

use crate::config::SourceConfig;
use crate::error::{EtlError, Result};

/// Fetches the zip published by the city
pub struct ArchiveDownloader {
    client: Client,
    config: SourceConfig,
}

impl ArchiveDownloader {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| EtlError::download(&config.url, e))?;

        Ok(Self { client, config })
    }

    /// Archive bytes, read from `local_archive_path` when configured
    pub async fn fetch(&self) -> Result<Vec<u8>> {
        if let Some(path) = &self.config.local_archive_path {
            info!("Loading archive from local file: {}", path.display());
            let data = tokio::fs::read(path).await?;
            info!("Loaded archive: {} bytes ({} KB)", data.len(), data.len() / 1024);
            return Ok(data);
        }

        self.download(&self.config.url).await
    }

    /// GET `url`; any non-success status is an error. No retry.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        info!("Downloading archive from: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EtlError::download(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::download(url, format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EtlError::download(url, e))?;

        info!("Downloaded archive: {} bytes ({} KB)", bytes.len(), bytes.len() / 1024);
        Ok(bytes.to_vec())
    }
}
