//! Getting the text of a supported file
//!
//! Download (or read) the archive, pick the entry by name, decode it.

pub mod archive;
pub mod downloader;

pub use archive::{decode_text, extract_file};
pub use downloader::ArchiveDownloader;

use tracing::info;

use crate::config::SourceConfig;
use crate::error::Result;
use crate::supported::SupportedFile;

/// Decoded contents of `file` from the archive described by `config`
pub async fn fetch_file(config: &SourceConfig, file: SupportedFile) -> Result<String> {
    let downloader = ArchiveDownloader::new(config.clone())?;
    let archive = downloader.fetch().await?;

    let bytes = extract_file(&archive, file.file_name())?;
    let text = decode_text(bytes);
    info!("Read {} ({} KB)", file, text.len() / 1024);

    Ok(text)
}
