//! Import pipeline: fetch, parse, load

use tracing::info;

use crate::config::SourceConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::fairs::LoadSummary;
use crate::source;

pub struct ImportPipeline {
    source: SourceConfig,
    dataset: Box<dyn Dataset>,
}

impl ImportPipeline {
    pub fn new(source: SourceConfig, dataset: Box<dyn Dataset>) -> Self {
        Self { source, dataset }
    }

    /// Run every phase; nothing is written unless all records load
    pub async fn run(&self) -> Result<LoadSummary> {
        let file = self.dataset.file();
        info!("Starting import of {}", file);

        info!("Phase 1: Fetching source archive");
        let content = source::fetch_file(&self.source, file).await?;

        info!("Phase 2: Parsing {}", file);
        let records = self.dataset.parse(&content)?;
        info!("Parsed {} records", records.len());

        info!("Phase 3: Loading records");
        let summary = self.dataset.load(&records).await?;

        info!(
            census_areas = summary.census_areas,
            census_sectors = summary.census_sectors,
            boroughs = summary.boroughs,
            districts = summary.districts,
            fairs = summary.fairs,
            "Import of {} complete",
            file
        );

        Ok(summary)
    }
}
