//! `DEINFO_AB_FEIRASLIVRES_2014.csv` handler

use async_trait::async_trait;
use fairs_common::FailureLog;
use tracing::info;

use super::loader::FairLoader;
use super::models::{column, LoadSummary, Record};
use super::parser::CsvRecordSource;
use crate::dataset::{Dataset, RecordSet};
use crate::error::{EtlError, Result};
use crate::store::FairStore;
use crate::supported::SupportedFile;

/// The 2014 open-air fairs file of the city of São Paulo
pub struct Fairs2014<S, L> {
    loader: FairLoader<S, L>,
}

impl<S: FairStore, L: FailureLog> Fairs2014<S, L> {
    pub fn new(store: S, failure_log: L) -> Self {
        Self {
            loader: FairLoader::new(store, failure_log),
        }
    }
}

fn missing_columns(headers: &[String]) -> Vec<&'static str> {
    column::REQUIRED
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|h| h == required))
        .collect()
}

#[async_trait]
impl<S: FairStore, L: FailureLog> Dataset for Fairs2014<S, L> {
    fn file(&self) -> SupportedFile {
        SupportedFile::Fairs2014
    }

    fn parse(&self, content: &str) -> Result<RecordSet> {
        let source = CsvRecordSource::new(content)?;

        let missing = missing_columns(source.headers());
        if !missing.is_empty() {
            return Err(EtlError::parse(format!(
                "{} is missing required columns: {}",
                self.file(),
                missing.join(", ")
            )));
        }

        let records: Vec<Record> = source.collect_records()?;
        info!(records = records.len(), "Parsed {}", self.file());
        Ok(records)
    }

    async fn load(&self, records: &[Record]) -> Result<LoadSummary> {
        self.loader.load(records).await
    }
}
