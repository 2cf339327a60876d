//! Transactional loader for the 2014 fairs file
//!
//! Reference entities go in first, parents before children, then one address
//! and one fair per source record. Everything happens inside a single
//! transaction: either every row lands or none does.

use anyhow::Context;
use fairs_common::FailureLog;
use tracing::{debug, info, warn};

use super::models::{Fair, LoadSummary, Record};
use super::plan::NormalizedEntities;
use crate::error::{EtlError, Result};
use crate::store::{FairStore, FairTransaction};

/// Loads parsed records through a [`FairStore`]
pub struct FairLoader<S, L> {
    store: S,
    failure_log: L,
}

impl<S: FairStore, L: FailureLog> FairLoader<S, L> {
    pub fn new(store: S, failure_log: L) -> Self {
        Self { store, failure_log }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load `records` in one transaction.
    ///
    /// A failure to open the transaction is reported as
    /// [`EtlError::Connection`]; any later failure rolls back and is reported
    /// as [`EtlError::Insertion`]. The underlying error only reaches the
    /// failure log.
    pub async fn load(&self, records: &[Record]) -> Result<LoadSummary> {
        debug!(records = records.len(), "Starting load");

        let entities = NormalizedEntities::extract(records);
        debug!(
            census_areas = entities.census_areas.len(),
            census_sectors = entities.census_sectors.len(),
            boroughs = entities.boroughs.len(),
            districts = entities.districts.len(),
            "Extracted reference entities"
        );

        let mut tx = match self.store.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                self.failure_log.log_failure(&e);
                return Err(EtlError::Connection);
            },
        };
        debug!("Opened load transaction");

        match insert_all(&mut tx, &entities, records).await {
            Ok(summary) => match tx.commit().await {
                Ok(()) => {
                    info!(
                        census_areas = summary.census_areas,
                        census_sectors = summary.census_sectors,
                        boroughs = summary.boroughs,
                        districts = summary.districts,
                        fairs = summary.fairs,
                        "Load committed"
                    );
                    Ok(summary)
                },
                Err(e) => {
                    debug!("Commit failed");
                    self.failure_log.log_failure(&e);
                    Err(EtlError::Insertion)
                },
            },
            Err(e) => {
                debug!("Load failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback failed: {:#}", rollback_err);
                }
                self.failure_log.log_failure(&e);
                Err(EtlError::Insertion)
            },
        }
    }
}

async fn insert_all(
    tx: &mut Box<dyn FairTransaction>,
    entities: &NormalizedEntities,
    records: &[Record],
) -> anyhow::Result<LoadSummary> {
    for area in &entities.census_areas {
        tx.insert_census_area(area).await?;
    }
    for sector in &entities.census_sectors {
        tx.insert_census_sector(sector).await?;
    }
    for borough in &entities.boroughs {
        tx.insert_borough(borough).await?;
    }
    for district in &entities.districts {
        tx.insert_district(district).await?;
    }
    debug!("Reference entities inserted");

    for (row, record) in records.iter().enumerate() {
        let fair = Fair::from(record);
        let address_id = tx
            .insert_address(&fair.address)
            .await
            .with_context(|| format!("Row {}", row + 1))?;
        tx.insert_fair(&fair, address_id)
            .await
            .with_context(|| format!("Row {}", row + 1))?;
    }

    Ok(LoadSummary {
        census_areas: entities.census_areas.len(),
        census_sectors: entities.census_sectors.len(),
        boroughs: entities.boroughs.len(),
        districts: entities.districts.len(),
        fairs: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FailPoint, MemoryFairStore};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLog {
        entries: Mutex<Vec<String>>,
    }

    impl FailureLog for RecordingLog {
        fn log_failure(&self, error: &anyhow::Error) {
            self.entries.lock().unwrap().push(format!("{:#}", error));
        }
    }

    fn row(district: &str, borough: &str) -> Record {
        [
            ("AREAP", "10"),
            ("SETCENS", "100"),
            ("SUBPREFE", borough),
            ("CODSUBPREF", "1"),
            ("REGIAO5", "Leste"),
            ("REGIAO8", "Leste 1"),
            ("DISTRITO", district),
            ("CODDIST", "9"),
            ("NOME_FEIRA", "FEIRA"),
            ("REGISTRO", "1"),
            ("LOGRADOURO", "RUA A"),
            ("NUMERO", "12"),
            ("BAIRRO", "B"),
            ("REFERENCIA", ""),
            ("LAT", "-23558733"),
            ("LONG", "-46550164"),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_load_counts_rows() {
        let loader = FairLoader::new(MemoryFairStore::new(), RecordingLog::default());
        let records = vec![row("A", "X"), row("A", "X"), row("B", "X")];

        let summary = loader.load(&records).await.unwrap();

        assert_eq!(
            summary,
            LoadSummary {
                census_areas: 1,
                census_sectors: 1,
                boroughs: 1,
                districts: 2,
                fairs: 3,
            }
        );
        assert!(loader.failure_log.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_begin_failure_is_connection_error() {
        let loader = FairLoader::new(
            MemoryFairStore::failing_at(FailPoint::Begin),
            RecordingLog::default(),
        );

        let err = loader.load(&[row("A", "X")]).await.unwrap_err();

        assert!(matches!(err, EtlError::Connection));
        assert_eq!(loader.failure_log.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_address_failure_rolls_back() {
        let loader = FairLoader::new(
            MemoryFairStore::failing_at(FailPoint::Address(1)),
            RecordingLog::default(),
        );

        let err = loader.load(&[row("A", "X"), row("B", "X")]).await.unwrap_err();

        assert!(matches!(err, EtlError::Insertion));
        assert!(loader.store().snapshot().is_empty());
        let entries = loader.failure_log.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("Row 2"));
    }

    #[tokio::test]
    async fn test_commit_failure_is_insertion_error() {
        let loader = FairLoader::new(
            MemoryFairStore::failing_at(FailPoint::Commit),
            RecordingLog::default(),
        );

        let err = loader.load(&[row("A", "X")]).await.unwrap_err();

        assert!(matches!(err, EtlError::Insertion));
        assert!(loader.store().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_reload_fails_and_keeps_first_load() {
        let loader = FairLoader::new(MemoryFairStore::new(), RecordingLog::default());

        loader.load(&[row("A", "X")]).await.unwrap();
        let err = loader.load(&[row("A", "X")]).await.unwrap_err();

        assert!(matches!(err, EtlError::Insertion));
        let tables = loader.store().snapshot();
        assert_eq!(tables.census_areas.len(), 1);
        assert_eq!(tables.fairs.len(), 1);
        let entries = loader.failure_log.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("census_areas_code_key"));
    }

    #[tokio::test]
    async fn test_empty_input_commits_nothing() {
        let loader = FairLoader::new(MemoryFairStore::new(), RecordingLog::default());

        let summary = loader.load(&[]).await.unwrap();

        assert_eq!(summary, LoadSummary::default());
        assert!(loader.store().snapshot().is_empty());
    }
}
