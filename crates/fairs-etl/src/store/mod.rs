//! Write side of the loader
//!
//! The orchestrator only talks to these traits. [`postgres::PgFairStore`] is
//! the real target; [`memory::MemoryFairStore`] backs `--dry-run` and tests.
//!
//! Foreign keys are resolved by natural key inside each insert (the
//! `SELECT id FROM parent WHERE key = ...` pattern), so parents must already be
//! inserted in the same transaction.

pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;

use crate::fairs::models::{Borough, CensusArea, CensusSector, District, Fair, FairAddress};

pub use memory::{FailPoint, MemoryFairStore, MemoryTables};
pub use postgres::PgFairStore;

/// Opens load transactions
#[async_trait]
pub trait FairStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn FairTransaction>>;
}

/// One open transaction.
///
/// Dropping it without calling [`commit`](FairTransaction::commit) discards
/// every write made through it.
#[async_trait]
pub trait FairTransaction: Send {
    async fn insert_census_area(&mut self, area: &CensusArea) -> Result<()>;

    /// Resolves `census_area_id` from `sector.census_area_code`
    async fn insert_census_sector(&mut self, sector: &CensusSector) -> Result<()>;

    async fn insert_borough(&mut self, borough: &Borough) -> Result<()>;

    /// Resolves `borough_id` from `district.borough_name`
    async fn insert_district(&mut self, district: &District) -> Result<()>;

    /// Insert an address and return its id. District and census area are
    /// looked up by natural key; a miss stores NULL.
    async fn insert_address(&mut self, address: &FairAddress) -> Result<i64>;

    async fn insert_fair(&mut self, fair: &Fair, address_id: i64) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
