//! In-memory store
//!
//! Mirrors the constraints of the relational schema that matter to the
//! loader: unique natural keys, NOT NULL parents for sectors, districts and
//! fairs, nullable lookups for addresses. Writes are staged per transaction
//! and only become visible on commit.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{FairStore, FairTransaction};
use crate::fairs::models::{Borough, CensusArea, CensusSector, District, Fair, FairAddress};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredCensusArea {
    pub id: i64,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredCensusSector {
    pub id: i64,
    pub code: String,
    pub census_area_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredBorough {
    pub id: i64,
    pub name: String,
    pub smdu_code: String,
    pub quinary_region_name: String,
    pub octave_region_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDistrict {
    pub id: i64,
    pub name: String,
    pub ibge_code: String,
    pub borough_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredAddress {
    pub id: i64,
    pub number: Option<i32>,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub reference_point: Option<String>,
    /// (longitude, latitude)
    pub coordinates: (f64, f64),
    pub district_id: Option<i64>,
    pub census_area_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFair {
    pub id: i64,
    pub name: Option<String>,
    pub pmsp_code: Option<String>,
    pub address_id: i64,
}

/// Committed contents of the six tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTables {
    pub census_areas: Vec<StoredCensusArea>,
    pub census_sectors: Vec<StoredCensusSector>,
    pub boroughs: Vec<StoredBorough>,
    pub districts: Vec<StoredDistrict>,
    pub fair_addresses: Vec<StoredAddress>,
    pub fairs: Vec<StoredFair>,
}

impl MemoryTables {
    pub fn is_empty(&self) -> bool {
        self.census_areas.is_empty()
            && self.census_sectors.is_empty()
            && self.boroughs.is_empty()
            && self.districts.is_empty()
            && self.fair_addresses.is_empty()
            && self.fairs.is_empty()
    }

    pub fn census_area_id(&self, code: &str) -> Option<i64> {
        self.census_areas.iter().find(|a| a.code == code).map(|a| a.id)
    }

    pub fn borough_id(&self, name: &str) -> Option<i64> {
        self.boroughs.iter().find(|b| b.name == name).map(|b| b.id)
    }

    pub fn district_id(&self, name: &str) -> Option<i64> {
        self.districts.iter().find(|d| d.name == name).map(|d| d.id)
    }
}

fn next_id(len: usize) -> i64 {
    len as i64 + 1
}

/// Where a [`MemoryFairStore`] should fail, to exercise rollback paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// The n-th address insert (0-based) fails
    Address(usize),
    /// The n-th fair insert (0-based) fails
    Fair(usize),
    Begin,
    Commit,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFairStore {
    tables: Arc<Mutex<MemoryTables>>,
    fail_point: Option<FailPoint>,
}

impl MemoryFairStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(fail_point: FailPoint) -> Self {
        Self {
            tables: Arc::default(),
            fail_point: Some(fail_point),
        }
    }

    /// Copy of the committed tables
    pub fn snapshot(&self) -> MemoryTables {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl FairStore for MemoryFairStore {
    async fn begin(&self) -> Result<Box<dyn FairTransaction>> {
        if self.fail_point == Some(FailPoint::Begin) {
            bail!("connection refused");
        }

        let staged = self
            .tables
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?
            .clone();

        Ok(Box::new(MemoryFairTransaction {
            committed: Arc::clone(&self.tables),
            staged,
            fail_point: self.fail_point,
            addresses_inserted: 0,
            fairs_inserted: 0,
        }))
    }
}

pub struct MemoryFairTransaction {
    committed: Arc<Mutex<MemoryTables>>,
    staged: MemoryTables,
    fail_point: Option<FailPoint>,
    addresses_inserted: usize,
    fairs_inserted: usize,
}

#[async_trait]
impl FairTransaction for MemoryFairTransaction {
    async fn insert_census_area(&mut self, area: &CensusArea) -> Result<()> {
        let t = &mut self.staged;
        if t.census_area_id(&area.code).is_some() {
            bail!("duplicate key value violates unique constraint \"census_areas_code_key\"");
        }
        let id = next_id(t.census_areas.len());
        t.census_areas.push(StoredCensusArea {
            id,
            code: area.code.clone(),
        });
        Ok(())
    }

    async fn insert_census_sector(&mut self, sector: &CensusSector) -> Result<()> {
        let t = &mut self.staged;
        if t.census_sectors.iter().any(|s| s.code == sector.code) {
            bail!("duplicate key value violates unique constraint \"census_sectors_code_key\"");
        }
        let Some(census_area_id) = t.census_area_id(&sector.census_area_code) else {
            bail!("null value in column \"census_area_id\" of relation \"census_sectors\" violates not-null constraint");
        };
        let id = next_id(t.census_sectors.len());
        t.census_sectors.push(StoredCensusSector {
            id,
            code: sector.code.clone(),
            census_area_id,
        });
        Ok(())
    }

    async fn insert_borough(&mut self, borough: &Borough) -> Result<()> {
        let t = &mut self.staged;
        if t.borough_id(&borough.name).is_some() {
            bail!("duplicate key value violates unique constraint \"boroughs_name_key\"");
        }
        let id = next_id(t.boroughs.len());
        t.boroughs.push(StoredBorough {
            id,
            name: borough.name.clone(),
            smdu_code: borough.smdu_code.clone(),
            quinary_region_name: borough.quinary_region_name.clone(),
            octave_region_name: borough.octave_region_name.clone(),
        });
        Ok(())
    }

    async fn insert_district(&mut self, district: &District) -> Result<()> {
        let t = &mut self.staged;
        if t.district_id(&district.name).is_some() {
            bail!("duplicate key value violates unique constraint \"districts_name_key\"");
        }
        let Some(borough_id) = t.borough_id(&district.borough_name) else {
            bail!("null value in column \"borough_id\" of relation \"districts\" violates not-null constraint");
        };
        let id = next_id(t.districts.len());
        t.districts.push(StoredDistrict {
            id,
            name: district.name.clone(),
            ibge_code: district.ibge_code.clone(),
            borough_id,
        });
        Ok(())
    }

    async fn insert_address(&mut self, address: &FairAddress) -> Result<i64> {
        if self.fail_point == Some(FailPoint::Address(self.addresses_inserted)) {
            bail!("simulated failure inserting fair address #{}", self.addresses_inserted);
        }
        self.addresses_inserted += 1;

        let t = &mut self.staged;
        let id = next_id(t.fair_addresses.len());
        let district_id = t.district_id(&address.district_name);
        let census_area_id = t.census_area_id(&address.census_area_code);
        t.fair_addresses.push(StoredAddress {
            id,
            number: address.number,
            street: address.street.clone(),
            neighborhood: address.neighborhood.clone(),
            reference_point: address.reference_point.clone(),
            coordinates: (address.longitude, address.latitude),
            district_id,
            census_area_id,
        });
        Ok(id)
    }

    async fn insert_fair(&mut self, fair: &Fair, address_id: i64) -> Result<()> {
        if self.fail_point == Some(FailPoint::Fair(self.fairs_inserted)) {
            bail!("simulated failure inserting fair #{}", self.fairs_inserted);
        }
        self.fairs_inserted += 1;

        let t = &mut self.staged;
        if !t.fair_addresses.iter().any(|a| a.id == address_id) {
            bail!("insert on table \"fairs\" violates foreign key constraint \"fairs_address_id_foreign\"");
        }
        let id = next_id(t.fairs.len());
        t.fairs.push(StoredFair {
            id,
            name: fair.name.clone(),
            pmsp_code: fair.pmsp_code.clone(),
            address_id,
        });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        if self.fail_point == Some(FailPoint::Commit) {
            bail!("could not serialize access due to concurrent update");
        }
        let mut committed = self
            .committed
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        *committed = self.staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
