//! PostgreSQL (PostGIS) store

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use super::{FairStore, FairTransaction};
use crate::fairs::models::{Borough, CensusArea, CensusSector, District, Fair, FairAddress};

/// SRID of WGS 84 longitude/latitude
const WGS84_SRID: i32 = 4326;

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgFairStore {
    pool: PgPool,
}

impl PgFairStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FairStore for PgFairStore {
    async fn begin(&self) -> Result<Box<dyn FairTransaction>> {
        let tx = self.pool.begin().await.context("Failed to begin transaction")?;
        debug!("Opened load transaction");
        Ok(Box::new(PgFairTransaction { tx }))
    }
}

/// Wraps a `sqlx` transaction, which rolls back when dropped uncommitted
pub struct PgFairTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl FairTransaction for PgFairTransaction {
    async fn insert_census_area(&mut self, area: &CensusArea) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO census_areas (code, created_at, updated_at)
            VALUES ($1, NOW(), NOW())
            "#,
        )
        .bind(&area.code)
        .execute(&mut *self.tx)
        .await
        .with_context(|| format!("Failed to insert census area '{}'", area.code))?;

        Ok(())
    }

    async fn insert_census_sector(&mut self, sector: &CensusSector) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO census_sectors (code, census_area_id, created_at, updated_at)
            VALUES ($1, (SELECT id FROM census_areas WHERE code = $2), NOW(), NOW())
            "#,
        )
        .bind(&sector.code)
        .bind(&sector.census_area_code)
        .execute(&mut *self.tx)
        .await
        .with_context(|| format!("Failed to insert census sector '{}'", sector.code))?;

        Ok(())
    }

    async fn insert_borough(&mut self, borough: &Borough) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO boroughs (name, smdu_code, quinary_region_name, octave_region_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            "#,
        )
        .bind(&borough.name)
        .bind(&borough.smdu_code)
        .bind(&borough.quinary_region_name)
        .bind(&borough.octave_region_name)
        .execute(&mut *self.tx)
        .await
        .with_context(|| format!("Failed to insert borough '{}'", borough.name))?;

        Ok(())
    }

    async fn insert_district(&mut self, district: &District) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO districts (name, ibge_code, borough_id, created_at, updated_at)
            VALUES ($1, $2, (SELECT id FROM boroughs WHERE name = $3), NOW(), NOW())
            "#,
        )
        .bind(&district.name)
        .bind(&district.ibge_code)
        .bind(&district.borough_name)
        .execute(&mut *self.tx)
        .await
        .with_context(|| format!("Failed to insert district '{}'", district.name))?;

        Ok(())
    }

    async fn insert_address(&mut self, address: &FairAddress) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO fair_addresses (
                number,
                street,
                neighborhood,
                reference_point,
                coordinates,
                district_id,
                census_area_id,
                created_at,
                updated_at
            )
            VALUES (
                $1,
                $2,
                $3,
                $4,
                ST_SetSRID(ST_MakePoint($5, $6), $7)::geography,
                (SELECT id FROM districts WHERE name = $8),
                (SELECT id FROM census_areas WHERE code = $9),
                NOW(),
                NOW()
            )
            RETURNING id
            "#,
        )
        .bind(address.number)
        .bind(&address.street)
        .bind(&address.neighborhood)
        .bind(&address.reference_point)
        .bind(address.longitude)
        .bind(address.latitude)
        .bind(WGS84_SRID)
        .bind(&address.district_name)
        .bind(&address.census_area_code)
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to insert fair address")?;

        Ok(id)
    }

    async fn insert_fair(&mut self, fair: &Fair, address_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fairs (name, pmsp_code, address_id, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            "#,
        )
        .bind(&fair.name)
        .bind(&fair.pmsp_code)
        .bind(address_id)
        .execute(&mut *self.tx)
        .await
        .with_context(|| {
            format!("Failed to insert fair '{}'", fair.pmsp_code.as_deref().unwrap_or("<none>"))
        })?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.context("Failed to commit transaction")
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.context("Failed to roll back transaction")
    }
}
