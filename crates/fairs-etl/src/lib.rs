//! Fairs ETL
//!
//! Imports the open-air fairs published by the city of São Paulo
//! (`DEINFO_AB_FEIRASLIVRES_2014.csv`) into a normalized PostgreSQL/PostGIS
//! schema.
//!
//! # Overview
//!
//! - **Source**: download the city's zip and extract the CSV ([`source`])
//! - **Parse**: turn CSV rows into header-keyed [`fairs::Record`]s
//! - **Normalize**: collapse census areas, census sectors, boroughs and
//!   districts to one row per natural key, last occurrence wins
//!   ([`fairs::plan`])
//! - **Load**: insert everything in a single transaction ([`fairs::loader`])
//!
//! Any failure while loading rolls the whole transaction back. The detail is
//! written to the failure log and the caller receives a generic
//! [`EtlError::Insertion`].
//!
//! # Example
//!
//! ```no_run
//! use fairs_common::TracingFailureLog;
//! use fairs_etl::config::SourceConfig;
//! use fairs_etl::dataset::dataset_for;
//! use fairs_etl::pipeline::ImportPipeline;
//! use fairs_etl::store::MemoryFairStore;
//! use fairs_etl::SupportedFile;
//!
//! # async fn run() -> fairs_etl::Result<()> {
//! let dataset = dataset_for(SupportedFile::Fairs2014, MemoryFairStore::new(), TracingFailureLog);
//! let summary = ImportPipeline::new(SourceConfig::default(), dataset).run().await?;
//! println!("{} fairs", summary.fairs);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod dataset;
pub mod db;
pub mod error;
pub mod fairs;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod supported;

pub use error::{EtlError, Result};
pub use supported::SupportedFile;
