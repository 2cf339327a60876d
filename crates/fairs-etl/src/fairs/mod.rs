//! São Paulo open-air fairs (2014 release)

pub mod dataset;
pub mod extract;
pub mod loader;
pub mod models;
pub mod parser;
pub mod plan;
pub mod sanitize;

pub use dataset::Fairs2014;
pub use loader::FairLoader;
pub use models::{LoadSummary, Record};
pub use plan::NormalizedEntities;
