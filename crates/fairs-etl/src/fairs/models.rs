//! Data models for the 2014 open-fairs dataset
//!
//! A [`Record`] is one raw CSV row keyed by header name. The typed entities
//! below are built from (possibly deduplicated) records right before insert.

use serde::Serialize;
use std::collections::HashMap;

use super::sanitize::{bounded_string, house_number, scaled_coordinate};

/// CSV column names used by the loader
pub mod column {
    pub const AREAP: &str = "AREAP";
    pub const SETCENS: &str = "SETCENS";
    pub const SUBPREFE: &str = "SUBPREFE";
    pub const CODSUBPREF: &str = "CODSUBPREF";
    pub const REGIAO5: &str = "REGIAO5";
    pub const REGIAO8: &str = "REGIAO8";
    pub const DISTRITO: &str = "DISTRITO";
    pub const CODDIST: &str = "CODDIST";
    pub const NOME_FEIRA: &str = "NOME_FEIRA";
    pub const REGISTRO: &str = "REGISTRO";
    pub const LOGRADOURO: &str = "LOGRADOURO";
    pub const NUMERO: &str = "NUMERO";
    pub const BAIRRO: &str = "BAIRRO";
    pub const REFERENCIA: &str = "REFERENCIA";
    pub const LAT: &str = "LAT";
    pub const LONG: &str = "LONG";

    /// Columns a source file must declare in its header
    pub const REQUIRED: [&str; 16] = [
        AREAP, SETCENS, SUBPREFE, CODSUBPREF, REGIAO5, REGIAO8, DISTRITO, CODDIST, NOME_FEIRA,
        REGISTRO, LOGRADOURO, NUMERO, BAIRRO, REFERENCIA, LAT, LONG,
    ];
}

/// Maximum lengths of the fixed-width fair/address columns
pub mod max_len {
    pub const FAIR_NAME: usize = 30;
    pub const PMSP_CODE: usize = 6;
    pub const STREET: usize = 34;
    pub const NEIGHBORHOOD: usize = 20;
    pub const REFERENCE_POINT: usize = 24;
}

/// One CSV row: header field name -> raw, unsanitized value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value of `key`, or the empty string when the field is absent
    pub fn field(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Copy of this record restricted to `keys`; keys the record lacks are skipped
    pub fn project<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Record {
        keys.into_iter()
            .filter_map(|key| self.fields.get_key_value(key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CensusArea {
    pub code: String,
}

impl From<&Record> for CensusArea {
    fn from(record: &Record) -> Self {
        Self {
            code: record.field(column::AREAP).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CensusSector {
    pub code: String,
    /// Natural key of the parent census area
    pub census_area_code: String,
}

impl From<&Record> for CensusSector {
    fn from(record: &Record) -> Self {
        Self {
            code: record.field(column::SETCENS).to_string(),
            census_area_code: record.field(column::AREAP).to_string(),
        }
    }
}

/// Subprefeitura (borough)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Borough {
    pub name: String,
    pub smdu_code: String,
    pub quinary_region_name: String,
    pub octave_region_name: String,
}

impl From<&Record> for Borough {
    fn from(record: &Record) -> Self {
        Self {
            name: record.field(column::SUBPREFE).to_string(),
            smdu_code: record.field(column::CODSUBPREF).to_string(),
            quinary_region_name: record.field(column::REGIAO5).to_string(),
            octave_region_name: record.field(column::REGIAO8).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct District {
    pub name: String,
    pub ibge_code: String,
    /// Natural key of the parent borough
    pub borough_name: String,
}

impl From<&Record> for District {
    fn from(record: &Record) -> Self {
        Self {
            name: record.field(column::DISTRITO).to_string(),
            ibge_code: record.field(column::CODDIST).to_string(),
            borough_name: record.field(column::SUBPREFE).to_string(),
        }
    }
}

/// Address row embedded in every fair
#[derive(Debug, Clone, PartialEq)]
pub struct FairAddress {
    pub number: Option<i32>,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub reference_point: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    /// Natural key used to look up `district_id`; a miss leaves it NULL
    pub district_name: String,
    /// Natural key used to look up `census_area_id`; a miss leaves it NULL
    pub census_area_code: String,
}

/// Fact row: one per source record, never deduplicated
#[derive(Debug, Clone, PartialEq)]
pub struct Fair {
    pub name: Option<String>,
    pub pmsp_code: Option<String>,
    pub address: FairAddress,
}

impl From<&Record> for Fair {
    fn from(record: &Record) -> Self {
        Self {
            name: bounded_string(record.get(column::NOME_FEIRA), max_len::FAIR_NAME),
            pmsp_code: bounded_string(record.get(column::REGISTRO), max_len::PMSP_CODE),
            address: FairAddress {
                number: house_number(record.field(column::NUMERO)),
                street: bounded_string(record.get(column::LOGRADOURO), max_len::STREET),
                neighborhood: bounded_string(record.get(column::BAIRRO), max_len::NEIGHBORHOOD),
                reference_point: bounded_string(
                    record.get(column::REFERENCIA),
                    max_len::REFERENCE_POINT,
                ),
                longitude: scaled_coordinate(record.field(column::LONG)),
                latitude: scaled_coordinate(record.field(column::LAT)),
                district_name: record.field(column::DISTRITO).to_string(),
                census_area_code: record.field(column::AREAP).to_string(),
            },
        }
    }
}

/// Row counts written by one load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub census_areas: usize,
    pub census_sectors: usize,
    pub boroughs: usize,
    pub districts: usize,
    pub fairs: usize,
}
