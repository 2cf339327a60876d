//! Normalization plan for the 2014 fairs file
//!
//! Reference entities in insert order. A child entity always comes after the
//! parent its foreign-key lookup depends on.

use super::extract::extract_unique;
use super::models::{column, Borough, CensusArea, CensusSector, District, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    CensusArea,
    CensusSector,
    Borough,
    District,
}

/// How one reference entity is derived from the flat records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRule {
    pub kind: EntityKind,
    pub identity_key: &'static str,
    pub carried_keys: &'static [&'static str],
}

pub const CENSUS_AREAS: EntityRule = EntityRule {
    kind: EntityKind::CensusArea,
    identity_key: column::AREAP,
    carried_keys: &[],
};

pub const CENSUS_SECTORS: EntityRule = EntityRule {
    kind: EntityKind::CensusSector,
    identity_key: column::SETCENS,
    carried_keys: &[column::AREAP],
};

pub const BOROUGHS: EntityRule = EntityRule {
    kind: EntityKind::Borough,
    identity_key: column::SUBPREFE,
    carried_keys: &[column::CODSUBPREF, column::REGIAO5, column::REGIAO8],
};

pub const DISTRICTS: EntityRule = EntityRule {
    kind: EntityKind::District,
    identity_key: column::DISTRITO,
    carried_keys: &[column::CODDIST, column::SUBPREFE],
};

/// All reference entities, parents first
pub const NORMALIZATION_PLAN: [EntityRule; 4] = [CENSUS_AREAS, CENSUS_SECTORS, BOROUGHS, DISTRICTS];

impl EntityRule {
    pub fn extract(&self, records: &[Record]) -> Vec<Record> {
        extract_unique(records, self.identity_key, self.carried_keys)
    }
}

/// Deduplicated reference entities for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedEntities {
    pub census_areas: Vec<CensusArea>,
    pub census_sectors: Vec<CensusSector>,
    pub boroughs: Vec<Borough>,
    pub districts: Vec<District>,
}

impl NormalizedEntities {
    /// Apply every rule of [`NORMALIZATION_PLAN`] over `records`
    pub fn extract(records: &[Record]) -> Self {
        let mut entities = Self::default();

        for rule in &NORMALIZATION_PLAN {
            let unique = rule.extract(records);
            match rule.kind {
                EntityKind::CensusArea => {
                    entities.census_areas = unique.iter().map(CensusArea::from).collect();
                },
                EntityKind::CensusSector => {
                    entities.census_sectors = unique.iter().map(CensusSector::from).collect();
                },
                EntityKind::Borough => {
                    entities.boroughs = unique.iter().map(Borough::from).collect();
                },
                EntityKind::District => {
                    entities.districts = unique.iter().map(District::from).collect();
                },
            }
        }

        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_plan_order_matches_dependencies() {
        let kinds: Vec<_> = NORMALIZATION_PLAN.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::CensusArea,
                EntityKind::CensusSector,
                EntityKind::Borough,
                EntityKind::District,
            ]
        );
    }

    #[test]
    fn test_plan_keys() {
        assert_eq!(CENSUS_AREAS.identity_key, "AREAP");
        assert!(CENSUS_AREAS.carried_keys.is_empty());
        assert_eq!(CENSUS_SECTORS.identity_key, "SETCENS");
        assert_eq!(CENSUS_SECTORS.carried_keys, &["AREAP"]);
        assert_eq!(BOROUGHS.identity_key, "SUBPREFE");
        assert_eq!(BOROUGHS.carried_keys, &["CODSUBPREF", "REGIAO5", "REGIAO8"]);
        assert_eq!(DISTRICTS.identity_key, "DISTRITO");
        assert_eq!(DISTRICTS.carried_keys, &["CODDIST", "SUBPREFE"]);
    }

    #[test]
    fn test_duplicate_district_takes_second_borough() {
        let records = vec![
            record(&[("DISTRITO", "A"), ("CODDIST", "1"), ("SUBPREFE", "FIRST")]),
            record(&[("DISTRITO", "A"), ("CODDIST", "1"), ("SUBPREFE", "SECOND")]),
        ];

        let entities = NormalizedEntities::extract(&records);

        assert_eq!(entities.districts.len(), 1);
        assert_eq!(entities.districts[0].name, "A");
        assert_eq!(entities.districts[0].borough_name, "SECOND");
    }

    #[test]
    fn test_extract_all_entities() {
        let records = vec![
            record(&[
                ("AREAP", "10"),
                ("SETCENS", "100"),
                ("SUBPREFE", "X"),
                ("CODSUBPREF", "1"),
                ("REGIAO5", "R5"),
                ("REGIAO8", "R8"),
                ("DISTRITO", "D"),
                ("CODDIST", "9"),
            ]),
            record(&[
                ("AREAP", "10"),
                ("SETCENS", "101"),
                ("SUBPREFE", "X"),
                ("CODSUBPREF", "1"),
                ("REGIAO5", "R5"),
                ("REGIAO8", "R8"),
                ("DISTRITO", "E"),
                ("CODDIST", "8"),
            ]),
        ];

        let entities = NormalizedEntities::extract(&records);

        assert_eq!(entities.census_areas, vec![CensusArea { code: "10".into() }]);
        assert_eq!(entities.census_sectors.len(), 2);
        assert_eq!(entities.boroughs.len(), 1);
        assert_eq!(entities.districts.len(), 2);
        assert_eq!(entities.districts[1].ibge_code, "8");
    }
}
