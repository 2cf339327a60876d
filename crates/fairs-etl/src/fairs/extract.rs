//! Deduplication of reference entities out of the flat record list

use std::collections::HashMap;

use super::models::Record;

/// Collapse `records` to one record per distinct `identity_key` value.
///
/// Each output record holds only `identity_key` and `carried_keys` (the
/// identity key is carried even when the caller omits it). When several
/// records share an identity value the **last** one supplies the values, while
/// the output keeps the position where that value **first** appeared.
/// Records without the identity field are skipped.
pub fn extract_unique(records: &[Record], identity_key: &str, carried_keys: &[&str]) -> Vec<Record> {
    let keys: Vec<&str> = std::iter::once(identity_key)
        .chain(carried_keys.iter().copied().filter(|k| *k != identity_key))
        .collect();

    let mut unique: Vec<Record> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let Some(identity) = record.get(identity_key) else {
            continue;
        };
        let projected = record.project(keys.iter().copied());

        match position.get(identity) {
            Some(&index) => unique[index] = projected,
            None => {
                position.insert(identity, unique.len());
                unique.push(projected);
            },
        }
    }

    unique
}
