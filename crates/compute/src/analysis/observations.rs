use crate::analysis::join::{JoinKeys, JoinedCollection};

/// Record columns that hold yearly observations, in header order.
///
/// Everything not excluded counts as a value column; the join key columns are
/// always treated as structural.
pub fn value_columns(headers: &[String], exclude: &[String], keys: &JoinKeys) -> Vec<String> {
    headers
        .iter()
        .filter(|h| !exclude.contains(h))
        .filter(|h| **h != keys.state_field && **h != keys.county_field)
        .cloned()
        .collect()
}

/// Every numeric observation across `columns` for every matched feature.
///
/// Missing and malformed cells are skipped, so the result can be shorter than
/// `matched * columns.len()`.
pub fn collect_observations(joined: &JoinedCollection, columns: &[String]) -> Vec<f64> {
    let mut out = Vec::new();
    for jf in &joined.features {
        let Some(record) = &jf.record else {
            continue;
        };
        out.extend(columns.iter().filter_map(|c| record.number(c)));
    }
    out
}
