use std::collections::HashMap;
use std::collections::hash_map::Entry;

use formats::{Feature, FeatureCollection, Record, Table};
use tracing::{debug, warn};

/// Field names that define the feature/record join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKeys {
    /// Feature property holding the identifier, e.g. `GEOID`.
    pub id_field: String,
    /// Record column holding the state code, e.g. `STATE_FIP`.
    pub state_field: String,
    /// Record column holding the county code, e.g. `COUNTY_FIP`.
    pub county_field: String,
}

impl JoinKeys {
    pub fn new(
        id_field: impl Into<String>,
        state_field: impl Into<String>,
        county_field: impl Into<String>,
    ) -> Self {
        Self {
            id_field: id_field.into(),
            state_field: state_field.into(),
            county_field: county_field.into(),
        }
    }

    /// `state + county`, or `None` when the record lacks either column.
    pub fn record_key(&self, record: &Record) -> Option<String> {
        let state = record.get(&self.state_field)?;
        let county = record.get(&self.county_field)?;
        Some(format!("{state}{county}"))
    }

    pub fn feature_key<'a>(&self, feature: &'a Feature) -> Option<&'a str> {
        feature.property_str(&self.id_field)
    }
}

/// A feature paired with the record that matched it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedFeature {
    pub feature: Feature,
    pub record: Option<Record>,
}

impl JoinedFeature {
    pub fn has_data(&self) -> bool {
        self.record.is_some()
    }

    /// Numeric value of `column` on the matched record. `None` for unmatched
    /// features and for missing or malformed cells.
    pub fn value(&self, column: &str) -> Option<f64> {
        self.record.as_ref()?.number(column)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinReport {
    pub matched: usize,
    pub unmatched: usize,
    /// Features without a string identifier property.
    pub missing_identifier: usize,
    /// Records without both key columns.
    pub records_without_key: usize,
    /// Keys carried by more than one record, in order of first repetition.
    /// Only the first record with each key takes part in the join.
    pub duplicate_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedCollection {
    pub features: Vec<JoinedFeature>,
    pub report: JoinReport,
}

impl JoinedCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Attaches to every feature the first record whose `state + county` equals the
/// feature's identifier, compared as exact strings.
///
/// Every feature is kept, in input order. Later records that repeat a key are
/// ignored and listed in the report.
pub fn join(features: FeatureCollection, table: &Table, keys: &JoinKeys) -> JoinedCollection {
    let mut report = JoinReport::default();

    let mut index: HashMap<String, usize> = HashMap::with_capacity(table.len());
    for (i, record) in table.records.iter().enumerate() {
        let Some(key) = keys.record_key(record) else {
            report.records_without_key += 1;
            continue;
        };
        match index.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(i);
            }
            Entry::Occupied(slot) => {
                if !report.duplicate_keys.contains(slot.key()) {
                    report.duplicate_keys.push(slot.key().clone());
                }
            }
        }
    }

    let mut out = Vec::with_capacity(features.len());
    for feature in features.features {
        let record = match keys.feature_key(&feature) {
            Some(id) => index.get(id).map(|&i| table.records[i].clone()),
            None => {
                report.missing_identifier += 1;
                None
            }
        };
        if record.is_some() {
            report.matched += 1;
        } else {
            report.unmatched += 1;
        }
        out.push(JoinedFeature { feature, record });
    }

    debug!(
        matched = report.matched,
        unmatched = report.unmatched,
        missing_identifier = report.missing_identifier,
        records_without_key = report.records_without_key,
        "joined records to features"
    );
    if !report.duplicate_keys.is_empty() {
        warn!(
            count = report.duplicate_keys.len(),
            first = %report.duplicate_keys[0],
            "duplicate join keys in table; first record wins"
        );
    }

    JoinedCollection {
        features: out,
        report,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{JoinKeys, join};
    use formats::{Feature, FeatureCollection, Record, Table};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    pub(crate) fn county(geoid: &str) -> Feature {
        let mut properties = serde_json::Map::new();
        properties.insert("GEOID".to_string(), json!(geoid));
        Feature {
            id: None,
            properties,
            geometry: None,
        }
    }

    pub(crate) fn keys() -> JoinKeys {
        JoinKeys::new("GEOID", "STATE_FIP", "COUNTY_FIP")
    }

    pub(crate) fn table(csv: &str) -> Table {
        Table::from_csv_str(csv).expect("parse csv")
    }

    #[test]
    fn matches_concatenated_state_and_county() {
        let fc = FeatureCollection {
            features: vec![county("38015"), county("99999")],
        };
        let t = table("STATE_FIP,COUNTY_FIP,NAME,2001\n38,015,Burleigh,2.6\n38,017,Cass,2.4\n");
        let joined = join(fc, &t, &keys());

        assert_eq!(joined.len(), 2);
        let hit = &joined.features[0];
        let record = hit.record.as_ref().expect("38015 matched");
        assert_eq!(keys().record_key(record).as_deref(), Some("38015"));
        assert_eq!(keys().feature_key(&hit.feature), Some("38015"));
        assert_eq!(hit.value("2001"), Some(2.6));

        let miss = &joined.features[1];
        assert!(!miss.has_data());
        assert_eq!(miss.value("2001"), None);

        assert_eq!(joined.report.matched, 1);
        assert_eq!(joined.report.unmatched, 1);
    }

    #[test]
    fn first_record_wins_for_duplicate_keys() {
        let fc = FeatureCollection {
            features: vec![county("38015")],
        };
        let t = table("STATE_FIP,COUNTY_FIP,2001\n38,015,1.0\n38,015,9.0\n38,015,7.0\n");
        let joined = join(fc, &t, &keys());
        assert_eq!(joined.features[0].value("2001"), Some(1.0));
        assert_eq!(joined.report.duplicate_keys, vec!["38015".to_string()]);
    }

    #[test]
    fn key_comparison_is_exact() {
        // Leading zeros matter; "38" + "15" is not "38015".
        let fc = FeatureCollection {
            features: vec![county("38015")],
        };
        let t = table("STATE_FIP,COUNTY_FIP,2001\n38,15,1.0\n");
        let joined = join(fc, &t, &keys());
        assert!(!joined.features[0].has_data());
    }

    #[test]
    fn features_without_identifier_are_unmatched() {
        let mut numeric = county("x");
        numeric
            .properties
            .insert("GEOID".to_string(), json!(38015));
        let fc = FeatureCollection {
            features: vec![numeric],
        };
        let t = table("STATE_FIP,COUNTY_FIP,2001\n38,015,1.0\n");
        let joined = join(fc, &t, &keys());
        assert_eq!(joined.report.missing_identifier, 1);
        assert_eq!(joined.report.unmatched, 1);
    }

    #[test]
    fn records_missing_key_columns_are_counted() {
        let t = Table {
            headers: vec!["STATE_FIP".to_string()],
            records: vec![Record::new(vec![("STATE_FIP".into(), "38".into())])],
        };
        let joined = join(FeatureCollection::default(), &t, &keys());
        assert_eq!(joined.report.records_without_key, 1);
        assert!(joined.is_empty());
    }
}
