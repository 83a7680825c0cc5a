//! Quantile Table Implementation

use crate::error::LoadError;
use crate::{BOUNDARY_COUNT, MIN_BOUNDARIES};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Immutable feature name -> quantile boundaries mapping
///
/// Feature names match exactly (case and formatting included), e.g.
/// `"SIO2(WT%)"` and `"sio2(wt%)"` are different features. Every boundary
/// sequence is finite, non-decreasing and holds between [`MIN_BOUNDARIES`]
/// and [`BOUNDARY_COUNT`] values.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileTable {
    boundaries: HashMap<String, Vec<f64>>,
}

impl QuantileTable {
    /// Build a table from an already-parsed mapping, validating every entry
    pub fn from_map(boundaries: HashMap<String, Vec<f64>>) -> Result<Self, LoadError> {
        if boundaries.is_empty() {
            return Err(LoadError::Empty);
        }

        for (feature, values) in &boundaries {
            validate_boundaries(feature, values)?;
            debug!("Validated {} boundaries for {}", values.len(), feature);
        }

        Ok(Self { boundaries })
    }

    /// Parse a JSON artifact of the form `{"NAME": [b0, b1, ...], ...}`
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let boundaries: HashMap<String, Vec<f64>> = serde_json::from_str(json)?;
        Self::from_map(boundaries)
    }

    /// Parse a JSON artifact from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let boundaries: HashMap<String, Vec<f64>> = serde_json::from_reader(reader)?;
        Self::from_map(boundaries)
    }

    /// Load a JSON artifact from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::from_json_str(&json)?;
        info!(
            "Loaded quantile table: {} features from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Boundaries for a feature, or `None` if the table has no such entry
    pub fn lookup(&self, feature: &str) -> Option<&[f64]> {
        self.boundaries.get(feature).map(Vec::as_slice)
    }

    /// Whether the table has an entry for this feature
    pub fn contains(&self, feature: &str) -> bool {
        self.boundaries.contains_key(feature)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// Whether the table is empty (never true for a loaded table)
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Feature names in sorted order
    pub fn feature_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.boundaries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Requested names that have no entry, in request order
    pub fn missing_features<'a, S: AsRef<str>>(&self, names: &'a [S]) -> Vec<&'a str> {
        names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !self.contains(name))
            .collect()
    }
}

impl FromStr for QuantileTable {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_str(s)
    }
}

fn validate_boundaries(feature: &str, values: &[f64]) -> Result<(), LoadError> {
    if values.len() < MIN_BOUNDARIES || values.len() > BOUNDARY_COUNT {
        return Err(LoadError::BoundaryCount {
            feature: feature.to_string(),
            count: values.len(),
            min: MIN_BOUNDARIES,
            max: BOUNDARY_COUNT,
        });
    }

    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(LoadError::NonFinite {
            feature: feature.to_string(),
            index,
        });
    }

    // Duplicates are legal: skewed features repeat quantiles
    for (index, pair) in values.windows(2).enumerate() {
        if pair[0] > pair[1] {
            return Err(LoadError::NotMonotonic {
                feature: feature.to_string(),
                index: index + 1,
                previous: pair[0],
                current: pair[1],
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ladder() -> Vec<f64> {
        (1..=BOUNDARY_COUNT).map(|i| i as f64 * 10.0).collect()
    }

    fn table_json(entries: &[(&str, Vec<f64>)]) -> String {
        let map: HashMap<&str, &Vec<f64>> = entries.iter().map(|(k, v)| (*k, v)).collect();
        serde_json::to_string(&map).unwrap()
    }

    #[test]
    fn test_load_and_lookup() {
        let json = table_json(&[("SIO2(WT%)", ladder()), ("TH(PPM)", ladder())]);
        let table: QuantileTable = json.parse().unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("SIO2(WT%)").unwrap().len(), BOUNDARY_COUNT);
        assert_eq!(table.lookup("SIO2(WT%)").unwrap()[0], 10.0);
        assert_eq!(table.feature_names(), vec!["SIO2(WT%)", "TH(PPM)"]);
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let json = table_json(&[("SIO2(WT%)", ladder())]);
        let table = QuantileTable::from_json_str(&json).unwrap();

        assert!(table.lookup("SIO2(WT%)").is_some());
        assert!(table.lookup("sio2(wt%)").is_none());
        assert!(table.lookup("SIO2 (WT%)").is_none());
        assert!(table.lookup("SIO2").is_none());
    }

    #[test]
    fn test_duplicates_allowed() {
        let mut values = ladder();
        values[1] = values[0];
        values[2] = values[0];
        let json = table_json(&[("K2O(WT%)", values)]);
        assert!(QuantileTable::from_json_str(&json).is_ok());
    }

    #[test]
    fn test_descending_rejected() {
        let mut values = ladder();
        values[100] = 0.0;
        let json = table_json(&[("K2O(WT%)", values)]);

        match QuantileTable::from_json_str(&json) {
            Err(LoadError::NotMonotonic { feature, index, .. }) => {
                assert_eq!(feature, "K2O(WT%)");
                assert_eq!(index, 100);
            }
            other => panic!("expected NotMonotonic, got {:?}", other),
        }
    }

    #[test]
    fn test_boundary_count_limits() {
        let too_short = table_json(&[("Y(PPM)", vec![1.0])]);
        assert!(matches!(
            QuantileTable::from_json_str(&too_short),
            Err(LoadError::BoundaryCount { count: 1, .. })
        ));

        let mut long = ladder();
        long.push(99_999.0);
        let too_long = table_json(&[("Y(PPM)", long)]);
        assert!(matches!(
            QuantileTable::from_json_str(&too_long),
            Err(LoadError::BoundaryCount { count: 255, .. })
        ));

        let minimal = table_json(&[("Y(PPM)", vec![1.0, 2.0])]);
        assert!(QuantileTable::from_json_str(&minimal).is_ok());
    }

    #[test]
    fn test_malformed_artifact() {
        assert!(matches!(
            QuantileTable::from_json_str("not json"),
            Err(LoadError::Parse(_))
        ));
        assert!(matches!(
            QuantileTable::from_json_str(r#"{"SIO2(WT%)": "oops"}"#),
            Err(LoadError::Parse(_))
        ));
        assert!(matches!(
            QuantileTable::from_json_str(r#"{"SIO2(WT%)": [1.0, null]}"#),
            Err(LoadError::Parse(_))
        ));
        assert!(matches!(
            QuantileTable::from_json_str("{}"),
            Err(LoadError::Empty)
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut map = HashMap::new();
        map.insert("CE(PPM)".to_string(), vec![1.0, f64::INFINITY]);
        assert!(matches!(
            QuantileTable::from_map(map),
            Err(LoadError::NonFinite { index: 1, .. })
        ));
    }

    #[test]
    fn test_missing_path() {
        let err = QuantileTable::from_path("/nonexistent/saved_quantiles.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("saved_quantiles.json"));
    }

    #[test]
    fn test_from_reader() {
        let json = table_json(&[("LA(PPM)", ladder())]);
        let table = QuantileTable::from_reader(json.as_bytes()).unwrap();
        assert!(table.contains("LA(PPM)"));
    }

    #[test]
    fn test_missing_features() {
        let json = table_json(&[("NB(PPM)", ladder())]);
        let table = QuantileTable::from_json_str(&json).unwrap();
        let requested = ["NB(PPM)", "TA(PPM)", "HF(PPM)"];
        assert_eq!(table.missing_features(&requested), vec!["TA(PPM)", "HF(PPM)"]);
    }

    proptest! {
        #[test]
        fn sorted_sequences_always_load(mut values in prop::collection::vec(-1e6f64..1e6, 2..=BOUNDARY_COUNT)) {
            values.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let mut map = HashMap::new();
            map.insert("ZR(PPM)".to_string(), values);
            prop_assert!(QuantileTable::from_map(map).is_ok());
        }
    }
}
