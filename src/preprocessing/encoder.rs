//! Categorical label encoding

use crate::error::{KesslerError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps categorical string values to integer codes.
///
/// The mapping is a bijection fixed at fit time: classes are the sorted
/// unique values of each fitted column, coded by sort position. Values not
/// seen during fit are an error at transform time, never a default code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Per column: sorted class values, code = index.
    classes: HashMap<String, Vec<String>>,
    /// Per column: value -> code lookup.
    codes: HashMap<String, HashMap<String, i64>>,
    is_fitted: bool,
}

impl LabelEncoder {
    /// Create a new, unfitted encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the encoder on the given columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let values = Self::string_values(df, col_name)?;

            // BTreeSet dedups and yields the classes in sort order, so the
            // code assignment matches the sorted-unique convention.
            let classes: Vec<String> = values
                .into_iter()
                .flatten()
                .collect::<std::collections::BTreeSet<_>>()
                .into_iter()
                .collect();

            let codes: HashMap<String, i64> = classes
                .iter()
                .enumerate()
                .map(|(code, value)| (value.clone(), code as i64))
                .collect();

            self.classes.insert(col_name.to_string(), classes);
            self.codes.insert(col_name.to_string(), codes);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace every fitted column present in `df` with its integer codes.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(KesslerError::NotFitted);
        }

        let mut replacements: Vec<Series> = Vec::new();
        for (col_name, codes) in &self.codes {
            if df.column(col_name).is_err() {
                continue;
            }
            let values = Self::string_values(df, col_name)?;

            let mut encoded: Vec<Option<i64>> = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    None => encoded.push(None),
                    Some(v) => {
                        let code = codes.get(&v).ok_or_else(|| KesslerError::UnknownCategory {
                            column: col_name.clone(),
                            value: v,
                        })?;
                        encoded.push(Some(*code));
                    }
                }
            }

            let ca: Int64Chunked = encoded.into_iter().collect();
            replacements.push(ca.with_name(col_name.as_str().into()).into_series());
        }

        let mut result = df.clone();
        for encoded in replacements {
            result = result
                .with_column(encoded)
                .map_err(|e| KesslerError::DataError(e.to_string()))?
                .clone();
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Sorted class values of a fitted column
    pub fn classes(&self, column: &str) -> Option<&[String]> {
        self.classes.get(column).map(|c| c.as_slice())
    }

    fn string_values(df: &DataFrame, col_name: &str) -> Result<Vec<Option<String>>> {
        let series = df
            .column(col_name)
            .map_err(|_| KesslerError::MissingColumn(col_name.to_string()))?
            .as_materialized_series()
            .cast(&DataType::String)
            .map_err(|e| KesslerError::DataError(e.to_string()))?;
        let ca = series
            .str()
            .map_err(|e| KesslerError::DataError(e.to_string()))?;

        Ok(ca.into_iter().map(|v| v.map(|s| s.to_string())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_frame(values: &[&str]) -> DataFrame {
        DataFrame::new(vec![Column::new("c_object_type".into(), values)]).unwrap()
    }

    #[test]
    fn test_codes_follow_sort_order() {
        let df = object_frame(&["PAYLOAD", "DEBRIS", "PAYLOAD", "ROCKET BODY"]);

        let mut encoder = LabelEncoder::new();
        let encoded = encoder.fit_transform(&df, &["c_object_type"]).unwrap();

        let col = encoded.column("c_object_type").unwrap().i64().unwrap();
        // DEBRIS = 0, PAYLOAD = 1, ROCKET BODY = 2
        assert_eq!(col.get(0), Some(1));
        assert_eq!(col.get(1), Some(0));
        assert_eq!(col.get(2), Some(1));
        assert_eq!(col.get(3), Some(2));
        let classes: Vec<&str> = encoder
            .classes("c_object_type")
            .unwrap()
            .iter()
            .map(|s| s.as_str())
            .collect();
        assert_eq!(classes, vec!["DEBRIS", "PAYLOAD", "ROCKET BODY"]);
    }

    #[test]
    fn test_codes_stay_consistent_across_transforms() {
        let train = object_frame(&["DEBRIS", "PAYLOAD", "ROCKET BODY"]);
        let eval = object_frame(&["ROCKET BODY", "DEBRIS"]);

        let mut encoder = LabelEncoder::new();
        encoder.fit(&train, &["c_object_type"]).unwrap();

        let encoded = encoder.transform(&eval).unwrap();
        let col = encoded.column("c_object_type").unwrap().i64().unwrap();
        assert_eq!(col.get(0), Some(2));
        assert_eq!(col.get(1), Some(0));
    }

    #[test]
    fn test_unseen_category_is_an_error() {
        let train = object_frame(&["DEBRIS", "PAYLOAD"]);
        let eval = object_frame(&["UNKNOWN OBJECT"]);

        let mut encoder = LabelEncoder::new();
        encoder.fit(&train, &["c_object_type"]).unwrap();

        let err = encoder.transform(&eval).unwrap_err();
        assert!(matches!(
            err,
            KesslerError::UnknownCategory { column, value }
                if column == "c_object_type" && value == "UNKNOWN OBJECT"
        ));
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let df = object_frame(&["DEBRIS"]);
        let encoder = LabelEncoder::new();
        assert!(matches!(
            encoder.transform(&df).unwrap_err(),
            KesslerError::NotFitted
        ));
    }
}
