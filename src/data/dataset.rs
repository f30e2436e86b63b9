//! Train/validation dataset assembly

use crate::data::loader::{require_columns, CdmLoader};
use crate::error::{KesslerError, Result};
use crate::events::filter_events;
use crate::preprocessing::{LabelEncoder, StandardScaler};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;

/// The regression label column.
pub const RISK_COLUMN: &str = "risk";

/// The only categorical column in the raw CDM schema: the type of the
/// object at collision risk with the satellite.
pub const OBJECT_TYPE_COLUMN: &str = "c_object_type";

/// Configuration for [`ConjunctionDataset`] assembly.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Feature columns to load; `None` loads everything. The `risk` label
    /// is always included.
    pub selected_columns: Option<Vec<String>>,
    /// Apply the event eligibility filter before splitting.
    pub apply_filter: bool,
    /// Fraction of rows held out for validation.
    pub split_ratio: f64,
    /// Seed for the split shuffle.
    pub random_state: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            selected_columns: None,
            apply_filter: false,
            split_ratio: 0.2,
            random_state: 42,
        }
    }
}

/// A cleaned, encoded, scaled train/validation split of CDM records.
///
/// Assembly order: column selection, null-row drop, optional event filter,
/// categorical encoding, shuffled split, scaling. The encoder and scaler
/// are fitted exactly once here and owned by the dataset afterwards;
/// [`ConjunctionDataset::transform_eval`] reuses them read-only so that
/// category codes and scale parameters stay consistent across splits.
#[derive(Debug)]
pub struct ConjunctionDataset {
    features_train: Array2<f64>,
    features_val: Array2<f64>,
    target_train: Array1<f64>,
    target_val: Array1<f64>,
    feature_names: Vec<String>,
    encoder: Option<LabelEncoder>,
    scaler: StandardScaler,
}

impl ConjunctionDataset {
    /// Assemble a dataset from a CSV file
    pub fn from_csv(path: impl AsRef<Path>, config: &DatasetConfig) -> Result<Self> {
        let df = CdmLoader::new().load_csv(path)?;
        Self::from_frame(df, config)
    }

    /// Assemble a dataset from an already loaded frame
    pub fn from_frame(df: DataFrame, config: &DatasetConfig) -> Result<Self> {
        if !(config.split_ratio > 0.0 && config.split_ratio < 1.0) {
            return Err(KesslerError::ValidationError(format!(
                "split_ratio must be in (0, 1), got {}",
                config.split_ratio
            )));
        }
        require_columns(&df, &[RISK_COLUMN])?;

        let mut df = match &config.selected_columns {
            Some(columns) => {
                let mut selection: Vec<&str> = columns.iter().map(|s| s.as_str()).collect();
                if !selection.contains(&RISK_COLUMN) {
                    selection.push(RISK_COLUMN);
                }
                require_columns(&df, &selection)?;
                df.select(selection.iter().copied())?
            }
            None => df,
        };

        df = drop_null_rows(&df)?;

        if config.apply_filter {
            let before = df.height();
            df = filter_events(&df)?;
            tracing::info!(before, after = df.height(), "applied event filter");
        }

        let mut encoder = None;
        if df.column(OBJECT_TYPE_COLUMN).is_ok() {
            let mut fitted = LabelEncoder::new();
            df = fitted.fit_transform(&df, &[OBJECT_TYPE_COLUMN])?;
            encoder = Some(fitted);
        }

        let n = df.height();
        let n_val = (n as f64 * config.split_ratio).ceil() as usize;
        if n_val == 0 || n_val >= n {
            return Err(KesslerError::ValidationError(format!(
                "cannot split {n} rows into a {n_val}-row validation set and a non-empty training set"
            )));
        }

        let target = Self::target_values(&df)?;
        let features = df.drop(RISK_COLUMN)?;
        let feature_names: Vec<String> = features
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(config.random_state);
        indices.shuffle(&mut rng);
        let (val_idx, train_idx) = indices.split_at(n_val);

        let train_frame = take_rows(&features, train_idx)?;
        let val_frame = take_rows(&features, val_idx)?;

        // Scale parameters come from the training rows only; the
        // validation rows are transformed with those same parameters.
        let mut scaler = StandardScaler::new();
        let columns: Vec<&str> = feature_names.iter().map(|s| s.as_str()).collect();
        let train_scaled = scaler.fit_transform(&train_frame, &columns)?;
        let val_scaled = scaler.transform(&val_frame)?;

        let features_train = to_feature_matrix(&train_scaled, &feature_names)?;
        let features_val = to_feature_matrix(&val_scaled, &feature_names)?;
        let target_train = Array1::from_iter(train_idx.iter().map(|&i| target[i]));
        let target_val = Array1::from_iter(val_idx.iter().map(|&i| target[i]));

        tracing::debug!(
            train = target_train.len(),
            val = target_val.len(),
            features = feature_names.len(),
            "assembled dataset"
        );

        Ok(Self {
            features_train,
            features_val,
            target_train,
            target_val,
            feature_names,
            encoder,
            scaler,
        })
    }

    /// Apply the fitted encoder and scaler to new data, without refitting.
    ///
    /// Returns the scaled feature matrix and the risk targets. Categories
    /// unseen at fit time are an error.
    pub fn transform_eval(&self, df: &DataFrame) -> Result<(Array2<f64>, Array1<f64>)> {
        let mut selection: Vec<&str> = self.feature_names.iter().map(|s| s.as_str()).collect();
        selection.push(RISK_COLUMN);
        require_columns(df, &selection)?;

        let df = df.select(selection.iter().copied())?;
        let df = drop_null_rows(&df)?;
        let df = match &self.encoder {
            Some(encoder) => encoder.transform(&df)?,
            None => df,
        };

        let target = Self::target_values(&df)?;
        let features = df.drop(RISK_COLUMN)?;
        let scaled = self.scaler.transform(&features)?;
        let matrix = to_feature_matrix(&scaled, &self.feature_names)?;

        Ok((matrix, Array1::from(target)))
    }

    /// Scaled training features, one row per record
    pub fn train_features(&self) -> &Array2<f64> {
        &self.features_train
    }

    /// Scaled validation features
    pub fn val_features(&self) -> &Array2<f64> {
        &self.features_val
    }

    /// Training risk targets
    pub fn train_target(&self) -> &Array1<f64> {
        &self.target_train
    }

    /// Validation risk targets
    pub fn val_target(&self) -> &Array1<f64> {
        &self.target_val
    }

    /// Feature column names, in matrix column order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The fitted categorical encoder, when the data had a categorical column
    pub fn encoder(&self) -> Option<&LabelEncoder> {
        self.encoder.as_ref()
    }

    /// The fitted feature scaler
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Iterate the training split in fixed-size batches (last may be short)
    pub fn train_batches(&self, batch_size: usize) -> Batches<'_> {
        Batches::new(&self.features_train, &self.target_train, batch_size)
    }

    /// Iterate the validation split in fixed-size batches
    pub fn val_batches(&self, batch_size: usize) -> Batches<'_> {
        Batches::new(&self.features_val, &self.target_val, batch_size)
    }

    /// The training split as a frame (scaled features plus risk), for export
    pub fn train_frame(&self) -> Result<DataFrame> {
        frame_from_split(&self.features_train, &self.target_train, &self.feature_names)
    }

    /// The validation split as a frame, for export
    pub fn val_frame(&self) -> Result<DataFrame> {
        frame_from_split(&self.features_val, &self.target_val, &self.feature_names)
    }

    fn target_values(df: &DataFrame) -> Result<Vec<f64>> {
        let series = df
            .column(RISK_COLUMN)
            .map_err(|_| KesslerError::MissingColumn(RISK_COLUMN.to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| KesslerError::DataError(e.to_string()))?;
        let ca = series
            .f64()
            .map_err(|e| KesslerError::DataError(e.to_string()))?;
        Ok(ca.into_no_null_iter().collect())
    }
}

/// Batch iterator over a split, in row order.
pub struct Batches<'a> {
    features: &'a Array2<f64>,
    target: &'a Array1<f64>,
    batch_size: usize,
    cursor: usize,
}

impl<'a> Batches<'a> {
    fn new(features: &'a Array2<f64>, target: &'a Array1<f64>, batch_size: usize) -> Self {
        Self {
            features,
            target,
            batch_size: batch_size.max(1),
            cursor: 0,
        }
    }
}

impl<'a> Iterator for Batches<'a> {
    type Item = (ArrayView2<'a, f64>, ArrayView1<'a, f64>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.features.nrows() {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.features.nrows());
        let batch = (
            self.features.slice(s![self.cursor..end, ..]),
            self.target.slice(s![self.cursor..end]),
        );
        self.cursor = end;
        Some(batch)
    }
}

/// Drop every row containing at least one null value.
fn drop_null_rows(df: &DataFrame) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];
    for col in df.get_columns() {
        let nulls = col.as_materialized_series().is_null();
        for (i, is_null) in nulls.into_no_null_iter().enumerate() {
            if is_null {
                keep[i] = false;
            }
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    df.filter(&mask).map_err(KesslerError::from)
}

fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    );
    df.take(&idx).map_err(KesslerError::from)
}

fn to_feature_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let mut matrix = Array2::zeros((df.height(), columns.len()));

    for (j, name) in columns.iter().enumerate() {
        let series = df
            .column(name.as_str())
            .map_err(|_| KesslerError::MissingColumn(name.clone()))?
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|_| {
                KesslerError::DataError(format!("column '{name}' is not numeric"))
            })?;
        let ca = series
            .f64()
            .map_err(|e| KesslerError::DataError(e.to_string()))?;

        for (i, value) in ca.into_iter().enumerate() {
            let v = value.ok_or_else(|| {
                KesslerError::DataError(format!("non-numeric value in column '{name}' at row {i}"))
            })?;
            matrix[[i, j]] = v;
        }
    }

    Ok(matrix)
}

fn frame_from_split(
    features: &Array2<f64>,
    target: &Array1<f64>,
    names: &[String],
) -> Result<DataFrame> {
    let mut columns: Vec<Column> = names
        .iter()
        .enumerate()
        .map(|(j, name)| Column::new(name.as_str().into(), features.column(j).to_vec()))
        .collect();
    columns.push(Column::new(RISK_COLUMN.into(), target.to_vec()));

    DataFrame::new(columns).map_err(KesslerError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_cdm_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "event_id,time_to_tca,miss_distance,c_object_type,risk").unwrap();
        writeln!(file, "1,5.0,140.0,DEBRIS,-7.2").unwrap();
        writeln!(file, "1,2.5,120.0,DEBRIS,-6.1").unwrap();
        writeln!(file, "2,10.0,900.0,PAYLOAD,-8.0").unwrap();
        writeln!(file, "2,3.0,850.0,PAYLOAD,-5.5").unwrap();
        writeln!(file, "3,7.0,300.0,DEBRIS,-9.0").unwrap();
        writeln!(file, "3,1.5,260.0,DEBRIS,-4.2").unwrap();
        writeln!(file, "4,4.0,500.0,ROCKET BODY,-6.8").unwrap();
        writeln!(file, "5,6.0,700.0,DEBRIS,-7.5").unwrap();
        writeln!(file, "5,2.0,650.0,DEBRIS,-6.9").unwrap();
        writeln!(file, "6,8.0,420.0,PAYLOAD,-8.3").unwrap();
        file
    }

    #[test]
    fn test_assembly_shapes() {
        let file = create_cdm_csv();
        let dataset =
            ConjunctionDataset::from_csv(file.path(), &DatasetConfig::default()).unwrap();

        // ceil(10 * 0.2) = 2 validation rows, 8 training rows.
        assert_eq!(dataset.train_features().nrows(), 8);
        assert_eq!(dataset.val_features().nrows(), 2);
        assert_eq!(dataset.train_target().len(), 8);
        assert_eq!(dataset.val_target().len(), 2);
        // risk is the target, not a feature
        assert_eq!(dataset.feature_names().len(), 4);
        assert!(!dataset.feature_names().contains(&RISK_COLUMN.to_string()));
        assert!(dataset.encoder().is_some());
    }

    #[test]
    fn test_training_features_are_standardized() {
        let file = create_cdm_csv();
        let dataset =
            ConjunctionDataset::from_csv(file.path(), &DatasetConfig::default()).unwrap();

        let j = dataset
            .feature_names()
            .iter()
            .position(|n| n == "miss_distance")
            .unwrap();
        let column = dataset.train_features().column(j);
        let mean = column.sum() / column.len() as f64;
        assert!(mean.abs() < 1e-10);
    }

    #[test]
    fn test_split_is_reproducible() {
        let file = create_cdm_csv();
        let config = DatasetConfig::default();
        let first = ConjunctionDataset::from_csv(file.path(), &config).unwrap();
        let second = ConjunctionDataset::from_csv(file.path(), &config).unwrap();

        assert_eq!(first.train_target(), second.train_target());
        assert_eq!(first.val_target(), second.val_target());
    }

    #[test]
    fn test_event_filter_reduces_to_eligible_rows() {
        let file = create_cdm_csv();
        let config = DatasetConfig {
            apply_filter: true,
            split_ratio: 0.34,
            ..DatasetConfig::default()
        };
        let dataset = ConjunctionDataset::from_csv(file.path(), &config).unwrap();

        // Events 1 (min 2.5), 2 (min 3.0), 5 (min 2.0) survive; event 3's
        // last CDM is inside the 2-day window and event 4/6 are singletons.
        assert_eq!(dataset.train_target().len() + dataset.val_target().len(), 3);
    }

    #[test]
    fn test_selected_columns_always_include_risk() {
        let file = create_cdm_csv();
        let config = DatasetConfig {
            selected_columns: Some(vec![
                "time_to_tca".to_string(),
                "miss_distance".to_string(),
            ]),
            ..DatasetConfig::default()
        };
        let dataset = ConjunctionDataset::from_csv(file.path(), &config).unwrap();

        let names: Vec<&str> = dataset.feature_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["time_to_tca", "miss_distance"]);
        assert_eq!(dataset.train_target().len(), 8);
    }

    #[test]
    fn test_transform_eval_reuses_fitted_state() {
        let file = create_cdm_csv();
        let dataset =
            ConjunctionDataset::from_csv(file.path(), &DatasetConfig::default()).unwrap();

        let eval = DataFrame::new(vec![
            Column::new("event_id".into(), &[9i64]),
            Column::new("time_to_tca".into(), &[4.5]),
            Column::new("miss_distance".into(), &[333.0]),
            Column::new("c_object_type".into(), &["PAYLOAD"]),
            Column::new("risk".into(), &[-5.0]),
        ])
        .unwrap();

        let (features, target) = dataset.transform_eval(&eval).unwrap();
        assert_eq!(features.nrows(), 1);
        assert_eq!(features.ncols(), dataset.feature_names().len());
        assert_eq!(target[0], -5.0);
    }

    #[test]
    fn test_transform_eval_rejects_unseen_category() {
        let file = create_cdm_csv();
        let dataset =
            ConjunctionDataset::from_csv(file.path(), &DatasetConfig::default()).unwrap();

        let eval = DataFrame::new(vec![
            Column::new("event_id".into(), &[9i64]),
            Column::new("time_to_tca".into(), &[4.5]),
            Column::new("miss_distance".into(), &[333.0]),
            Column::new("c_object_type".into(), &["TBA"]),
            Column::new("risk".into(), &[-5.0]),
        ])
        .unwrap();

        let err = dataset.transform_eval(&eval).unwrap_err();
        assert!(matches!(err, KesslerError::UnknownCategory { .. }));
    }

    #[test]
    fn test_missing_risk_column_fails_fast() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "event_id,time_to_tca").unwrap();
        writeln!(file, "1,5.0").unwrap();
        writeln!(file, "2,3.0").unwrap();

        let err =
            ConjunctionDataset::from_csv(file.path(), &DatasetConfig::default()).unwrap_err();
        assert!(matches!(err, KesslerError::MissingColumn(c) if c == RISK_COLUMN));
    }

    #[test]
    fn test_batches_cover_split_in_order() {
        let file = create_cdm_csv();
        let dataset =
            ConjunctionDataset::from_csv(file.path(), &DatasetConfig::default()).unwrap();

        let batches: Vec<_> = dataset.train_batches(3).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].0.nrows(), 3);
        assert_eq!(batches[2].0.nrows(), 2); // 8 rows -> 3 + 3 + 2

        let total: usize = batches.iter().map(|(f, _)| f.nrows()).sum();
        assert_eq!(total, dataset.train_features().nrows());

        let rebuilt: Vec<f64> = batches
            .iter()
            .flat_map(|(_, t)| t.iter().copied().collect::<Vec<_>>())
            .collect();
        assert_eq!(rebuilt, dataset.train_target().to_vec());
    }

    #[test]
    fn test_invalid_split_ratio_fails() {
        let file = create_cdm_csv();
        let config = DatasetConfig {
            split_ratio: 1.0,
            ..DatasetConfig::default()
        };
        let err = ConjunctionDataset::from_csv(file.path(), &config).unwrap_err();
        assert!(matches!(err, KesslerError::ValidationError(_)));
    }
}
