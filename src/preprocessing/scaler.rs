//! Feature scaling

use crate::error::{KesslerError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters for one fitted column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnParams {
    mean: f64,
    std: f64,
}

/// Standard (z-score) feature scaler: (x - mean) / std per column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: HashMap<String, ColumnParams>,
    is_fitted: bool,
}

impl StandardScaler {
    /// Create a new, unfitted scaler
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the scaler to the given columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let ca = Self::float_column(df, col_name)?;

            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(1).unwrap_or(1.0);
            self.params.insert(
                col_name.to_string(),
                ColumnParams {
                    mean,
                    // A constant column scales to 0 rather than NaN.
                    std: if std == 0.0 { 1.0 } else { std },
                },
            );
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale every fitted column present in `df`.
    /// Builds all replacement columns first, then applies them in one pass.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(KesslerError::NotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter(|(col_name, _)| df.column(col_name).is_ok())
            .map(|(col_name, params)| {
                let ca = Self::float_column(df, col_name)?;
                let scaled: Float64Chunked = ca
                    .into_iter()
                    .map(|opt| opt.map(|v| (v - params.mean) / params.std))
                    .collect();
                Ok(scaled.with_name(col_name.as_str().into()).into_series())
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result = result
                .with_column(scaled)
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

    /// Undo the scaling, recovering approximate original values.
    pub fn inverse_transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(KesslerError::NotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter(|(col_name, _)| df.column(col_name).is_ok())
            .map(|(col_name, params)| {
                let ca = Self::float_column(df, col_name)?;
                let unscaled: Float64Chunked = ca
                    .into_iter()
                    .map(|opt| opt.map(|v| v * params.std + params.mean))
                    .collect();
                Ok(unscaled.with_name(col_name.as_str().into()).into_series())
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for unscaled in replacements {
            result = result
                .with_column(unscaled)
                .map_err(|e| KesslerError::DataError(e.to_string()))?
                .clone();
        }

        Ok(result)
    }

    fn float_column(df: &DataFrame, col_name: &str) -> Result<Float64Chunked> {
        let series = df
            .column(col_name)
            .map_err(|_| KesslerError::MissingColumn(col_name.to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| KesslerError::DataError(e.to_string()))?;
        series
            .f64()
            .map(|ca| ca.clone())
            .map_err(|e| KesslerError::DataError(e.to_string()))
    }
}
