//! Error types for the kessler crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KesslerError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("Component is not fitted")]
    NotFitted,

    #[error("Shape mismatch: {0}")]
    ShapeError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, KesslerError>;
