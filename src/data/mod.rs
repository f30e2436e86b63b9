//! Dataset loading and assembly
//!
//! CSV loading with column validation, and the end-to-end assembly of a
//! train/validation split ready for a regression model: select, clean,
//! filter, encode, split, scale.

mod dataset;
mod loader;

pub use dataset::{Batches, ConjunctionDataset, DatasetConfig, OBJECT_TYPE_COLUMN, RISK_COLUMN};
pub use loader::{require_columns, save_csv, CdmLoader};
