//! Kessler - Conjunction event data preparation and evaluation
//!
//! This crate prepares tabular Conjunction Data Message (CDM) datasets for
//! collision-risk regression and scores the resulting predictions:
//! - CSV loading and a cleaned, encoded train/validation split
//! - Event eligibility filtering under time-to-closest-approach constraints
//! - Recall-weighted F-beta evaluation with decision-threshold search
//!
//! # Modules
//!
//! - [`data`] - CSV loading and dataset assembly
//! - [`events`] - Event grouping and the eligibility filter
//! - [`preprocessing`] - Fit-once categorical encoding and feature scaling
//! - [`metrics`] - F-beta, threshold search, composite scoring
//! - [`cli`] - Command-line interface

pub mod error;

pub mod data;
pub mod events;
pub mod metrics;
pub mod preprocessing;

pub mod cli;

pub use error::{KesslerError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{KesslerError, Result};

    pub use crate::data::{ConjunctionDataset, DatasetConfig, CdmLoader};
    pub use crate::events::filter_events;
    pub use crate::metrics::{
        evaluate_risk, fbeta_score, find_best_threshold, RiskDistribution, RiskEvaluation,
    };
    pub use crate::preprocessing::{LabelEncoder, StandardScaler};
}
