//! Classification-style evaluation metrics for risk regression
//!
//! Continuous risk values are binarized at a reference threshold (-6 on the
//! log-risk scale by convention) and scored with recall-weighted F-beta.
//! A separate search scans the post-model probability scale for the decision
//! threshold that maximizes F-beta.

mod evaluation;
mod fbeta;
mod stats;
mod threshold;

pub use evaluation::{binarize, evaluate_risk, RiskEvaluation, DEFAULT_BETA, DEFAULT_RISK_THRESHOLD};
pub use fbeta::{confusion_counts, fbeta_from_counts, fbeta_score};
pub use stats::RiskDistribution;
pub use threshold::{find_best_threshold, THRESHOLD_CANDIDATES};
