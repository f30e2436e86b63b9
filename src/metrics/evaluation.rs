//! Composite evaluation of continuous risk predictions

use crate::error::{KesslerError, Result};
use serde::Serialize;

use super::fbeta::fbeta_score;

/// Default F-beta weighting: recall counts four times as much as precision.
pub const DEFAULT_BETA: f64 = 2.0;

/// Default binarization boundary on the raw log-risk scale. Risk below -6
/// is treated as negligible collision probability by domain convention.
pub const DEFAULT_RISK_THRESHOLD: f64 = -6.0;

/// Evaluation results for a batch of risk predictions.
#[derive(Debug, Clone, Serialize)]
pub struct RiskEvaluation {
    /// F-beta between true and predicted labels binarized at the threshold.
    pub f_beta: f64,
    /// Mean squared error restricted to rows whose true risk reaches the
    /// threshold. Errors on clearly-safe events are less consequential, so
    /// regression accuracy is measured on the dangerous subpopulation only.
    pub mse_high_risk: f64,
    /// `mse_high_risk / f_beta`, lower is better.
    pub composite: f64,
}

/// Binarize continuous values at a threshold: `value >= threshold -> 1`.
pub fn binarize(values: &[f64], threshold: f64) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v >= threshold { 1.0 } else { 0.0 })
        .collect()
}

/// Score continuous predictions against continuous true risk values.
///
/// Both sequences are binarized at `threshold` (identically, `>=`) for the
/// F-beta component; the high-risk MSE is computed on the original
/// continuous values where the true risk reaches the threshold.
///
/// Fails explicitly rather than returning misleading numbers: on length
/// mismatch, when no true value reaches the threshold (the high-risk mean
/// would be over an empty set, usually a mis-configured threshold or
/// dataset), and when F-beta is 0 (the composite quotient is undefined).
pub fn evaluate_risk(
    y_true: &[f64],
    y_pred: &[f64],
    beta: f64,
    threshold: f64,
) -> Result<RiskEvaluation> {
    if y_true.len() != y_pred.len() {
        return Err(KesslerError::ShapeError(format!(
            "{} true values vs {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }

    let true_binary = binarize(y_true, threshold);
    let pred_binary = binarize(y_pred, threshold);
    let f_beta = fbeta_score(&true_binary, &pred_binary, beta);

    let high_risk: Vec<(f64, f64)> = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, _)| **t >= threshold)
        .map(|(t, p)| (*t, *p))
        .collect();

    if high_risk.is_empty() {
        return Err(KesslerError::ValidationError(format!(
            "no true risk values at or above threshold {threshold}; high-risk MSE is undefined"
        )));
    }

    let mse_high_risk = high_risk
        .iter()
        .map(|(t, p)| (t - p) * (t - p))
        .sum::<f64>()
        / high_risk.len() as f64;

    if f_beta == 0.0 {
        return Err(KesslerError::ComputationError(
            "F-beta score is 0; composite score is undefined".to_string(),
        ));
    }

    Ok(RiskEvaluation {
        f_beta,
        mse_high_risk,
        composite: mse_high_risk / f_beta,
    })
}
