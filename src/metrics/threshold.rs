//! Best-threshold search over the post-model probability scale

use super::fbeta::{confusion_counts, fbeta_from_counts};

/// Number of evenly spaced candidate thresholds scanned over [0, 1].
pub const THRESHOLD_CANDIDATES: usize = 1000;

const BETA: f64 = 2.0;

/// Find the decision threshold in [0, 1] maximizing the F2 score.
///
/// `y_true` holds binary {0, 1} ground truth; `predictions` are continuous
/// probability-like scores in [0, 1]. Note this threshold space is the
/// model's output scale, not the raw log-risk scale used elsewhere.
///
/// Scans [`THRESHOLD_CANDIDATES`] candidates with step 1/999, binarizing
/// predictions as `p >= t`. Strict comparison keeps the lowest threshold on
/// score ties. Returns `(best_threshold, best_score)`; empty input yields
/// the neutral `(0.0, 0.0)`. O(candidates x samples), intended for batch
/// offline use only.
pub fn find_best_threshold(y_true: &[f64], predictions: &[f64]) -> (f64, f64) {
    let mut best_threshold = 0.0;
    let mut best_score = -1.0;

    for step in 0..THRESHOLD_CANDIDATES {
        let threshold = step as f64 / (THRESHOLD_CANDIDATES - 1) as f64;

        let binarized: Vec<f64> = predictions
            .iter()
            .map(|&p| if p >= threshold { 1.0 } else { 0.0 })
            .collect();
        let (tp, fp, _tn, fn_) = confusion_counts(y_true, &binarized);
        let score = fbeta_from_counts(tp, fp, fn_, BETA);

        if score > best_score {
            best_score = score;
            best_threshold = threshold;
        }
    }

    (best_threshold, best_score)
}
