//! F-beta score on binary labels

/// Confusion counts (tp, fp, tn, fn) over equal-length binary label slices.
/// Values are treated as positive when greater than 0.5.
pub fn confusion_counts(y_true: &[f64], y_pred: &[f64]) -> (usize, usize, usize, usize) {
    let mut tp = 0;
    let mut fp = 0;
    let mut tn = 0;
    let mut fn_ = 0;

    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        let t_bool = *t > 0.5;
        let p_bool = *p > 0.5;

        match (t_bool, p_bool) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fn_ += 1,
        }
    }

    (tp, fp, tn, fn_)
}

/// F-beta from confusion counts.
///
/// Returns 0 when both precision and recall are 0, the library convention
/// for degenerate inputs.
pub fn fbeta_from_counts(tp: usize, fp: usize, fn_: usize, beta: f64) -> f64 {
    let precision = if tp + fp > 0 {
        tp as f64 / (tp + fp) as f64
    } else {
        0.0
    };
    let recall = if tp + fn_ > 0 {
        tp as f64 / (tp + fn_) as f64
    } else {
        0.0
    };

    let beta_sq = beta * beta;
    let denominator = beta_sq * precision + recall;
    if denominator == 0.0 {
        return 0.0;
    }

    (1.0 + beta_sq) * precision * recall / denominator
}

/// F-beta score between binary true labels and binary predictions.
///
/// With beta > 1, recall is weighted more heavily than precision; beta = 2
/// penalizes a missed positive four times as much as a false alarm. A zero
/// score from zero precision and recall is returned as 0 and logged, since
/// it usually indicates a degenerate threshold.
pub fn fbeta_score(y_true: &[f64], y_pred: &[f64], beta: f64) -> f64 {
    let (tp, fp, _tn, fn_) = confusion_counts(y_true, y_pred);
    let score = fbeta_from_counts(tp, fp, fn_, beta);

    if score == 0.0 && tp + fp + fn_ > 0 {
        tracing::warn!(tp, fp, fn_ = fn_, "F-beta is 0: no true positives");
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = [0.0, 1.0, 1.0, 0.0];
        assert_eq!(fbeta_score(&y, &y, 2.0), 1.0);
    }

    #[test]
    fn test_confusion_counts() {
        let y_true = [1.0, 0.0, 1.0, 1.0, 0.0];
        let y_pred = [1.0, 1.0, 0.0, 1.0, 0.0];
        assert_eq!(confusion_counts(&y_true, &y_pred), (2, 1, 1, 1));
    }

    #[test]
    fn test_recall_weighting() {
        // precision 1/2, recall 1: F2 = 5 * 0.5 * 1 / (4 * 0.5 + 1)
        let y_true = [1.0, 0.0];
        let y_pred = [1.0, 1.0];
        let score = fbeta_score(&y_true, &y_pred, 2.0);
        assert!((score - 2.5 / 3.0).abs() < 1e-12);

        // precision 1, recall 1/2: F2 = 5 * 1 * 0.5 / (4 + 0.5)
        let y_true = [1.0, 1.0];
        let y_pred = [1.0, 0.0];
        let score = fbeta_score(&y_true, &y_pred, 2.0);
        assert!((score - 2.5 / 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_division_returns_zero() {
        // No positives anywhere: precision and recall are both 0.
        let y_true = [0.0, 0.0, 1.0];
        let y_pred = [0.0, 0.0, 0.0];
        assert_eq!(fbeta_score(&y_true, &y_pred, 2.0), 0.0);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fbeta_score(&[], &[], 2.0), 0.0);
    }
}
