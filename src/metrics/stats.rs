//! Risk class distribution statistics

use serde::Serialize;

/// Class balance of a batch of risk labels.
#[derive(Debug, Clone, Serialize)]
pub struct RiskDistribution {
    /// Rows classified high risk.
    pub high_risk: usize,
    /// Rows classified low risk.
    pub low_risk: usize,
}

impl RiskDistribution {
    /// Summarize risk values. With a threshold, values are binarized at
    /// `value >= threshold`; without one they are assumed already binary.
    pub fn from_risk(values: &[f64], threshold: Option<f64>) -> Self {
        let mut high_risk = 0;
        let mut low_risk = 0;

        for &v in values {
            let is_high = match threshold {
                Some(t) => v >= t,
                None => v > 0.5,
            };
            if is_high {
                high_risk += 1;
            } else {
                low_risk += 1;
            }
        }

        Self { high_risk, low_risk }
    }

    /// Percentage of high-risk rows, or `None` for an empty batch.
    pub fn percent_high(&self) -> Option<f64> {
        let total = self.high_risk + self.low_risk;
        if total == 0 {
            return None;
        }
        Some(100.0 * self.high_risk as f64 / total as f64)
    }
}
