//! Evaluation metrics for the two-track classifier.
//!
//! [`EvaluationReport::from_predictions`] computes accuracy, per-class
//! precision/recall/F1 with support, macro and weighted averages and the
//! confusion matrix (rows are true labels, columns predictions, both in class
//! order). An undefined ratio (zero denominator) is reported as `0.0`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AbstrakError, Result};
use crate::track::Track;

/// Precision, recall and F1 of one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub track: Track,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true samples of this class.
    pub support: usize,
}

/// Averaged precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Descriptive evaluation of predictions against ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub per_class: Vec<ClassMetrics>,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    /// `confusion_matrix[true][predicted]` in class order.
    pub confusion_matrix: [[usize; 2]; 2],
    pub support: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl EvaluationReport {
    /// Build a report from parallel slices of true and predicted labels.
    pub fn from_predictions(y_true: &[Track], y_pred: &[Track]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(AbstrakError::invalid_argument(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(AbstrakError::invalid_argument(
                "cannot evaluate an empty test set",
            ));
        }

        let mut matrix = [[0usize; 2]; 2];
        for (t, p) in y_true.iter().zip(y_pred) {
            matrix[t.index()][p.index()] += 1;
        }

        let n = y_true.len();
        let correct = matrix[0][0] + matrix[1][1];

        let per_class: Vec<ClassMetrics> = Track::ALL
            .into_iter()
            .map(|track| {
                let c = track.index();
                let tp = matrix[c][c];
                let predicted = matrix[0][c] + matrix[1][c];
                let support = matrix[c][0] + matrix[c][1];
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    track,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let k = per_class.len() as f64;
        let macro_avg = AverageMetrics {
            precision: per_class.iter().map(|m| m.precision).sum::<f64>() / k,
            recall: per_class.iter().map(|m| m.recall).sum::<f64>() / k,
            f1: per_class.iter().map(|m| m.f1).sum::<f64>() / k,
        };
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            per_class
                .iter()
                .map(|m| f(m) * m.support as f64)
                .sum::<f64>()
                / n as f64
        };
        let weighted_avg = AverageMetrics {
            precision: weighted(|m: &ClassMetrics| m.precision),
            recall: weighted(|m: &ClassMetrics| m.recall),
            f1: weighted(|m: &ClassMetrics| m.f1),
        };

        Ok(Self {
            accuracy: ratio(correct, n),
            per_class,
            macro_avg,
            weighted_avg,
            confusion_matrix: matrix,
            support: n,
        })
    }

    /// Metrics of one class.
    pub fn class(&self, track: Track) -> Option<&ClassMetrics> {
        self.per_class.iter().find(|m| m.track == track)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                m.track.code(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, avg.precision, avg.recall, avg.f1, self.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows = true, columns = predicted):")?;
        writeln!(f, "{:>6} {:>6} {:>6}", "", Track::Rpl, Track::Tkj)?;
        for track in Track::ALL {
            let row = self.confusion_matrix[track.index()];
            writeln!(f, "{:>6} {:>6} {:>6}", track.code(), row[0], row[1])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Track::{Rpl, Tkj};

    #[test]
    fn test_report_values() {
        let y_true = [Rpl, Rpl, Rpl, Tkj, Tkj];
        let y_pred = [Rpl, Rpl, Tkj, Tkj, Rpl];
        let report = EvaluationReport::from_predictions(&y_true, &y_pred).unwrap();

        assert!((report.accuracy - 0.6).abs() < 1e-12);
        assert_eq!(report.confusion_matrix, [[2, 1], [1, 1]]);

        let rpl = report.class(Rpl).unwrap();
        assert!((rpl.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((rpl.recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(rpl.support, 3);

        let tkj = report.class(Tkj).unwrap();
        assert!((tkj.precision - 0.5).abs() < 1e-12);
        assert!((tkj.f1 - 0.5).abs() < 1e-12);

        let expected_macro = (2.0 / 3.0 + 0.5) / 2.0;
        assert!((report.macro_avg.f1 - expected_macro).abs() < 1e-12);
        let expected_weighted = (2.0 / 3.0 * 3.0 + 0.5 * 2.0) / 5.0;
        assert!((report.weighted_avg.recall - expected_weighted).abs() < 1e-12);
    }

    #[test]
    fn test_undefined_ratios_are_zero() {
        let report = EvaluationReport::from_predictions(&[Rpl, Rpl], &[Rpl, Rpl]).unwrap();
        let tkj = report.class(Tkj).unwrap();
        assert_eq!(tkj.precision, 0.0);
        assert_eq!(tkj.recall, 0.0);
        assert_eq!(tkj.f1, 0.0);
        assert_eq!(report.accuracy, 1.0);
    }

    #[test]
    fn test_mismatched_lengths() {
        assert!(EvaluationReport::from_predictions(&[Rpl], &[]).is_err());
        assert!(EvaluationReport::from_predictions(&[], &[]).is_err());
    }

    #[test]
    fn test_display_contains_rows() {
        let report = EvaluationReport::from_predictions(&[Rpl, Tkj], &[Rpl, Tkj]).unwrap();
        let text = report.to_string();
        assert!(text.contains("weighted avg"));
        assert!(text.contains("RPL"));
        assert!(text.contains("Confusion matrix"));
    }
}
