// In crates/analytics/src/calibration.rs

use crate::types::{BucketOrdering, CalibrationReport, CalibrationVerdict, Comparison};
use core_types::ConfidenceBucket;
use std::cmp::Ordering;

/// How much more accurate the highest-confidence bucket must be than the
/// lowest before the model counts as calibrated.
pub const CALIBRATION_MARGIN: f64 = 0.10;

/// Judges whether prediction confidence tracks realized accuracy.
#[derive(Default)]
pub struct CalibrationAnalyzer;

impl CalibrationAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares the lowest-confidence bucket against the highest-confidence one.
    ///
    /// Buckets are expected lowest range first. When every label parses, the
    /// order is checked and a sorted view is used if needed; the input slice
    /// itself is left untouched.
    pub fn analyze(&self, buckets: &[ConfidenceBucket]) -> CalibrationReport {
        let (lowest, highest, ordering) = select_extremes(buckets);

        let low_accuracy = lowest.map(|b| b.accuracy).unwrap_or(0.0);
        let high_accuracy = highest.map(|b| b.accuracy).unwrap_or(0.0);

        let comparison = if high_accuracy > low_accuracy {
            Comparison::Better
        } else {
            Comparison::Similar
        };
        let verdict = if high_accuracy > low_accuracy + CALIBRATION_MARGIN {
            CalibrationVerdict::Good
        } else {
            CalibrationVerdict::NeedsWork
        };

        CalibrationReport {
            low_accuracy,
            high_accuracy,
            comparison,
            verdict,
            ordering,
        }
    }
}

fn select_extremes(
    buckets: &[ConfidenceBucket],
) -> (Option<&ConfidenceBucket>, Option<&ConfidenceBucket>, BucketOrdering) {
    let bounds: Option<Vec<f64>> = buckets.iter().map(|b| lower_bound(&b.label)).collect();

    let Some(bounds) = bounds else {
        tracing::warn!("Confidence bucket labels could not be parsed. Trusting input order.");
        return (buckets.first(), buckets.last(), BucketOrdering::Unverified);
    };

    if bounds.windows(2).all(|w| w[0] <= w[1]) {
        return (buckets.first(), buckets.last(), BucketOrdering::Sorted);
    }

    tracing::warn!("Confidence buckets arrived out of order. Evaluating on a sorted view.");
    let mut order: Vec<usize> = (0..buckets.len()).collect();
    order.sort_by(|&a, &b| bounds[a].partial_cmp(&bounds[b]).unwrap_or(Ordering::Equal));

    (
        order.first().map(|&i| &buckets[i]),
        order.last().map(|&i| &buckets[i]),
        BucketOrdering::Reordered,
    )
}

/// Parses the start of a confidence range label.
///
/// "0.5-0.6" gives 0.5, "50-60%" and "[50, 60)" give 0.5.
///
/// Without a `%` sign, only whole numbers in (1, 100] are read as percent.
/// Anything else outside [0, 1] is not a confidence and gives `None`.
pub fn lower_bound(label: &str) -> Option<f64> {
    let trimmed = label.trim().trim_start_matches(['[', '(']).trim_start();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let value: f64 = trimmed[..end].parse().ok()?;

    let is_percent = if label.contains('%') {
        true
    } else if value <= 1.0 {
        false
    } else {
        value.fract() == 0.0
    };

    match is_percent {
        true if value <= 100.0 => Some(value / 100.0),
        true => None,
        false if value <= 1.0 => Some(value),
        false => None,
    }
}

/// The buckets whose range starts at or above `threshold`, in input order.
pub fn buckets_at_or_above(buckets: &[ConfidenceBucket], threshold: f64) -> Vec<ConfidenceBucket> {
    buckets
        .iter()
        .filter(|b| lower_bound(&b.label).is_some_and(|lb| lb >= threshold))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buckets(accuracies: &[f64]) -> Vec<ConfidenceBucket> {
        accuracies
            .iter()
            .enumerate()
            .map(|(i, &accuracy)| {
                let start = 0.5 + i as f64 * 0.1;
                ConfidenceBucket {
                    label: format!("{:.1}-{:.1}", start, start + 0.1),
                    accuracy,
                    count: 10,
                    avg_return: 0.0,
                }
            })
            .collect()
    }

    #[test]
    fn rising_accuracy_is_good_calibration() {
        let report = CalibrationAnalyzer::new().analyze(&buckets(&[0.45, 0.52, 0.58, 0.62, 0.65]));
        assert_eq!(report.comparison, Comparison::Better);
        assert_eq!(report.verdict, CalibrationVerdict::Good);
        assert_eq!(report.ordering, BucketOrdering::Sorted);
        assert_eq!(report.low_accuracy, 0.45);
        assert_eq!(report.high_accuracy, 0.65);
    }

    #[test]
    fn small_improvement_still_needs_work() {
        let report = CalibrationAnalyzer::new().analyze(&buckets(&[0.50, 0.51, 0.50, 0.49, 0.52]));
        assert_eq!(report.comparison, Comparison::Better);
        assert_eq!(report.verdict, CalibrationVerdict::NeedsWork);
    }

    #[test]
    fn flat_accuracy_is_similar() {
        let report = CalibrationAnalyzer::new().analyze(&buckets(&[0.55, 0.60, 0.55]));
        assert_eq!(report.comparison, Comparison::Similar);
        assert_eq!(report.verdict, CalibrationVerdict::NeedsWork);
    }

    #[test]
    fn empty_buckets_default_conservatively() {
        let report = CalibrationAnalyzer::new().analyze(&[]);
        assert_eq!(report.comparison, Comparison::Similar);
        assert_eq!(report.verdict, CalibrationVerdict::NeedsWork);
        assert_eq!(report.low_accuracy, 0.0);
        assert_eq!(report.high_accuracy, 0.0);
    }

    #[test]
    fn single_bucket_compares_with_itself() {
        let report = CalibrationAnalyzer::new().analyze(&buckets(&[0.7]));
        assert_eq!(report.comparison, Comparison::Similar);
        assert_eq!(report.verdict, CalibrationVerdict::NeedsWork);
    }

    #[test]
    fn out_of_order_buckets_are_evaluated_sorted() {
        let mut shuffled = buckets(&[0.45, 0.52, 0.58, 0.62, 0.65]);
        shuffled.swap(0, 4);
        let report = CalibrationAnalyzer::new().analyze(&shuffled);
        assert_eq!(report.ordering, BucketOrdering::Reordered);
        assert_eq!(report.low_accuracy, 0.45);
        assert_eq!(report.high_accuracy, 0.65);
        assert_eq!(report.verdict, CalibrationVerdict::Good);
        // The caller's sequence is not re-sorted.
        assert_eq!(shuffled[0].label, "0.9-1.0");
    }

    #[test]
    fn unparseable_labels_fall_back_to_position() {
        let mut named = buckets(&[0.65, 0.45]);
        named[0].label = "high".into();
        named[1].label = "low".into();
        let report = CalibrationAnalyzer::new().analyze(&named);
        assert_eq!(report.ordering, BucketOrdering::Unverified);
        assert_eq!(report.low_accuracy, 0.65);
        assert_eq!(report.high_accuracy, 0.45);
        assert_eq!(report.comparison, Comparison::Similar);
    }

    #[test]
    fn lower_bound_parses_common_label_forms() {
        assert_eq!(lower_bound("0.5-0.6"), Some(0.5));
        assert_eq!(lower_bound(" 0.9 - 1.0 "), Some(0.9));
        assert_eq!(lower_bound("60-69%"), Some(0.6));
        assert_eq!(lower_bound("[70, 80)"), Some(0.7));
        assert_eq!(lower_bound("5-6"), Some(0.05));
        assert_eq!(lower_bound("high"), None);
        assert_eq!(lower_bound(""), None);
    }

    #[test]
    fn lower_bound_rejects_values_that_are_not_confidences() {
        assert_eq!(lower_bound("1.5-2.0"), None);
        assert_eq!(lower_bound("150-160"), None);
        assert_eq!(lower_bound("120-130%"), None);
        assert_eq!(lower_bound("85.5-90%"), Some(0.855));
        assert_eq!(lower_bound("1.0-1.0"), Some(1.0));
    }

    #[test]
    fn threshold_selects_buckets_by_range_start() {
        let all = buckets(&[0.45, 0.52, 0.58, 0.62, 0.65]);
        let selected = buckets_at_or_above(&all, 0.7);
        let labels: Vec<&str> = selected.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["0.7-0.8", "0.8-0.9", "0.9-1.0"]);
        assert!(buckets_at_or_above(&all, 0.95).is_empty());
    }
}
