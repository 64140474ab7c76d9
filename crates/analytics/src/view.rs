// In crates/analytics/src/view.rs

use crate::calibration::{buckets_at_or_above, CalibrationAnalyzer};
use crate::direction::breakdown;
use crate::engine::AggregationEngine;
use crate::insights;
use crate::types::{DashboardView, RawBacktestData};
use core_types::ViewParams;

/// Runs the full pipeline over one immutable input snapshot.
///
/// Pure and deterministic: the same inputs always give the same view, and
/// any partial state (including all-empty) is a valid input.
pub fn compute_view(raw: &RawBacktestData, params: &ViewParams) -> DashboardView {
    let engine = AggregationEngine::new();
    let snapshot = engine.normalize(raw);
    let derived = engine.derive(&snapshot.summary);
    let calibration = CalibrationAnalyzer::new().analyze(&snapshot.confidence_buckets);
    let insights = insights::generate(&snapshot.summary, &derived, &calibration);

    DashboardView {
        params: *params,
        display_summary: snapshot.summary.resolved(),
        direction: breakdown(&snapshot.monthly_stats),
        buckets_above_threshold: buckets_at_or_above(
            &snapshot.confidence_buckets,
            params.confidence_threshold,
        ),
        derived,
        calibration,
        insights,
        snapshot,
    }
}
