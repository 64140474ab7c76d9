// In crates/web-server/src/types.rs

use analytics::types::{CalibrationReport, DerivedStats, DirectionBreakdown};
use core_types::{ConfidenceBucket, MonthlyStat, ResolvedSummary, StrategyKind, SummaryStats, ViewParams};
use serde::{Deserialize, Serialize};

/// The optional view overrides from the URL (e.g., ?strategy=long-only&confidenceThreshold=0.7).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewQuery {
    pub strategy: Option<StrategyKind>,
    pub confidence_threshold: Option<f64>,
}

impl ViewQuery {
    /// Fills unset values from `defaults` and validates the result.
    pub fn resolve(&self, defaults: &ViewParams) -> core_types::Result<ViewParams> {
        ViewParams::new(
            self.strategy.unwrap_or(defaults.strategy),
            self.confidence_threshold
                .unwrap_or(defaults.confidence_threshold),
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    /// As supplied; absent fields are `null`.
    pub summary: SummaryStats,
    /// Absent fields shown as zero.
    pub display: ResolvedSummary,
    pub derived: DerivedStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceAnalysisResponse {
    pub buckets: Vec<ConfidenceBucket>,
    pub calibration: CalibrationReport,
    pub buckets_above_threshold: Vec<ConfidenceBucket>,
    pub confidence_threshold: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStatsResponse {
    pub months: Vec<MonthlyStat>,
    pub direction: DirectionBreakdown,
}
