// In crates/analytics/src/types.rs

use crate::tiers::{DrawdownTier, RiskTier, WinRateTier};
use core_types::{
    ConfidenceBucket, DailyReturn, MonthlyStat, ResolvedSummary, StockPerformance, SummaryStats,
    ViewParams,
};
use serde::Serialize;
use serde_json::Value;

/// The untyped inputs of one backtest run, exactly as the provider sent them.
///
/// `Value::Null` stands for a slot that has not arrived (yet).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBacktestData {
    /// `{ portfolioReturns: [...], stockPerformance: [...] }`
    pub returns: Value,
    /// The global-stats object.
    pub stats: Value,
    /// Array of confidence buckets, lowest range first.
    pub confidence_analysis: Value,
    /// Array of monthly stats, calendar order.
    pub monthly_stats: Value,
}

/// The validated, typed view of a backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestSnapshot {
    pub daily_returns: Vec<DailyReturn>,
    /// Sorted by average return, best first.
    pub stock_performance: Vec<StockPerformance>,
    pub confidence_buckets: Vec<ConfidenceBucket>,
    pub monthly_stats: Vec<MonthlyStat>,
    pub summary: SummaryStats,
}

/// Statistics derived from the summary rather than trusted from input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    /// Strategy return minus buy-and-hold return.
    pub outperformance: f64,
    pub risk_tier: RiskTier,
    pub win_rate_tier: WinRateTier,
    pub drawdown_tier: DrawdownTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Better,
    Similar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CalibrationVerdict {
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "needs work")]
    NeedsWork,
}

/// How the bucket order used for the calibration judgment was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BucketOrdering {
    /// Labels parsed and were already lowest-first.
    Sorted,
    /// Labels parsed but arrived out of order; evaluated on a sorted view.
    Reordered,
    /// At least one label could not be parsed; positional order was trusted.
    Unverified,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationReport {
    pub low_accuracy: f64,
    pub high_accuracy: f64,
    pub comparison: Comparison,
    pub verdict: CalibrationVerdict,
    pub ordering: BucketOrdering,
}

/// Long/short outcome counts for a single month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDirection {
    pub month: String,
    pub long_trades: u64,
    pub short_trades: u64,
    pub long_win_rate: f64,
    pub short_win_rate: f64,
    #[serde(rename = "return")]
    pub ret: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionTotals {
    pub long_wins: u64,
    pub long_losses: u64,
    pub short_wins: u64,
    pub short_losses: u64,
    pub long_win_rate: f64,
    pub short_win_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionBreakdown {
    pub months: Vec<MonthlyDirection>,
    pub totals: DirectionTotals,
}

/// Everything the presentation layer renders for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub params: ViewParams,
    pub snapshot: BacktestSnapshot,
    /// The summary with absent fields shown as zero.
    pub display_summary: ResolvedSummary,
    pub derived: DerivedStats,
    pub calibration: CalibrationReport,
    pub direction: DirectionBreakdown,
    /// Buckets whose range starts at or above the confidence threshold.
    pub buckets_above_threshold: Vec<ConfidenceBucket>,
    pub insights: [String; 5],
}
