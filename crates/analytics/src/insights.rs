// In crates/analytics/src/insights.rs

use crate::format::{fixed, percent};
use crate::types::{CalibrationReport, CalibrationVerdict, Comparison, DerivedStats};
use crate::tiers::WinRateTier;
use core_types::SummaryStats;

pub const INSIGHT_COUNT: usize = 5;

/// Builds the five narrative statements, always in the same order.
///
/// Missing summary fields are read as zero, so the output never shrinks.
pub fn generate(
    summary: &SummaryStats,
    derived: &DerivedStats,
    calibration: &CalibrationReport,
) -> [String; INSIGHT_COUNT] {
    let stats = summary.resolved();

    [
        outperformance_statement(stats.total_return, stats.buy_hold_return),
        format!(
            "Sharpe ratio of {} indicates {} risk-adjusted returns",
            fixed(stats.sharpe, 2),
            derived.risk_tier
        ),
        win_rate_statement(stats.win_rate, derived.win_rate_tier),
        format!(
            "Max drawdown of {} shows {} risk exposure",
            percent(stats.max_drawdown.abs(), 2),
            derived.drawdown_tier
        ),
        calibration_statement(calibration),
    ]
}

fn outperformance_statement(total_return: f64, buy_hold_return: f64) -> String {
    let verb = if total_return > buy_hold_return {
        "OUTPERFORMS"
    } else {
        "UNDERPERFORMS"
    };
    format!(
        "Strategy {} buy & hold by {}",
        verb,
        percent((total_return - buy_hold_return).abs(), 2)
    )
}

fn win_rate_statement(win_rate: f64, tier: WinRateTier) -> String {
    let reading = match tier {
        WinRateTier::Strong => "is strong",
        WinRateTier::SlightlyPositive => "is slightly positive",
        WinRateTier::NeedsImprovement => "needs improvement",
    };
    format!("Win rate of {} {}", percent(win_rate, 1), reading)
}

fn calibration_statement(report: &CalibrationReport) -> String {
    let comparison = match report.comparison {
        Comparison::Better => "better",
        Comparison::Similar => "similar",
    };
    let verdict = match report.verdict {
        CalibrationVerdict::Good => "good",
        CalibrationVerdict::NeedsWork => "needs work",
    };
    format!(
        "Higher confidence predictions show {} accuracy - model calibration is {}",
        comparison, verdict
    )
}
