// In crates/analytics/src/engine.rs

use crate::tiers::{drawdown_tier, risk_tier, win_rate_tier};
use crate::types::{BacktestSnapshot, DerivedStats, RawBacktestData};
use core_types::{
    ConfidenceBucket, DailyReturn, MonthlyStat, StockPerformance, SummaryStats,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Turns untrusted provider payloads into a validated `BacktestSnapshot`.
///
/// Never fails: anything malformed degrades to an empty sequence or an
/// absent field, and a diagnostic is logged.
#[derive(Default)]
pub struct AggregationEngine;

impl AggregationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and normalizes all four collections plus the summary record.
    pub fn normalize(&self, raw: &RawBacktestData) -> BacktestSnapshot {
        let daily_returns = parse_records(
            raw.returns.get("portfolioReturns"),
            "portfolioReturns",
            DailyReturn::validate,
        );

        let stock_performance = rank_stocks(dedupe_tickers(parse_records(
            raw.returns.get("stockPerformance"),
            "stockPerformance",
            StockPerformance::validate,
        )));

        let confidence_buckets = parse_records(
            Some(&raw.confidence_analysis),
            "confidenceAnalysis",
            ConfidenceBucket::validate,
        );

        let monthly_stats = parse_records(
            Some(&raw.monthly_stats),
            "monthlyStats",
            MonthlyStat::validate,
        );

        let summary = parse_summary(&raw.stats);

        tracing::debug!(
            daily_returns = daily_returns.len(),
            stocks = stock_performance.len(),
            buckets = confidence_buckets.len(),
            months = monthly_stats.len(),
            "Normalized backtest snapshot."
        );

        BacktestSnapshot {
            daily_returns,
            stock_performance,
            confidence_buckets,
            monthly_stats,
            summary,
        }
    }

    /// Computes the fields that are derived from, not read from, the summary.
    pub fn derive(&self, summary: &SummaryStats) -> DerivedStats {
        let resolved = summary.resolved();
        DerivedStats {
            outperformance: resolved.total_return - resolved.buy_hold_return,
            risk_tier: risk_tier(resolved.sharpe),
            win_rate_tier: win_rate_tier(resolved.win_rate),
            drawdown_tier: drawdown_tier(resolved.max_drawdown),
        }
    }
}

/// Sorts by average return, best first. `sort_by` is stable, so ties keep input order.
pub fn rank_stocks(mut stocks: Vec<StockPerformance>) -> Vec<StockPerformance> {
    stocks.sort_by(|a, b| {
        b.avg_return
            .partial_cmp(&a.avg_return)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    stocks
}

fn dedupe_tickers(stocks: Vec<StockPerformance>) -> Vec<StockPerformance> {
    let mut seen = HashSet::new();
    stocks
        .into_iter()
        .filter(|stock| {
            let first = seen.insert(stock.ticker.clone());
            if !first {
                tracing::warn!(ticker = %stock.ticker, "Dropping duplicate ticker.");
            }
            first
        })
        .collect()
}

/// Deserializes each element of an array independently, keeping the valid ones in order.
fn parse_records<T>(
    value: Option<&Value>,
    collection: &'static str,
    validate: fn(&T) -> core_types::Result<()>,
) -> Vec<T>
where
    T: DeserializeOwned,
{
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            tracing::warn!(collection, kind = value_kind(other), "Expected an array. Treating as empty.");
            return Vec::new();
        }
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let record = match T::deserialize(item) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(collection, index, error = %e, "Dropping malformed record.");
                    return None;
                }
            };
            match validate(&record) {
                Ok(()) => Some(record),
                Err(e) => {
                    tracing::warn!(collection, index, error = %e, "Dropping invalid record.");
                    None
                }
            }
        })
        .collect()
}

fn parse_summary(value: &Value) -> SummaryStats {
    let fields = match value {
        Value::Object(fields) => fields,
        Value::Null => return SummaryStats::default(),
        other => {
            tracing::warn!(kind = value_kind(other), "Summary stats is not an object. Using empty summary.");
            return SummaryStats::default();
        }
    };

    let win_rate = number_field(fields, "winRate").filter(|rate| {
        let valid = (0.0..=1.0).contains(rate);
        if !valid {
            tracing::warn!(win_rate = rate, "Win rate outside [0, 1]. Treating as absent.");
        }
        valid
    });

    let max_drawdown = number_field(fields, "maxDrawdown").map(|dd| {
        if dd > 0.0 {
            tracing::warn!(max_drawdown = dd, "Positive max drawdown. Using its negation.");
            -dd
        } else {
            dd
        }
    });

    SummaryStats {
        total_return: number_field(fields, "totalReturn"),
        buy_hold_return: number_field(fields, "buyHoldReturn"),
        sharpe: number_field(fields, "sharpe"),
        win_rate,
        max_drawdown,
        total_trades: count_field(fields, "totalTrades"),
        avg_trade: number_field(fields, "avgTrade"),
    }
}

fn number_field(fields: &Map<String, Value>, key: &'static str) -> Option<f64> {
    match fields.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let number = value.as_f64().filter(|n| n.is_finite());
            if number.is_none() {
                tracing::warn!(field = key, kind = value_kind(value), "Summary field is not a number. Treating as absent.");
            }
            number
        }
    }
}

/// Accepts integers and integral floats (dataframes often emit `1234.0`).
fn count_field(fields: &Map<String, Value>, key: &'static str) -> Option<u64> {
    match fields.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let count = value.as_u64().or_else(|| {
                value
                    .as_f64()
                    .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0)
                    .map(|n| n as u64)
            });
            if count.is_none() {
                tracing::warn!(field = key, "Summary field is not a non-negative count. Treating as absent.");
            }
            count
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::{DrawdownTier, RiskTier, WinRateTier};
    use serde_json::json;

    fn stock(ticker: &str, avg_return: f64) -> Value {
        json!({"ticker": ticker, "trades": 10, "winRate": 0.5, "avgReturn": avg_return, "sharpe": 1.0})
    }

    fn tickers(snapshot: &BacktestSnapshot) -> Vec<&str> {
        snapshot
            .stock_performance
            .iter()
            .map(|s| s.ticker.0.as_str())
            .collect()
    }

    #[test]
    fn empty_input_yields_empty_snapshot() {
        let snapshot = AggregationEngine::new().normalize(&RawBacktestData::default());
        assert!(snapshot.daily_returns.is_empty());
        assert!(snapshot.stock_performance.is_empty());
        assert!(snapshot.confidence_buckets.is_empty());
        assert!(snapshot.monthly_stats.is_empty());
        assert_eq!(snapshot.summary, SummaryStats::default());
    }

    #[test]
    fn non_array_collections_are_treated_as_empty() {
        let raw = RawBacktestData {
            returns: json!({"portfolioReturns": "oops", "stockPerformance": {"ticker": "AAPL"}}),
            stats: json!([1, 2, 3]),
            confidence_analysis: json!(42),
            monthly_stats: json!({"month": "Jan"}),
        };
        let snapshot = AggregationEngine::new().normalize(&raw);
        assert_eq!(snapshot, BacktestSnapshot::default());
    }

    #[test]
    fn stocks_sorted_descending_with_stable_ties() {
        let raw = RawBacktestData {
            returns: json!({"stockPerformance": [stock("A", 0.01), stock("B", 0.02), stock("C", 0.02)]}),
            ..RawBacktestData::default()
        };
        let snapshot = AggregationEngine::new().normalize(&raw);
        assert_eq!(tickers(&snapshot), vec!["B", "C", "A"]);
    }

    #[test]
    fn malformed_records_are_dropped_individually() {
        let raw = RawBacktestData {
            returns: json!({
                "portfolioReturns": [
                    {"Date": "2025-01-02", "CumulativeReturn": 0.01},
                    {"Date": "not a date", "CumulativeReturn": 0.02},
                    {"Date": "2025-01-06", "CumulativeReturn": 0.03}
                ],
                "stockPerformance": [
                    stock("AAPL", 0.01),
                    {"ticker": "MSFT", "trades": -3, "winRate": 0.5, "avgReturn": 0.0, "sharpe": 0.0},
                    {"ticker": "NVDA", "trades": 4, "winRate": 1.4, "avgReturn": 0.0, "sharpe": 0.0}
                ]
            }),
            ..RawBacktestData::default()
        };
        let snapshot = AggregationEngine::new().normalize(&raw);

        let cumulative: Vec<f64> = snapshot.daily_returns.iter().map(|d| d.cumulative_return).collect();
        assert_eq!(cumulative, vec![0.01, 0.03]);
        assert_eq!(tickers(&snapshot), vec!["AAPL"]);
    }

    #[test]
    fn duplicate_tickers_keep_first_occurrence() {
        let raw = RawBacktestData {
            returns: json!({"stockPerformance": [stock("AAPL", 0.01), stock("AAPL", 0.05), stock("TSLA", 0.02)]}),
            ..RawBacktestData::default()
        };
        let snapshot = AggregationEngine::new().normalize(&raw);
        assert_eq!(tickers(&snapshot), vec!["TSLA", "AAPL"]);
        assert_eq!(snapshot.stock_performance[1].avg_return, 0.01);
    }

    #[test]
    fn buckets_and_months_keep_input_order() {
        let raw = RawBacktestData {
            confidence_analysis: json!([
                {"confidence": "0.9-1.0", "accuracy": 0.65, "count": 25, "avgReturn": 0.025},
                {"confidence": "0.5-0.6", "accuracy": 0.45, "count": 120, "avgReturn": 0.002}
            ]),
            monthly_stats: json!([
                {"month": "Mar", "longWins": 1, "longLosses": 0, "shortWins": 0, "shortLosses": 0, "return": 0.0},
                {"month": "Jan", "longWins": 1, "longLosses": 0, "shortWins": 0, "shortLosses": 0, "return": 0.0}
            ]),
            ..RawBacktestData::default()
        };
        let snapshot = AggregationEngine::new().normalize(&raw);
        let labels: Vec<&str> = snapshot.confidence_buckets.iter().map(|b| b.label.as_str()).collect();
        let months: Vec<&str> = snapshot.monthly_stats.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels, vec!["0.9-1.0", "0.5-0.6"]);
        assert_eq!(months, vec!["Mar", "Jan"]);
    }

    #[test]
    fn summary_keeps_absent_fields_absent() {
        let raw = RawBacktestData {
            stats: json!({
                "totalReturn": 0.18,
                "sharpe": 1.2,
                "winRate": 0.53,
                "maxDrawdown": -0.12,
                "totalTrades": 1480.0,
                "avgTrade": "n/a"
            }),
            ..RawBacktestData::default()
        };
        let summary = AggregationEngine::new().normalize(&raw).summary;
        assert_eq!(summary.total_return, Some(0.18));
        assert_eq!(summary.buy_hold_return, None);
        assert_eq!(summary.total_trades, Some(1480));
        assert_eq!(summary.avg_trade, None);
    }

    #[test]
    fn positive_drawdown_is_expressed_as_non_positive() {
        let raw = RawBacktestData {
            stats: json!({"maxDrawdown": 0.2, "winRate": 1.7}),
            ..RawBacktestData::default()
        };
        let summary = AggregationEngine::new().normalize(&raw).summary;
        assert_eq!(summary.max_drawdown, Some(-0.2));
        assert_eq!(summary.win_rate, None);
    }

    #[test]
    fn derive_computes_outperformance_and_tiers() {
        let summary = SummaryStats {
            total_return: Some(0.25),
            buy_hold_return: Some(0.10),
            sharpe: Some(0.8),
            win_rate: Some(0.56),
            max_drawdown: Some(-0.20),
            ..SummaryStats::default()
        };
        let derived = AggregationEngine::new().derive(&summary);
        assert!((derived.outperformance - 0.15).abs() < 1e-12);
        assert_eq!(derived.risk_tier, RiskTier::Acceptable);
        assert_eq!(derived.win_rate_tier, WinRateTier::Strong);
        assert_eq!(derived.drawdown_tier, DrawdownTier::Moderate);
    }

    #[test]
    fn derive_on_empty_summary_uses_zero() {
        let derived = AggregationEngine::new().derive(&SummaryStats::default());
        assert_eq!(derived.outperformance, 0.0);
        assert_eq!(derived.risk_tier, RiskTier::Poor);
        assert_eq!(derived.win_rate_tier, WinRateTier::NeedsImprovement);
        assert_eq!(derived.drawdown_tier, DrawdownTier::Low);
    }
}
